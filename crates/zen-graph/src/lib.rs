//! `Construct` and `ConstructGraph`: named symbols aggregated from the
//! components that contribute to them across a compile object's sources, and
//! the dependency edges between them (spec §3 "Construct"/"ConstructGraph",
//! §4.D).

pub mod construct;
pub mod graph;

pub use construct::Construct;
pub use graph::ConstructGraph;
