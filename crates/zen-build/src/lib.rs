//! CMake/Make build-metadata adapter and the change engine that decides,
//! per target and per compile object, whether a rebuild can be avoided
//! (spec §3 "BuildDir / Target / CompileObject / SourceFile", §4.F, §4.G,
//! §6).

pub mod build_dir;
pub mod error;
pub mod metadata;
pub mod object;
pub mod source_file;
pub mod status;
pub mod target;
pub mod touch;

pub use build_dir::BuildDir;
pub use error::{ChangeEngineError, Result};
pub use metadata::TargetType;
pub use object::CompileObject;
pub use source_file::SourceFile;
pub use status::Status;
pub use target::Target;
