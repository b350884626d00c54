//! Argument parsing and subcommand dispatch (spec §6 "CLI").

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use zen_build::BuildDir;

#[derive(Parser)]
#[command(name = "zen", version, about = "Rebuild-avoidance planner for CMake+Make builds")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit informational progress lines to stdout in addition to the
    /// normal `tracing` spans (which shift from `warn` to `debug`).
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Plan rebuild avoidance: inspect sources, decide which objects and
    /// targets can skip a rebuild, back-date their artifacts. Run this
    /// before `make`.
    Meditate {
        /// Configured CMake build directory.
        build_dir: PathBuf,
    },

    /// Record current per-source and per-construct fingerprints as the
    /// baseline for the next `meditate`. Run this after a successful `make`.
    Remember {
        /// Configured CMake build directory.
        build_dir: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Meditate { build_dir } => meditate(&build_dir, cli.verbose),
        Command::Remember { build_dir } => remember(&build_dir, cli.verbose),
    }
}

fn meditate(build_dir: &PathBuf, verbose: bool) -> Result<()> {
    if verbose {
        println!("meditating over {}", build_dir.display());
    }
    let mut dir = BuildDir::load(build_dir)
        .with_context(|| format!("loading build metadata from {}", build_dir.display()))?;
    dir.meditate().context("planning rebuild avoidance")?;

    if verbose {
        for target in dir.targets() {
            println!("target {}: {:?}", target.name(), target.status().expect("meditate resolves every target"));
        }
    }
    Ok(())
}

fn remember(build_dir: &PathBuf, verbose: bool) -> Result<()> {
    if verbose {
        println!("recording fingerprints for {}", build_dir.display());
    }
    let mut dir = BuildDir::load(build_dir)
        .with_context(|| format!("loading build metadata from {}", build_dir.display()))?;
    dir.remember().context("recording fingerprints")?;
    Ok(())
}
