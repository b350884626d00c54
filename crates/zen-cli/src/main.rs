//! `zen`: `meditate`/`remember` rebuild-avoidance subcommands over a
//! configured CMake+Make build directory (spec §6).

mod cli;

fn main() {
    let args = cli::Cli::parse_args();
    init_tracing(args.verbose);

    if let Err(err) = cli::run(args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

/// `--verbose` raises the filter from `warn` to `debug`; `RUST_LOG` still
/// wins when set, matching the teacher's env-filter convention.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
