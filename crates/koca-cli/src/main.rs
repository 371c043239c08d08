use clap::{Parser, Subcommand};
use koca::{
    commands::{
        build::{self, BuildCommand},
        check::{self, CheckCommand},
        config::{self, ConfigAction},
    },
    init_tracing, CliError, GlobalOpts,
};
use koca_logger as logger;

#[derive(Parser)]
#[command(name = "koca")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build distribution packages from a single build file",
    long_about = "koca runs the build() and package() functions of a Bash build file and turns the result into a .deb or .rpm package."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and package a build file
    Build(BuildCommand),
    /// Check a build file for errors without running it
    Check(CheckCommand),
    /// Configure koca
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn main() {
    let cli = Cli::parse();
    let verbosity = cli.global.verbosity_level();

    if let Err(e) = logger::init_with_verbosity(verbosity, false) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    let result = match cli.command {
        Commands::Build(cmd) => build::handle_build(cmd),
        Commands::Check(cmd) => check::handle_check(cmd),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}

fn report(err: &CliError) {
    logger::error(&err.to_string());
    // nfpm output only ends up in the log file.
    if matches!(err, CliError::PackageFailed(_)) {
        logger::show_log_path();
    }
}
