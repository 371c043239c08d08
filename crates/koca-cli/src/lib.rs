//! koca library - the CLI's commands and the collaborators they drive
//!
//! [`runner`] executes build file functions and [`nfpm`] turns the packaged
//! tree into an archive. Both sit behind traits so commands can be tested
//! without a shell or nfpm installed.

pub mod commands;
pub mod common;
pub mod errors;
pub mod nfpm;
pub mod runner;

pub use common::GlobalOpts;
pub use errors::CliError;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route `tracing` events from the koca crates to stderr.
///
/// `RUST_LOG` takes precedence over the verbosity given to the logger.
pub fn init_tracing() {
    let level = koca_logger::verbosity_filter();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "koca={level},koca_syntax={level},koca_config={level}"
        ))
    });

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
