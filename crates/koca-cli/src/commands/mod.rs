pub mod build;
pub mod check;
pub mod config;

use crate::errors::CliError;
use koca_logger as logger;
use koca_syntax::BuildFile;
use std::path::Path;

/// Parse `path`, logging every problem on its own line.
pub fn load_build_file(path: &Path) -> Result<BuildFile, CliError> {
    logger::debug(&format!("Parsing build file {}", path.display()));
    BuildFile::parse_file(path).map_err(|errors| {
        for err in &errors {
            logger::error(&err.to_string());
        }
        CliError::Manifest {
            path: path.to_path_buf(),
            errors,
        }
    })
}
