use super::load_build_file;
use crate::errors::CliError;
use clap::Args;
use colored::Colorize;
use koca_logger as logger;
use koca_syntax::{BuildFile, FunctionKind};
use std::path::PathBuf;

/// Parse a build file and report on it without running anything
#[derive(Args, Debug, Clone)]
pub struct CheckCommand {
    /// Path to the build file
    pub file: PathBuf,

    /// Print the parsed build file as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_check(cmd: CheckCommand) -> Result<(), CliError> {
    let build_file = load_build_file(&cmd.file)?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&build_file)?);
        return Ok(());
    }

    println!(
        "{} {}",
        build_file.pkgname().bold().green(),
        build_file.version()
    );
    for (key, value) in summary(&build_file) {
        println!("  {}: {}", key.cyan(), value);
    }
    logger::success(&format!("{} is valid", cmd.file.display()));
    Ok(())
}

/// Labelled lines describing a parsed build file.
fn summary(build_file: &BuildFile) -> Vec<(&'static str, String)> {
    let arch = build_file
        .arch()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let functions = FunctionKind::ALL
        .into_iter()
        .map(|kind| format!("{} (line {})", kind, build_file.function(kind).line()))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![("maintainer", build_file.maintainer().to_string())];
    if !build_file.pkgdesc().is_empty() {
        lines.push(("description", build_file.pkgdesc().to_string()));
    }
    lines.push(("arch", arch));
    lines.push(("functions", functions));
    lines
}
