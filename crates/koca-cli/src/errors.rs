//! Error types for the koca CLI

use koca_config::ConfigError;
use koca_syntax::ParseErrors;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{} found in {}", plural(.errors.len(), "error"), .path.display())]
    Manifest { path: PathBuf, errors: ParseErrors },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to render nfpm config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read package directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Could not find shell '{shell}' on PATH")]
    InterpreterNotFound { shell: String },

    #[error("The {stage} stage failed ({})", exit_status(.code.as_ref()))]
    StageFailed { stage: String, code: Option<i32> },

    #[error("Packaging failed: {0}")]
    PackageFailed(String),
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

fn exit_status(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use koca_syntax::ManifestError;

    #[test]
    fn test_manifest_error_counts() {
        let err = CliError::Manifest {
            path: PathBuf::from("koca.sh"),
            errors: ParseErrors::new(vec![
                ManifestError::MissingVariable("pkgname".to_string()),
                ManifestError::MissingFunction("build".to_string()),
            ]),
        };
        assert_eq!(err.to_string(), "2 errors found in koca.sh");
    }

    #[test]
    fn test_stage_failed_display() {
        let err = CliError::StageFailed {
            stage: "build".to_string(),
            code: Some(2),
        };
        assert_eq!(err.to_string(), "The build stage failed (exit code 2)");
    }
}
