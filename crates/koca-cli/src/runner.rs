//! Running build file functions
//!
//! The parser hands over [`FunctionHandle`]s without ever executing them. A
//! [`ScriptInterpreter`] takes one of those, a working directory and the
//! variables to export, and runs it to completion.

use crate::errors::CliError;
use koca_logger as logger;
use koca_syntax::grammar::FunctionHandle;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;
use which::which;

/// Where and with what environment a stage runs.
#[derive(Debug, Clone)]
pub struct StageContext {
    /// The stage name used in logs and errors (`build`, `package`).
    pub stage: String,
    pub workdir: PathBuf,
    /// Added on top of the inherited environment.
    pub env: Vec<(String, String)>,
}

impl StageContext {
    pub fn new(stage: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        StageContext {
            stage: stage.into(),
            workdir: workdir.into(),
            env: Vec::new(),
        }
    }

    pub fn with_env<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Executes an extracted build file function.
pub trait ScriptInterpreter {
    fn run(&self, func: &FunctionHandle, ctx: &StageContext) -> Result<(), CliError>;
}

/// Runs functions with an external shell.
#[derive(Debug, Clone)]
pub struct ShellInterpreter {
    program: PathBuf,
}

impl ShellInterpreter {
    /// Locate `shell` on `PATH` (or use it as given if it is a path).
    pub fn new(shell: &str) -> Result<Self, CliError> {
        let program = which(shell).map_err(|_| CliError::InterpreterNotFound {
            shell: shell.to_string(),
        })?;
        debug!("Using shell {}", program.display());
        Ok(ShellInterpreter { program })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn is_bash(&self) -> bool {
        self.program
            .file_name()
            .is_some_and(|name| name == "bash")
    }

    /// The command that defines `func` and then calls it.
    pub fn command(&self, func: &FunctionHandle, ctx: &StageContext) -> Command {
        let script = format!("{}\n{}", func.source(), func.name());

        let mut cmd = Command::new(&self.program);
        if self.is_bash() {
            cmd.args(["--noprofile", "--norc"]);
        }
        cmd.arg("-e")
            .arg("-c")
            .arg(script)
            .current_dir(&ctx.workdir)
            .envs(ctx.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        cmd
    }
}

impl ScriptInterpreter for ShellInterpreter {
    fn run(&self, func: &FunctionHandle, ctx: &StageContext) -> Result<(), CliError> {
        logger::debug(&format!(
            "Running {} in {} with {}",
            func,
            ctx.workdir.display(),
            self.program.display()
        ));

        let mut cmd = self.command(func, ctx);
        logger::step(&format!("{:?}", cmd));
        let status = cmd.status()?;
        if status.success() {
            Ok(())
        } else {
            Err(CliError::StageFailed {
                stage: ctx.stage.clone(),
                code: status.code(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn function(name: &str, body: &str) -> FunctionHandle {
        let body = format!("{{\n{body}\n}}");
        FunctionHandle::new(name, 1, format!("{name}() {body}"), body)
    }

    #[test]
    fn test_missing_shell() {
        let result = ShellInterpreter::new("koca-no-such-shell");
        assert!(matches!(
            result,
            Err(CliError::InterpreterNotFound { .. })
        ));
    }

    #[test]
    fn test_runs_function_with_env_in_workdir() -> TestResult {
        let dir = TempDir::new()?;
        let shell = ShellInterpreter::new("sh")?;
        let ctx = StageContext::new("build", dir.path()).with_env([("pkgname", "hello")]);

        shell.run(&function("build", "echo \"$pkgname\" > out.txt"), &ctx)?;

        assert_eq!(fs::read_to_string(dir.path().join("out.txt"))?, "hello\n");
        Ok(())
    }

    #[test]
    fn test_failing_command_fails_the_stage() -> TestResult {
        let dir = TempDir::new()?;
        let shell = ShellInterpreter::new("sh")?;
        let ctx = StageContext::new("package", dir.path());

        let result = shell.run(&function("package", "false\ntouch never"), &ctx);

        assert!(matches!(
            result,
            Err(CliError::StageFailed { ref stage, code: Some(1) }) if stage == "package"
        ));
        assert!(!dir.path().join("never").exists());
        Ok(())
    }

    #[test]
    fn test_bash_gets_no_startup_files() {
        let shell = ShellInterpreter {
            program: PathBuf::from("/bin/bash"),
        };
        let cmd = shell.command(&function("build", "true"), &StageContext::new("build", "."));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(&args[..3], ["--noprofile", "--norc", "-e"]);
        assert!(args[4].ends_with("\nbuild"));
    }
}
