//! Integration tests for koca

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use predicates::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// An isolated home directory and config file for one test.
struct Harness {
    home: TempDir,
}

impl Harness {
    fn new() -> io::Result<Self> {
        Ok(Harness {
            home: TempDir::new()?,
        })
    }

    fn root(&self) -> &Path {
        self.home.path()
    }

    fn config_path(&self) -> PathBuf {
        self.root().join("koca.toml")
    }

    fn write_config(&self, content: &str) -> io::Result<()> {
        fs::write(self.config_path(), content)
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("koca");
        cmd.env("HOME", self.root())
            .env("KOCA_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .current_dir(self.root());
        cmd
    }
}

#[test]
fn test_version() -> io::Result<()> {
    Harness::new()?
        .command()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("koca"));
    Ok(())
}

#[test]
fn test_help() -> io::Result<()> {
    Harness::new()?
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build").and(predicate::str::contains("check")));
    Ok(())
}

#[test]
fn test_invalid_command() -> io::Result<()> {
    Harness::new()?.command().arg("invalid").assert().failure();
    Ok(())
}

#[test]
fn test_check_valid_file() -> io::Result<()> {
    Harness::new()?
        .command()
        .arg("check")
        .arg(fixture("hello.koca"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("hello")
                .and(predicate::str::contains("1:2.12.1-3"))
                .and(predicate::str::contains("all, any, x86_64")),
        );
    Ok(())
}

#[test]
fn test_check_json() -> io::Result<()> {
    Harness::new()?
        .command()
        .args(["check", "--json"])
        .arg(fixture("hello.koca"))
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"pkgname\": \"hello\"")
                .and(predicate::str::contains("\"email\": \"foo@example.com\"")),
        );
    Ok(())
}

#[test]
fn test_check_reports_every_error() -> io::Result<()> {
    Harness::new()?
        .command()
        .arg("check")
        .arg(fixture("broken.koca"))
        .assert()
        .failure()
        .code(1)
        .stderr(
            predicate::str::contains("line 6: unknown variable 'license'")
                .and(predicate::str::contains("function 'package' is required"))
                .and(predicate::str::contains("2 errors found")),
        );
    Ok(())
}

#[test]
fn test_check_missing_file() -> io::Result<()> {
    let harness = Harness::new()?;
    harness
        .command()
        .args(["check", "does-not-exist.koca"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read build file"));
    Ok(())
}

#[test]
fn test_build_runs_both_stages() -> io::Result<()> {
    let harness = Harness::new()?;
    let work_dir = harness.root().join("work");
    harness.write_config(&format!(
        "shell = \"sh\"\nwork-dir = \"{}\"\n",
        work_dir.display()
    ))?;

    harness
        .command()
        .args(["build", "--skip-package"])
        .arg(fixture("stages.koca"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(work_dir.join("src").join("built.txt"))?,
        "stages 0.1.0\n"
    );
    assert!(work_dir
        .join("pkg")
        .join("usr/share/stages/built.txt")
        .is_file());
    Ok(())
}

#[test]
fn test_build_rejects_unknown_output_type() -> io::Result<()> {
    Harness::new()?
        .command()
        .args(["build", "--output-type", "apk"])
        .arg(fixture("stages.koca"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("apk"));
    Ok(())
}

#[test]
fn test_config_set_get_show() -> io::Result<()> {
    let harness = Harness::new()?;

    harness
        .command()
        .args(["config", "set", "output-type", "rpm"])
        .assert()
        .success();
    harness
        .command()
        .args(["config", "get", "output-type"])
        .assert()
        .success()
        .stdout("rpm\n");
    harness
        .command()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration:").and(predicate::str::contains("rpm")));

    assert!(fs::read_to_string(harness.config_path())?.contains("output-type = \"rpm\""));
    Ok(())
}

#[test]
fn test_config_rejects_unknown_key() -> io::Result<()> {
    Harness::new()?
        .command()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key: colour"));
    Ok(())
}

#[test]
fn test_config_path() -> io::Result<()> {
    Harness::new()?
        .command()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("koca.toml"));
    Ok(())
}
