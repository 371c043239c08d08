use super::load_build_file;
use crate::errors::CliError;
use crate::nfpm::{NfpmWriter, PackageWriter};
use crate::runner::{ScriptInterpreter, ShellInterpreter, StageContext};
use clap::Args;
use koca_config::Config;
use koca_logger as logger;
use koca_syntax::{BuildFile, FunctionKind, PackageFormat};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Run a build file's stages and package the result
#[derive(Args, Debug, Clone)]
pub struct BuildCommand {
    /// Path to the build file
    pub file: PathBuf,

    /// Package format to write (deb, rpm)
    #[arg(long, value_name = "TYPE")]
    pub output_type: Option<PackageFormat>,

    /// Directory the package is written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Run the build and package functions but don't create an archive
    #[arg(long)]
    pub skip_package: bool,
}

/// The scratch directories of one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    pub work_dir: PathBuf,
    /// Working directory of both functions.
    pub src_dir: PathBuf,
    /// Package root, exported as `pkgdir`.
    pub pkg_dir: PathBuf,
}

impl BuildLayout {
    pub fn from_config(config: &Config) -> io::Result<Self> {
        Ok(BuildLayout {
            work_dir: std::path::absolute(config.get_work_dir())?,
            src_dir: std::path::absolute(config.get_src_dir())?,
            pkg_dir: std::path::absolute(config.get_pkg_dir())?,
        })
    }

    /// Create the source directory and start from an empty package root.
    pub fn prepare(&self) -> io::Result<()> {
        fs::create_dir_all(&self.src_dir)?;
        if self.pkg_dir.exists() {
            fs::remove_dir_all(&self.pkg_dir)?;
        }
        fs::create_dir_all(&self.pkg_dir)
    }
}

pub fn handle_build(cmd: BuildCommand) -> Result<(), CliError> {
    let build_file = load_build_file(&cmd.file)?;
    let mut config = Config::load()?;
    let format = cmd.output_type.unwrap_or(config.get_output_type());
    logger::info(&format!(
        "Building {} {} as {}",
        build_file.pkgname(),
        build_file.version(),
        format
    ));

    let layout = BuildLayout::from_config(&config)?;
    layout.prepare()?;
    logger::debug(&format!("Working in {}", layout.work_dir.display()));

    let interpreter = ShellInterpreter::new(&config.get_shell())?;
    run_stages(&build_file, &layout, &interpreter)?;
    logger::set_current_stage(None);
    if is_empty_dir(&layout.pkg_dir)? {
        logger::warn(&format!(
            "The package stage left {} empty",
            layout.pkg_dir.display()
        ));
    }

    if cmd.skip_package {
        logger::success(&format!(
            "Built {} {} (package creation skipped)",
            build_file.pkgname(),
            build_file.version()
        ));
        return Ok(());
    }

    let nfpm = config.ensure_nfpm_path()?;
    let output_dir = cmd.output_dir.unwrap_or_else(|| config.get_output_dir());
    fs::create_dir_all(&output_dir)?;
    let target = output_dir.join(build_file.package_file_name(format));

    let writer = NfpmWriter::new(nfpm, layout.work_dir.join("nfpm.yaml"));
    write_package(&build_file, format, &layout, &target, &writer)
}

fn is_empty_dir(dir: &Path) -> io::Result<bool> {
    Ok(fs::read_dir(dir)?.next().is_none())
}

/// Run `build`, then `package`, both from the source directory.
pub fn run_stages(
    build_file: &BuildFile,
    layout: &BuildLayout,
    interpreter: &dyn ScriptInterpreter,
) -> Result<(), CliError> {
    let metadata = build_file.metadata_env();

    logger::stage(FunctionKind::Build.name());
    let ctx = StageContext::new(FunctionKind::Build.name(), &layout.src_dir)
        .with_env(metadata.clone());
    interpreter.run(build_file.build_func(), &ctx)?;

    logger::stage(FunctionKind::Package.name());
    let ctx = StageContext::new(FunctionKind::Package.name(), &layout.src_dir)
        .with_env(metadata)
        .with_env([("pkgdir", layout.pkg_dir.display().to_string())]);
    interpreter.run(build_file.package_func(), &ctx)
}

pub fn write_package(
    build_file: &BuildFile,
    format: PackageFormat,
    layout: &BuildLayout,
    target: &Path,
    writer: &dyn PackageWriter,
) -> Result<(), CliError> {
    logger::spinner_start(&format!("Creating {}...", target.display()));
    match writer.write(build_file, format, &layout.pkg_dir, target) {
        Ok(()) => {
            logger::spinner_success(&format!("Created {}", target.display()));
            Ok(())
        }
        Err(e) => {
            logger::spinner_error(&format!("Failed to create {}", target.display()));
            Err(e)
        }
    }
}
