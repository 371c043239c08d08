use crate::extractor;
use crate::grammar::{BashGrammar, FunctionHandle, ScriptGrammar};
use crate::maintainer::{self, Maintainer};
use crate::names::FunctionKind;
use crate::validator::{self, Functions, Variables};
use crate::{Arch, ManifestError, PackageFormat, ParseErrors, ParseResult, Version};
use serde::Serialize;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// A parsed and validated build file.
///
/// Only obtainable through one of the `parse` constructors, and never changed
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFile {
    maintainer: Maintainer,
    #[serde(flatten)]
    variables: Variables,
    #[serde(skip)]
    functions: Functions,
}

impl BuildFile {
    /// Parse a build file from a reader with the Bash grammar.
    pub fn parse<R: Read>(reader: R) -> ParseResult<Self> {
        Self::parse_with(&BashGrammar, reader)
    }

    pub fn parse_str(source: &str) -> ParseResult<Self> {
        Self::parse_source(&BashGrammar, source)
    }

    pub fn parse_file(path: impl AsRef<Path>) -> ParseResult<Self> {
        let path = path.as_ref();
        debug!("Reading build file {}", path.display());
        let source = fs::read_to_string(path)
            .map_err(|e| ManifestError::Io(format!("{}: {e}", path.display())))?;
        Self::parse_source(&BashGrammar, &source)
    }

    /// Parse with a caller-supplied grammar.
    pub fn parse_with<G, R>(grammar: &G, mut reader: R) -> ParseResult<Self>
    where
        G: ScriptGrammar + ?Sized,
        R: Read,
    {
        let mut source = String::new();
        reader
            .read_to_string(&mut source)
            .map_err(|e| ManifestError::Io(e.to_string()))?;
        Self::parse_source(grammar, &source)
    }

    fn parse_source<G>(grammar: &G, source: &str) -> ParseResult<Self>
    where
        G: ScriptGrammar + ?Sized,
    {
        let doc = grammar.parse(source)?;
        debug!("Parsed {} top-level statements", doc.statements.len());

        let maintainer = maintainer::extract_maintainer(&doc)?;

        let extraction = extractor::extract(&doc);
        let mut errors = extraction.errors;
        let variables = validator::validate_variables(&extraction.variables)
            .map_err(|errs| errors.extend(errs))
            .ok();
        let functions = validator::validate_functions(extraction.functions)
            .map_err(|errs| errors.extend(errs))
            .ok();

        match (variables, functions) {
            (Some(variables), Some(functions)) if errors.is_empty() => {
                info!(
                    "Parsed build file for {} {}",
                    variables.pkgname, variables.version
                );
                Ok(BuildFile {
                    maintainer,
                    variables,
                    functions,
                })
            }
            _ => {
                debug!("Build file rejected with {} errors", errors.len());
                Err(ParseErrors::new(errors))
            }
        }
    }

    pub fn maintainer(&self) -> &Maintainer {
        &self.maintainer
    }

    pub fn pkgname(&self) -> &str {
        &self.variables.pkgname
    }

    pub fn version(&self) -> &Version {
        &self.variables.version
    }

    /// Package description, empty when the build file sets none.
    pub fn pkgdesc(&self) -> &str {
        &self.variables.pkgdesc
    }

    pub fn arch(&self) -> &[Arch] {
        &self.variables.arch
    }

    pub fn build_func(&self) -> &FunctionHandle {
        &self.functions.build
    }

    pub fn package_func(&self) -> &FunctionHandle {
        &self.functions.package
    }

    pub fn function(&self, kind: FunctionKind) -> &FunctionHandle {
        match kind {
            FunctionKind::Build => self.build_func(),
            FunctionKind::Package => self.package_func(),
        }
    }

    /// Variables exported to the `build` and `package` functions.
    ///
    /// `epoch` is only included when it is non-zero.
    pub fn metadata_env(&self) -> Vec<(&'static str, String)> {
        let version = self.version();
        let mut env = vec![
            ("pkgname", self.pkgname().to_string()),
            ("pkgver", version.pkgver.clone()),
            ("pkgrel", version.pkgrel.to_string()),
            ("pkgdesc", self.pkgdesc().to_string()),
        ];
        if version.epoch != 0 {
            env.push(("epoch", version.epoch.to_string()));
        }
        env
    }

    /// Conventional archive name for `format`: `hello_1.0.0-1_amd64.deb` or
    /// `hello-1.0.0-1.x86_64.rpm`. The epoch is never part of the name.
    pub fn package_file_name(&self, format: PackageFormat) -> String {
        let arch = self
            .arch()
            .first()
            .map_or(Arch::All.name_for(format), |arch| arch.name_for(format));
        let version = self.version().without_epoch();
        match format {
            PackageFormat::Deb => format!(
                "{}_{}_{}.{}",
                self.pkgname(),
                version,
                arch,
                format.file_extension()
            ),
            PackageFormat::Rpm => format!(
                "{}-{}.{}.{}",
                self.pkgname(),
                version,
                arch,
                format.file_extension()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{ScriptDocument, Statement, StatementKind};
    use crate::ErrorKind;

    const HELLO: &str = "\
# Maintainer: Foo Bar <foo@example.com>
pkgname=hello
pkgver=1.0.0
pkgrel=1
pkgdesc='Says hello'
arch=(x86_64)

build() {
  make
}

package() {
  install -Dm755 hello \"$pkgdir/usr/bin/hello\"
}
";

    #[test]
    fn test_parse_valid_build_file() -> Result<(), ParseErrors> {
        let file = BuildFile::parse_str(HELLO)?;
        assert_eq!(file.pkgname(), "hello");
        assert_eq!(file.version().to_string(), "1.0.0-1");
        assert_eq!(file.pkgdesc(), "Says hello");
        assert_eq!(file.arch(), &[Arch::X86_64]);
        assert_eq!(file.maintainer().to_string(), "Foo Bar <foo@example.com>");
        assert_eq!(file.build_func().name(), "build");
        assert_eq!(file.function(FunctionKind::Package).line(), 12);
        Ok(())
    }

    #[test]
    fn test_parse_from_reader() -> Result<(), ParseErrors> {
        let file = BuildFile::parse(HELLO.as_bytes())?;
        assert_eq!(file.pkgname(), "hello");
        Ok(())
    }

    #[test]
    fn test_metadata_env_and_file_name() -> Result<(), ParseErrors> {
        let file = BuildFile::parse_str(&HELLO.replace("pkgrel=1", "pkgrel=1\nepoch=3"))?;
        let env = file.metadata_env();
        assert_eq!(
            env,
            vec![
                ("pkgname", "hello".to_string()),
                ("pkgver", "1.0.0".to_string()),
                ("pkgrel", "1".to_string()),
                ("pkgdesc", "Says hello".to_string()),
                ("epoch", "3".to_string()),
            ]
        );
        assert_eq!(
            file.package_file_name(PackageFormat::Deb),
            "hello_1.0.0-1_amd64.deb"
        );
        assert_eq!(
            file.package_file_name(PackageFormat::Rpm),
            "hello-1.0.0-1.x86_64.rpm"
        );
        Ok(())
    }

    #[test]
    fn test_epoch_omitted_from_env_when_zero() -> Result<(), ParseErrors> {
        let file = BuildFile::parse_str(HELLO)?;
        assert!(file.metadata_env().iter().all(|(name, _)| *name != "epoch"));
        Ok(())
    }

    #[test]
    fn test_custom_grammar_is_used() {
        struct Empty;
        impl ScriptGrammar for Empty {
            fn parse(&self, _source: &str) -> Result<ScriptDocument, ManifestError> {
                Ok(ScriptDocument {
                    statements: vec![Statement {
                        line: 1,
                        leading_comments: Vec::new(),
                        kind: StatementKind::Command { words: Vec::new() },
                    }],
                })
            }
        }

        let errors = BuildFile::parse_with(&Empty, HELLO.as_bytes()).err();
        assert_eq!(errors.map(|e| e.kinds()), Some(vec![ErrorKind::Maintainer]));
    }

    #[test]
    fn test_io_failure_is_fatal() {
        let errors = BuildFile::parse_file("/nonexistent/koca/build-file").err();
        assert_eq!(errors.map(|e| e.kinds()), Some(vec![ErrorKind::Io]));
    }
}
