//! Typing and presence checks over extracted values.
//!
//! Each check appends to the error list and moves on; nothing here stops at
//! the first failure.

use crate::extractor::{RawFunctions, RawVariables};
use crate::grammar::FunctionHandle;
use crate::names::{FunctionKind, Variable};
use crate::{Arch, ManifestError, Version};
use serde::{Deserialize, Serialize};

/// The recognized variables, typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variables {
    pub pkgname: String,
    pub version: Version,
    pub pkgdesc: String,
    pub arch: Vec<Arch>,
}

/// The two required functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Functions {
    pub build: FunctionHandle,
    pub package: FunctionHandle,
}

/// Type the extracted variables.
///
/// The returned list may be empty when a required variable was only rejected
/// during extraction, whose error is already on the extraction list.
pub fn validate_variables(raw: &RawVariables) -> Result<Variables, Vec<ManifestError>> {
    let mut errors = Vec::new();
    let mut incomplete = false;

    for var in Variable::REQUIRED {
        if raw.is_rejected(var) {
            incomplete = true;
            continue;
        }
        let present = match var {
            Variable::Arch => raw.array(var).is_some_and(|arr| !arr.value.is_empty()),
            _ => raw.scalar(var).is_some_and(|s| !s.value.is_empty()),
        };
        if !present {
            errors.push(ManifestError::MissingVariable(var.name().to_string()));
        }
    }

    let pkgname = scalar_text(raw, Variable::PkgName);
    let pkgdesc = scalar_text(raw, Variable::PkgDesc);

    let pkgver = match raw.scalar(Variable::PkgVer) {
        Some(s) if s.value.chars().any(char::is_whitespace) => {
            errors.push(ManifestError::InvalidVersion {
                line: s.line,
                value: s.value.clone(),
            });
            None
        }
        Some(s) => Some(s.value.clone()),
        None => None,
    };

    let pkgrel = parse_integer(raw, Variable::PkgRel, &mut errors);
    let epoch = parse_integer(raw, Variable::Epoch, &mut errors);

    let mut arch = Vec::new();
    if let Some(raw_arch) = raw.array(Variable::Arch) {
        for value in &raw_arch.value {
            match value.parse::<Arch>() {
                Ok(parsed) => arch.push(parsed),
                Err(_) => errors.push(ManifestError::InvalidArch {
                    line: raw_arch.line,
                    value: value.clone(),
                }),
            }
        }
    }

    if incomplete || raw.is_rejected(Variable::Epoch) || !errors.is_empty() {
        return Err(errors);
    }

    match (pkgver, pkgrel) {
        (Some(pkgver), Some(pkgrel)) => Ok(Variables {
            pkgname,
            version: Version::new(pkgver, pkgrel, epoch.unwrap_or(0)),
            pkgdesc,
            arch,
        }),
        _ => Err(errors),
    }
}

/// Take the build and package functions out of `raw`.
pub fn validate_functions(mut raw: RawFunctions) -> Result<Functions, Vec<ManifestError>> {
    let build = raw.take(FunctionKind::Build);
    let package = raw.take(FunctionKind::Package);

    match (build, package) {
        (Some(build), Some(package)) => Ok(Functions { build, package }),
        (build, package) => {
            let mut errors = Vec::new();
            if build.is_none() {
                errors.push(ManifestError::MissingFunction(
                    FunctionKind::Build.name().to_string(),
                ));
            }
            if package.is_none() {
                errors.push(ManifestError::MissingFunction(
                    FunctionKind::Package.name().to_string(),
                ));
            }
            Err(errors)
        }
    }
}

fn scalar_text(raw: &RawVariables, var: Variable) -> String {
    raw.scalar(var)
        .map(|s| s.value.clone())
        .unwrap_or_default()
}

/// Parse an integer variable. Absent or empty text yields `None` without an
/// error; presence is checked separately.
fn parse_integer(
    raw: &RawVariables,
    var: Variable,
    errors: &mut Vec<ManifestError>,
) -> Option<u32> {
    let s = raw.scalar(var).filter(|s| !s.value.is_empty())?;
    // `u32::from_str` would also take a leading `+`.
    let parsed = s
        .value
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| s.value.parse::<u32>().ok())
        .flatten();
    match parsed {
        Some(value) => Some(value),
        None => {
            errors.push(ManifestError::NotInteger {
                line: s.line,
                name: var.name().to_string(),
                value: s.value.clone(),
            });
            None
        }
    }
}
