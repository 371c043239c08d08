//! Target architectures a build file may declare.

use crate::PackageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A package's architecture.
///
/// Build files use the generic names (`all`, `any`, `x86_64`). Package
/// formats may know the same architecture under another name, see
/// [`Arch::name_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    /// Architecture-independent: the built files run anywhere without
    /// recompiling (scripts, data).
    All,
    /// Architecture-dependent, but buildable for any architecture.
    Any,
    /// The `x86_64` architecture (`amd64` on Debian-based systems).
    X86_64,
}

impl Arch {
    pub const ALL: [Arch; 3] = [Arch::All, Arch::Any, Arch::X86_64];

    /// Generic name, as written in build files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::All => "all",
            Arch::Any => "any",
            Arch::X86_64 => "x86_64",
        }
    }

    /// Debian-style architecture name.
    pub fn deb_name(&self) -> &'static str {
        match self {
            Arch::All => "all",
            Arch::Any => "any",
            Arch::X86_64 => "amd64",
        }
    }

    /// Name of this architecture in the given package format.
    pub fn name_for(&self, format: PackageFormat) -> &'static str {
        match format {
            PackageFormat::Deb => self.deb_name(),
            PackageFormat::Rpm => self.as_str(),
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Arch {
    type Err = String;

    /// Only generic names are accepted; `amd64` is rejected so every
    /// declared string maps to exactly one spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arch::ALL
            .into_iter()
            .find(|arch| arch.as_str() == s)
            .ok_or_else(|| format!("Unknown architecture: {s}"))
    }
}
