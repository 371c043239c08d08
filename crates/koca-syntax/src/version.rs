use serde::{Deserialize, Serialize};
use std::fmt;

const EPOCH_SEPARATOR: char = ':';
const PKGREL_SEPARATOR: char = '-';

/// A package's version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// The upstream version segment (`1.0.0` in `2:1.0.0-3`).
    pub pkgver: String,
    /// The package release segment (`3` in `2:1.0.0-3`).
    pub pkgrel: u32,
    /// The epoch segment (`2` in `2:1.0.0-3`). Zero when the build file
    /// does not set one.
    #[serde(default)]
    pub epoch: u32,
}

impl Version {
    pub fn new(pkgver: impl Into<String>, pkgrel: u32, epoch: u32) -> Self {
        Version {
            pkgver: pkgver.into(),
            pkgrel,
            epoch,
        }
    }

    /// `pkgver-pkgrel`, without the epoch.
    pub fn without_epoch(&self) -> String {
        format!("{}{}{}", self.pkgver, PKGREL_SEPARATOR, self.pkgrel)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}{}", self.epoch, EPOCH_SEPARATOR)?;
        }
        write!(f, "{}{}{}", self.pkgver, PKGREL_SEPARATOR, self.pkgrel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_without_epoch() {
        assert_eq!(Version::new("1.2.3", 1, 0).to_string(), "1.2.3-1");
    }

    #[test]
    fn test_version_with_epoch() {
        assert_eq!(Version::new("1.2.3", 1, 2).to_string(), "2:1.2.3-1");
        assert_eq!(Version::new("1.2.3", 1, 2).without_epoch(), "1.2.3-1");
    }

    #[test]
    fn test_version_keeps_free_form_pkgver() {
        assert_eq!(Version::new("2024.01.rc1", 7, 0).to_string(), "2024.01.rc1-7");
    }
}
