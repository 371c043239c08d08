use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The system package format an archive is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageFormat {
    /// A Debian `.deb` archive.
    #[default]
    Deb,
    /// An RPM `.rpm` archive.
    Rpm,
}

impl PackageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deb" => Ok(PackageFormat::Deb),
            "rpm" => Ok(PackageFormat::Rpm),
            _ => Err(format!("Unknown package format: {s} (expected deb or rpm)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("deb".parse::<PackageFormat>(), Ok(PackageFormat::Deb));
        assert_eq!("RPM".parse::<PackageFormat>(), Ok(PackageFormat::Rpm));
        assert!("apk".parse::<PackageFormat>().is_err());
    }
}
