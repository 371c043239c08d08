//! The closed sets of names a build file may define.

use std::fmt;

/// Whether a variable holds a string or an indexed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    Array,
}

/// A recognized top-level variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Variable {
    PkgName,
    PkgVer,
    PkgRel,
    Epoch,
    PkgDesc,
    Arch,
}

impl Variable {
    pub const ALL: [Variable; 6] = [
        Variable::PkgName,
        Variable::PkgVer,
        Variable::PkgRel,
        Variable::Epoch,
        Variable::PkgDesc,
        Variable::Arch,
    ];

    /// Variables that must be present and non-empty, in reporting order.
    pub const REQUIRED: [Variable; 4] = [
        Variable::PkgName,
        Variable::PkgVer,
        Variable::PkgRel,
        Variable::Arch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::PkgName => "pkgname",
            Variable::PkgVer => "pkgver",
            Variable::PkgRel => "pkgrel",
            Variable::Epoch => "epoch",
            Variable::PkgDesc => "pkgdesc",
            Variable::Arch => "arch",
        }
    }

    pub fn shape(&self) -> ValueShape {
        match self {
            Variable::Arch => ValueShape::Array,
            _ => ValueShape::Scalar,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Variable::ALL.into_iter().find(|var| var.name() == name)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recognized build file function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionKind {
    /// The `build` function, run in the source directory.
    Build,
    /// The `package` function, run with `pkgdir` pointing at the package root.
    Package,
}

impl FunctionKind {
    pub const ALL: [FunctionKind; 2] = [FunctionKind::Build, FunctionKind::Package];

    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::Build => "build",
            FunctionKind::Package => "package",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        FunctionKind::ALL.into_iter().find(|func| func.name() == name)
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_lookup() {
        assert_eq!(Variable::from_name("pkgname"), Some(Variable::PkgName));
        assert_eq!(Variable::from_name("arch"), Some(Variable::Arch));
        assert_eq!(Variable::from_name("license"), None);
        assert_eq!(Variable::from_name("PKGNAME"), None);
    }

    #[test]
    fn test_only_arch_is_an_array() {
        for var in Variable::ALL {
            let expected = if var == Variable::Arch {
                ValueShape::Array
            } else {
                ValueShape::Scalar
            };
            assert_eq!(var.shape(), expected, "{var}");
        }
    }

    #[test]
    fn test_function_lookup() {
        assert_eq!(FunctionKind::from_name("build"), Some(FunctionKind::Build));
        assert_eq!(FunctionKind::from_name("package"), Some(FunctionKind::Package));
        assert_eq!(FunctionKind::from_name("install"), None);
    }
}
