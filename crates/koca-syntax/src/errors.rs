use std::fmt;
use thiserror::Error;

/// Broad classification of a [`ManifestError`].
///
/// `Io`, `Grammar` and `Maintainer` errors abort parsing and are always
/// reported alone. Every other kind is accumulated across the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Io,
    Grammar,
    Maintainer,
    Structural,
    Type,
    Presence,
    Enum,
}

impl ErrorKind {
    pub fn is_fatal(self) -> bool {
        matches!(self, ErrorKind::Io | ErrorKind::Grammar | ErrorKind::Maintainer)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Io => "io",
            ErrorKind::Grammar => "grammar",
            ErrorKind::Maintainer => "maintainer",
            ErrorKind::Structural => "structure",
            ErrorKind::Type => "type",
            ErrorKind::Presence => "missing",
            ErrorKind::Enum => "value",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while turning a build file into a [`crate::BuildFile`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    #[error("failed to read build file: {0}")]
    Io(String),

    #[error("line {line}: syntax error near '{snippet}'")]
    Grammar { line: usize, snippet: String },

    #[error("no 'Maintainer:' comment found above the first statement")]
    MissingMaintainer,

    #[error("line {line}: only one 'Maintainer:' comment is allowed")]
    DuplicateMaintainer { line: usize },

    #[error("line {line}: invalid maintainer '{value}': {reason}")]
    InvalidMaintainer {
        line: usize,
        value: String,
        reason: String,
    },

    #[error("line {line}: top-level command execution is not allowed: {command}")]
    TopLevelCommand { line: usize, command: String },

    #[error("line {line}: assignments are limited to one per statement (found {count})")]
    MultipleAssignments { line: usize, count: usize },

    #[error("line {line}: unknown variable '{name}'")]
    UnknownVariable { line: usize, name: String },

    #[error("line {line}: unknown function '{name}'")]
    UnknownFunction { line: usize, name: String },

    #[error("line {line}: variable '{name}' was already defined on line {first_line}")]
    DuplicateVariable {
        line: usize,
        name: String,
        first_line: usize,
    },

    #[error("line {line}: function '{name}' was already defined on line {first_line}")]
    DuplicateFunction {
        line: usize,
        name: String,
        first_line: usize,
    },

    #[error("line {line}: the '{name}' variable attempted to perform expansion, but isn't allowed to do so")]
    InvalidExpansion { line: usize, name: String },

    #[error("line {line}: the '{name}' variable was expected to be a string, but was an array")]
    NotScalar { line: usize, name: String },

    #[error("line {line}: the '{name}' variable was expected to be an array, but was a string")]
    NotArray { line: usize, name: String },

    #[error("line {line}: variable '{name}' must be an integer, got '{value}'")]
    NotInteger {
        line: usize,
        name: String,
        value: String,
    },

    #[error("line {line}: '{value}' is not a valid version (whitespace is not allowed)")]
    InvalidVersion { line: usize, value: String },

    #[error("variable '{0}' is required")]
    MissingVariable(String),

    #[error("function '{0}' is required")]
    MissingFunction(String),

    #[error("line {line}: '{value}' is not a valid architecture")]
    InvalidArch { line: usize, value: String },
}

impl ManifestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ManifestError::Io(_) => ErrorKind::Io,
            ManifestError::Grammar { .. } => ErrorKind::Grammar,
            ManifestError::MissingMaintainer
            | ManifestError::DuplicateMaintainer { .. }
            | ManifestError::InvalidMaintainer { .. } => ErrorKind::Maintainer,
            ManifestError::TopLevelCommand { .. }
            | ManifestError::MultipleAssignments { .. }
            | ManifestError::UnknownVariable { .. }
            | ManifestError::UnknownFunction { .. }
            | ManifestError::DuplicateVariable { .. }
            | ManifestError::DuplicateFunction { .. }
            | ManifestError::InvalidExpansion { .. } => ErrorKind::Structural,
            ManifestError::NotScalar { .. }
            | ManifestError::NotArray { .. }
            | ManifestError::NotInteger { .. }
            | ManifestError::InvalidVersion { .. } => ErrorKind::Type,
            ManifestError::MissingVariable(_) | ManifestError::MissingFunction(_) => {
                ErrorKind::Presence
            }
            ManifestError::InvalidArch { .. } => ErrorKind::Enum,
        }
    }

    /// Source line the error originates from, when there is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::Io(_)
            | ManifestError::MissingMaintainer
            | ManifestError::MissingVariable(_)
            | ManifestError::MissingFunction(_) => None,
            ManifestError::Grammar { line, .. }
            | ManifestError::DuplicateMaintainer { line }
            | ManifestError::InvalidMaintainer { line, .. }
            | ManifestError::TopLevelCommand { line, .. }
            | ManifestError::MultipleAssignments { line, .. }
            | ManifestError::UnknownVariable { line, .. }
            | ManifestError::UnknownFunction { line, .. }
            | ManifestError::DuplicateVariable { line, .. }
            | ManifestError::DuplicateFunction { line, .. }
            | ManifestError::InvalidExpansion { line, .. }
            | ManifestError::NotScalar { line, .. }
            | ManifestError::NotArray { line, .. }
            | ManifestError::NotInteger { line, .. }
            | ManifestError::InvalidVersion { line, .. }
            | ManifestError::InvalidArch { line, .. } => Some(*line),
        }
    }
}

/// The complete, ordered list of problems found in one parse.
///
/// Never empty when returned from [`crate::BuildFile::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(Vec<ManifestError>);

impl ParseErrors {
    pub fn new(errors: Vec<ManifestError>) -> Self {
        ParseErrors(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ManifestError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.0.iter().map(ManifestError::kind).collect()
    }

    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.0.iter().filter(|err| err.kind() == kind).count()
    }

    pub fn into_vec(self) -> Vec<ManifestError> {
        self.0
    }
}

impl From<ManifestError> for ParseErrors {
    fn from(err: ManifestError) -> Self {
        ParseErrors(vec![err])
    }
}

impl<'a> IntoIterator for &'a ParseErrors {
    type Item = &'a ManifestError;
    type IntoIter = std::slice::Iter<'a, ManifestError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ParseErrors {
    type Item = ManifestError;
    type IntoIter = std::vec::IntoIter<ManifestError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, err) in self.0.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// A [`Result<T, ParseErrors>`] type alias.
pub type ParseResult<T> = Result<T, ParseErrors>;
