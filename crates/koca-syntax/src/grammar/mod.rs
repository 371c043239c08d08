//! Generic script tree handed to the extractor
//!
//! The extractor never looks at shell syntax directly. A [`ScriptGrammar`]
//! turns manifest text into a flat list of top-level [`Statement`]s with
//! their source lines, attached comments and already-unquoted literal values.
//! [`BashGrammar`] is the production implementation; tests can build a
//! [`ScriptDocument`] by hand.

mod bash;
mod words;

pub use bash::BashGrammar;

use crate::ManifestError;
use std::fmt;

/// A parsing capability that produces the generic statement tree.
pub trait ScriptGrammar {
    /// Parse a whole document. Any syntax problem yields a single
    /// [`ManifestError::Grammar`].
    fn parse(&self, source: &str) -> Result<ScriptDocument, ManifestError>;
}

/// A parsed script document, top-level statements only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptDocument {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line the statement starts on.
    pub line: usize,
    /// Comment lines directly above the statement, without the leading `#`.
    pub leading_comments: Vec<Comment>,
    pub kind: StatementKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub line: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// One or more `name=value` targets, optionally followed by command words
    /// (`FOO=1 make install`).
    Assignment(AssignmentStatement),
    Function(FunctionHandle),
    /// A plain command invocation.
    Command { words: Vec<String> },
    /// Anything else the grammar knows about (pipelines, loops, ...), named by
    /// the grammar's node kind.
    Other { kind: String, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStatement {
    pub targets: Vec<AssignmentTarget>,
    /// Command words following the assignments, empty for a pure assignment.
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentTarget {
    pub name: String,
    pub value: AssignedValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignedValue {
    Scalar(Word),
    Array(Vec<Word>),
}

/// A single shell word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word exactly as written in the source.
    pub raw: String,
    /// The quote-removed value, or `None` when the word needs expansion
    /// (`$var`, `$(cmd)`, ...) to be known.
    pub literal: Option<String>,
}

impl Word {
    pub fn literal(value: impl Into<String>) -> Self {
        let value = value.into();
        Word {
            raw: value.clone(),
            literal: Some(value),
        }
    }

    pub fn expansion(raw: impl Into<String>) -> Self {
        Word {
            raw: raw.into(),
            literal: None,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.literal.is_some()
    }
}

/// An unexecuted shell function lifted out of the build file.
///
/// The parser only records where the function came from and its source text;
/// running it is up to the script interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionHandle {
    name: String,
    line: usize,
    source: String,
    body: String,
}

impl FunctionHandle {
    pub fn new(
        name: impl Into<String>,
        line: usize,
        source: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        FunctionHandle {
            name: name.into(),
            line,
            source: source.into(),
            body: body.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// The full definition, `name() { ... }`, ready to be sourced.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The function body, braces included.
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl fmt::Display for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}()", self.name)
    }
}
