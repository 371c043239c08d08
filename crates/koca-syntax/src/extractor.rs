//! Single pass over the top-level statements of a build file.
//!
//! Every statement is routed to a variable slot, a function slot, or an
//! error. Problems are collected rather than returned early so a build file
//! author sees all of them at once; typing the collected values is left to
//! [`crate::validator`].

use crate::grammar::{
    AssignedValue, AssignmentStatement, FunctionHandle, ScriptDocument, Statement, StatementKind,
    Word,
};
use crate::names::{FunctionKind, ValueShape, Variable};
use crate::ManifestError;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// A value together with the line it was assigned on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue<T> {
    pub line: usize,
    pub value: T,
}

/// Literal variable values, keyed by recognized name and already checked
/// for shape.
#[derive(Debug, Clone, Default)]
pub struct RawVariables {
    scalars: HashMap<Variable, RawValue<String>>,
    arrays: HashMap<Variable, RawValue<Vec<String>>>,
    /// First assignment line of every recognized name, rejected ones included.
    seen: HashMap<Variable, usize>,
    rejected: HashSet<Variable>,
}

impl RawVariables {
    pub fn scalar(&self, var: Variable) -> Option<&RawValue<String>> {
        self.scalars.get(&var)
    }

    pub fn array(&self, var: Variable) -> Option<&RawValue<Vec<String>>> {
        self.arrays.get(&var)
    }

    pub fn insert_scalar(&mut self, var: Variable, line: usize, value: impl Into<String>) {
        self.seen.entry(var).or_insert(line);
        self.scalars.insert(
            var,
            RawValue {
                line,
                value: value.into(),
            },
        );
    }

    pub fn insert_array(&mut self, var: Variable, line: usize, value: Vec<String>) {
        self.seen.entry(var).or_insert(line);
        self.arrays.insert(var, RawValue { line, value });
    }

    /// Line of the first assignment to `var`, whether or not its value was
    /// accepted.
    pub fn line_of(&self, var: Variable) -> Option<usize> {
        self.seen.get(&var).copied()
    }

    /// Whether `var` was assigned but its value already produced an error.
    ///
    /// Such variables are not reported again as missing.
    pub fn is_rejected(&self, var: Variable) -> bool {
        self.rejected.contains(&var)
    }

    pub(crate) fn reject(&mut self, var: Variable) {
        self.rejected.insert(var);
    }
}

/// The recognized functions found in a build file.
#[derive(Debug, Clone, Default)]
pub struct RawFunctions {
    handles: HashMap<FunctionKind, FunctionHandle>,
}

impl RawFunctions {
    pub fn get(&self, kind: FunctionKind) -> Option<&FunctionHandle> {
        self.handles.get(&kind)
    }

    pub fn insert(&mut self, kind: FunctionKind, handle: FunctionHandle) {
        self.handles.insert(kind, handle);
    }

    pub fn take(&mut self, kind: FunctionKind) -> Option<FunctionHandle> {
        self.handles.remove(&kind)
    }
}

/// Everything the extraction pass produced.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub variables: RawVariables,
    pub functions: RawFunctions,
    pub errors: Vec<ManifestError>,
}

/// Route every top-level statement of `doc`.
pub fn extract(doc: &ScriptDocument) -> Extraction {
    let mut extraction = Extraction::default();
    for stmt in &doc.statements {
        extraction.route(stmt);
    }
    extraction
}

impl Extraction {
    fn route(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Assignment(assign) => self.assignment(stmt.line, assign),
            StatementKind::Function(handle) => self.function(stmt.line, handle),
            StatementKind::Command { words } => {
                self.errors.push(ManifestError::TopLevelCommand {
                    line: stmt.line,
                    command: words.join(" "),
                });
            }
            StatementKind::Other { kind, text } => {
                debug!("line {}: rejecting top-level {}", stmt.line, kind);
                self.errors.push(ManifestError::TopLevelCommand {
                    line: stmt.line,
                    command: first_line(text),
                });
            }
        }
    }

    fn function(&mut self, line: usize, handle: &FunctionHandle) {
        let Some(kind) = FunctionKind::from_name(handle.name()) else {
            self.errors.push(ManifestError::UnknownFunction {
                line,
                name: handle.name().to_string(),
            });
            return;
        };

        if let Some(first) = self.functions.get(kind) {
            self.errors.push(ManifestError::DuplicateFunction {
                line,
                name: kind.name().to_string(),
                first_line: first.line(),
            });
            return;
        }

        debug!("line {}: found {} function", line, kind);
        self.functions.insert(kind, handle.clone());
    }

    fn assignment(&mut self, line: usize, assign: &AssignmentStatement) {
        if !assign.args.is_empty() {
            self.errors.push(ManifestError::TopLevelCommand {
                line,
                command: assign.args.join(" "),
            });
            return;
        }

        let [target] = assign.targets.as_slice() else {
            for var in assign
                .targets
                .iter()
                .filter_map(|target| Variable::from_name(&target.name))
            {
                self.variables.reject(var);
            }
            self.errors.push(ManifestError::MultipleAssignments {
                line,
                count: assign.targets.len(),
            });
            return;
        };

        let Some(var) = Variable::from_name(&target.name) else {
            self.errors.push(ManifestError::UnknownVariable {
                line,
                name: target.name.clone(),
            });
            return;
        };

        if let Some(first_line) = self.variables.line_of(var) {
            self.errors.push(ManifestError::DuplicateVariable {
                line,
                name: var.name().to_string(),
                first_line,
            });
            return;
        }
        self.variables.seen.insert(var, line);

        let name = var.name().to_string();
        match (var.shape(), &target.value) {
            (ValueShape::Scalar, AssignedValue::Scalar(word)) => match &word.literal {
                Some(value) => self.variables.insert_scalar(var, line, value.clone()),
                None => self.reject(var, ManifestError::InvalidExpansion { line, name }),
            },
            (ValueShape::Array, AssignedValue::Array(words)) => match literals(words) {
                Some(values) => self.variables.insert_array(var, line, values),
                None => self.reject(var, ManifestError::InvalidExpansion { line, name }),
            },
            (ValueShape::Scalar, AssignedValue::Array(_)) => {
                self.reject(var, ManifestError::NotScalar { line, name });
            }
            (ValueShape::Array, AssignedValue::Scalar(_)) => {
                self.reject(var, ManifestError::NotArray { line, name });
            }
        }
    }

    fn reject(&mut self, var: Variable, err: ManifestError) {
        self.variables.reject(var);
        self.errors.push(err);
    }
}

fn literals(words: &[Word]) -> Option<Vec<String>> {
    words.iter().map(|word| word.literal.clone()).collect()
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::AssignmentTarget;
    use crate::ErrorKind;

    fn stmt(line: usize, kind: StatementKind) -> Statement {
        Statement {
            line,
            leading_comments: Vec::new(),
            kind,
        }
    }

    fn scalar(line: usize, name: &str, value: &str) -> Statement {
        stmt(
            line,
            StatementKind::Assignment(AssignmentStatement {
                targets: vec![AssignmentTarget {
                    name: name.to_string(),
                    value: AssignedValue::Scalar(Word::literal(value)),
                }],
                args: Vec::new(),
            }),
        )
    }

    fn array(line: usize, name: &str, values: &[&str]) -> Statement {
        stmt(
            line,
            StatementKind::Assignment(AssignmentStatement {
                targets: vec![AssignmentTarget {
                    name: name.to_string(),
                    value: AssignedValue::Array(values.iter().map(|v| Word::literal(*v)).collect()),
                }],
                args: Vec::new(),
            }),
        )
    }

    fn function(line: usize, name: &str) -> Statement {
        stmt(
            line,
            StatementKind::Function(FunctionHandle::new(
                name,
                line,
                format!("{name}() {{ true; }}"),
                "{ true; }",
            )),
        )
    }

    #[test]
    fn test_routes_variables_and_functions() {
        let doc = ScriptDocument {
            statements: vec![
                scalar(2, "pkgname", "hello"),
                array(3, "arch", &["all"]),
                function(5, "build"),
                function(9, "package"),
            ],
        };
        let extraction = extract(&doc);

        assert!(extraction.errors.is_empty(), "{:?}", extraction.errors);
        assert_eq!(
            extraction.variables.scalar(Variable::PkgName).map(|raw| raw.value.as_str()),
            Some("hello")
        );
        assert_eq!(extraction.variables.line_of(Variable::Arch), Some(3));
        assert!(extraction.functions.get(FunctionKind::Build).is_some());
        assert!(extraction.functions.get(FunctionKind::Package).is_some());
    }

    #[test]
    fn test_multiple_targets_rejected_with_line() {
        let doc = ScriptDocument {
            statements: vec![stmt(
                4,
                StatementKind::Assignment(AssignmentStatement {
                    targets: vec![
                        AssignmentTarget {
                            name: "pkgname".to_string(),
                            value: AssignedValue::Scalar(Word::literal("foo")),
                        },
                        AssignmentTarget {
                            name: "pkgrel".to_string(),
                            value: AssignedValue::Scalar(Word::literal("1")),
                        },
                    ],
                    args: Vec::new(),
                }),
            )],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![ManifestError::MultipleAssignments { line: 4, count: 2 }]
        );
        assert!(extraction.variables.scalar(Variable::PkgName).is_none());
        assert!(extraction.variables.is_rejected(Variable::PkgName));
        assert!(extraction.variables.is_rejected(Variable::PkgRel));
    }

    #[test]
    fn test_unknown_function_does_not_stop_the_scan() {
        let doc = ScriptDocument {
            statements: vec![function(1, "install"), function(5, "build")],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![ManifestError::UnknownFunction {
                line: 1,
                name: "install".to_string()
            }]
        );
        assert!(extraction.functions.get(FunctionKind::Build).is_some());
    }

    #[test]
    fn test_shape_mismatches() {
        let doc = ScriptDocument {
            statements: vec![array(1, "pkgname", &["a", "b"]), scalar(2, "arch", "all")],
        };
        let extraction = extract(&doc);
        let kinds: Vec<_> = extraction.errors.iter().map(ManifestError::kind).collect();
        assert_eq!(kinds, vec![ErrorKind::Type, ErrorKind::Type]);
        assert!(extraction.variables.is_rejected(Variable::PkgName));
        assert!(extraction.variables.is_rejected(Variable::Arch));
    }

    #[test]
    fn test_expansion_and_commands_are_structural() {
        let doc = ScriptDocument {
            statements: vec![
                stmt(
                    1,
                    StatementKind::Assignment(AssignmentStatement {
                        targets: vec![AssignmentTarget {
                            name: "pkgver".to_string(),
                            value: AssignedValue::Scalar(Word::expansion("$(date)")),
                        }],
                        args: Vec::new(),
                    }),
                ),
                stmt(
                    2,
                    StatementKind::Command {
                        words: vec!["rm".to_string(), "-rf".to_string()],
                    },
                ),
                stmt(
                    3,
                    StatementKind::Assignment(AssignmentStatement {
                        targets: vec![AssignmentTarget {
                            name: "CC".to_string(),
                            value: AssignedValue::Scalar(Word::literal("gcc")),
                        }],
                        args: vec!["make".to_string()],
                    }),
                ),
                scalar(4, "license", "MIT"),
            ],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![
                ManifestError::InvalidExpansion {
                    line: 1,
                    name: "pkgver".to_string()
                },
                ManifestError::TopLevelCommand {
                    line: 2,
                    command: "rm -rf".to_string()
                },
                ManifestError::TopLevelCommand {
                    line: 3,
                    command: "make".to_string()
                },
                ManifestError::UnknownVariable {
                    line: 4,
                    name: "license".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_duplicates_keep_first_value() {
        let doc = ScriptDocument {
            statements: vec![
                scalar(1, "pkgname", "first"),
                scalar(2, "pkgname", "second"),
                function(3, "build"),
                function(6, "build"),
            ],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![
                ManifestError::DuplicateVariable {
                    line: 2,
                    name: "pkgname".to_string(),
                    first_line: 1
                },
                ManifestError::DuplicateFunction {
                    line: 6,
                    name: "build".to_string(),
                    first_line: 3
                },
            ]
        );
        assert_eq!(
            extraction.variables.scalar(Variable::PkgName).map(|raw| raw.value.as_str()),
            Some("first")
        );
    }

    fn expanded(line: usize, name: &str, raw: &str) -> Statement {
        stmt(
            line,
            StatementKind::Assignment(AssignmentStatement {
                targets: vec![AssignmentTarget {
                    name: name.to_string(),
                    value: AssignedValue::Scalar(Word::expansion(raw)),
                }],
                args: Vec::new(),
            }),
        )
    }

    #[test]
    fn test_redefinition_after_rejected_value_is_duplicate() {
        let doc = ScriptDocument {
            statements: vec![expanded(3, "pkgver", "$(date)"), scalar(4, "pkgver", "1.0")],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![
                ManifestError::InvalidExpansion {
                    line: 3,
                    name: "pkgver".to_string()
                },
                ManifestError::DuplicateVariable {
                    line: 4,
                    name: "pkgver".to_string(),
                    first_line: 3
                },
            ]
        );
        assert!(extraction.variables.scalar(Variable::PkgVer).is_none());
        assert_eq!(extraction.variables.line_of(Variable::PkgVer), Some(3));
    }

    #[test]
    fn test_expansion_inside_array() {
        let doc = ScriptDocument {
            statements: vec![stmt(
                2,
                StatementKind::Assignment(AssignmentStatement {
                    targets: vec![AssignmentTarget {
                        name: "arch".to_string(),
                        value: AssignedValue::Array(vec![
                            Word::literal("all"),
                            Word::expansion("$ARCH"),
                        ]),
                    }],
                    args: Vec::new(),
                }),
            )],
        };
        let extraction = extract(&doc);
        assert_eq!(
            extraction.errors,
            vec![ManifestError::InvalidExpansion {
                line: 2,
                name: "arch".to_string()
            }]
        );
        assert!(extraction.variables.array(Variable::Arch).is_none());
        assert!(extraction.variables.is_rejected(Variable::Arch));
    }
}
