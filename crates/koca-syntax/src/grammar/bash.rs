use super::words;
use super::{
    AssignedValue, AssignmentStatement, AssignmentTarget, Comment, FunctionHandle, ScriptDocument,
    ScriptGrammar, Statement, StatementKind, Word,
};
use crate::ManifestError;
use ast_grep_core::source::StrDoc;
use ast_grep_core::{AstGrep, Node};
use ast_grep_language::Bash;
use tracing::debug;

type BashNode<'r> = Node<'r, StrDoc<Bash>>;

const SNIPPET_LEN: usize = 40;

/// tree-sitter Bash grammar, driven through ast-grep.
#[derive(Debug, Clone, Copy, Default)]
pub struct BashGrammar;

impl ScriptGrammar for BashGrammar {
    fn parse(&self, source: &str) -> Result<ScriptDocument, ManifestError> {
        let sg = AstGrep::new(source, Bash);
        let root = sg.root();
        let lines = LineIndex::new(source);

        if let Some((offset, snippet)) = find_syntax_error(&root) {
            let line = lines.line_of(offset);
            let snippet = if snippet.trim().is_empty() {
                lines.line_text(source, line)
            } else {
                snippet
            };
            return Err(ManifestError::Grammar {
                line,
                snippet: truncate(snippet.trim()),
            });
        }

        let mut statements = Vec::new();
        let mut pending_comments = Vec::new();
        let mut last_end_line = 0;

        for node in root.children() {
            if !node.is_named() {
                continue;
            }
            let range = node.range();
            let line = lines.line_of(range.start);

            if node.kind() == "comment" {
                // A comment sharing a line with the previous statement trails it.
                if line != last_end_line {
                    let text = node.text();
                    pending_comments.push(Comment {
                        line,
                        text: text.strip_prefix('#').unwrap_or(&*text).to_string(),
                    });
                }
                continue;
            }

            let kind = classify(&node, &lines);
            debug!("line {}: top-level {}", line, node.kind());
            statements.push(Statement {
                line,
                leading_comments: std::mem::take(&mut pending_comments),
                kind,
            });
            last_end_line = lines.line_of(range.end.saturating_sub(1).max(range.start));
        }

        Ok(ScriptDocument { statements })
    }
}

fn classify(node: &BashNode<'_>, lines: &LineIndex) -> StatementKind {
    match node.kind().as_ref() {
        "variable_assignment" => StatementKind::Assignment(AssignmentStatement {
            targets: vec![assignment_target(node)],
            args: Vec::new(),
        }),
        "variable_assignments" => StatementKind::Assignment(AssignmentStatement {
            targets: node
                .children()
                .filter(|child| child.kind() == "variable_assignment")
                .map(|child| assignment_target(&child))
                .collect(),
            args: Vec::new(),
        }),
        "command" => classify_command(node),
        "function_definition" => StatementKind::Function(function_handle(node, lines)),
        other => StatementKind::Other {
            kind: other.to_string(),
            text: node.text().to_string(),
        },
    }
}

fn classify_command(node: &BashNode<'_>) -> StatementKind {
    let mut targets = Vec::new();
    let mut words = Vec::new();

    for child in node.children().filter(|child| child.is_named()) {
        match child.kind().as_ref() {
            "variable_assignment" => targets.push(assignment_target(&child)),
            "comment" => {}
            _ => words.push(child.text().to_string()),
        }
    }

    if targets.is_empty() {
        StatementKind::Command { words }
    } else {
        StatementKind::Assignment(AssignmentStatement {
            targets,
            args: words,
        })
    }
}

fn assignment_target(node: &BashNode<'_>) -> AssignmentTarget {
    let name = node
        .field("name")
        .map(|name| name.text().to_string())
        .unwrap_or_default();

    let value = match node.field("value") {
        Some(value) if value.kind() == "array" => AssignedValue::Array(
            value
                .children()
                .filter(|child| child.is_named() && child.kind() != "comment")
                .map(|child| word(&child))
                .collect(),
        ),
        Some(value) => AssignedValue::Scalar(word(&value)),
        // `name=` assigns the empty string.
        None => AssignedValue::Scalar(Word::literal("")),
    };

    AssignmentTarget { name, value }
}

fn function_handle(node: &BashNode<'_>, lines: &LineIndex) -> FunctionHandle {
    let name = node
        .field("name")
        .map(|name| name.text().to_string())
        .unwrap_or_default();
    let body = node
        .field("body")
        .map(|body| body.text().to_string())
        .unwrap_or_default();

    FunctionHandle::new(
        name,
        lines.line_of(node.range().start),
        node.text().to_string(),
        body,
    )
}

fn word(node: &BashNode<'_>) -> Word {
    let raw = node.text().to_string();
    let literal = if words::expands_tilde(&raw) {
        None
    } else {
        literal_value(node)
    };
    Word { raw, literal }
}

/// Quote-removed value of a word node, `None` if it needs expansion.
fn literal_value(node: &BashNode<'_>) -> Option<String> {
    let text = node.text();
    match node.kind().as_ref() {
        "word" | "number" => Some(words::unescape_unquoted(&text)),
        "raw_string" => Some(words::strip_single_quoted(&text)),
        "ansi_c_string" => Some(words::unescape_ansi_c(&text)),
        "string" => node
            .children()
            .filter(|child| child.is_named())
            .all(|child| child.kind() == "string_content")
            .then(|| words::unescape_double_quoted(&text)),
        "concatenation" => {
            let mut out = String::new();
            for child in node.children() {
                if child.is_named() {
                    out.push_str(&literal_value(&child)?);
                } else {
                    out.push_str(&words::unescape_unquoted(&child.text()));
                }
            }
            Some(out)
        }
        _ => None,
    }
}

/// First `ERROR` node or missing token, with its byte offset and text.
fn find_syntax_error(node: &BashNode<'_>) -> Option<(usize, String)> {
    for child in node.children() {
        let range = child.range();
        if is_syntax_error(&child.kind(), child.is_named(), range.len()) {
            return Some((range.start, child.text().to_string()));
        }
        if let Some(found) = find_syntax_error(&child) {
            return Some(found);
        }
    }
    None
}

/// An `ERROR` node, or an anonymous token the parser inserted without
/// consuming any input.
fn is_syntax_error(kind: &str, named: bool, width: usize) -> bool {
    kind == "ERROR" || (!named && width == 0)
}

fn truncate(snippet: &str) -> String {
    let first_line = snippet.lines().next().unwrap_or_default();
    if first_line.chars().count() > SNIPPET_LEN {
        let cut: String = first_line.chars().take(SNIPPET_LEN).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

/// Byte offset to 1-based line lookups.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            source
                .char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(idx, _)| idx + 1),
        );
        LineIndex { starts }
    }

    fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    fn line_text(&self, source: &str, line: usize) -> String {
        let start = self.starts.get(line - 1).copied().unwrap_or(0);
        source[start..].lines().next().unwrap_or_default().to_string()
    }
}
