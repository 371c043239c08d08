//! Quote removal for the literal word forms the shell knows.

/// Unquoted word: a backslash escapes the next character, and a
/// backslash-newline pair disappears.
pub(crate) fn unescape_unquoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('\n') | None => {}
                Some(next) => out.push(next),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// An unquoted leading `~` is replaced with a home directory by the shell.
pub(crate) fn expands_tilde(text: &str) -> bool {
    text.starts_with('~')
}

/// `'...'`: everything between the quotes, verbatim.
pub(crate) fn strip_single_quoted(text: &str) -> String {
    strip_delimiters(text, "'", "'").to_string()
}

/// `"..."`: only `$`, `` ` ``, `"`, `\` and newline can be escaped.
pub(crate) fn unescape_double_quoted(text: &str) -> String {
    let inner = strip_delimiters(text, "\"", "\"");
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('\n') => {
                chars.next();
            }
            Some(&next @ ('$' | '`' | '"' | '\\')) => {
                chars.next();
                out.push(next);
            }
            _ => out.push('\\'),
        }
    }
    out
}

/// `$'...'`: C-style escapes.
pub(crate) fn unescape_ansi_c(text: &str) -> String {
    let inner = strip_delimiters(text, "$'", "'");
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('a') => out.push('\u{7}'),
            Some('b') => out.push('\u{8}'),
            Some('e' | 'E') => out.push('\u{1b}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some(other @ ('\\' | '\'' | '"' | '?')) => out.push(other),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn strip_delimiters<'a>(text: &'a str, open: &str, close: &str) -> &'a str {
    let inner = text.strip_prefix(open).unwrap_or(text);
    inner.strip_suffix(close).unwrap_or(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquoted_escapes() {
        assert_eq!(unescape_unquoted(r"foo\ bar"), "foo bar");
        assert_eq!(unescape_unquoted("foo\\\nbar"), "foobar");
        assert_eq!(unescape_unquoted("plain"), "plain");
    }

    #[test]
    fn test_single_quoted_is_verbatim() {
        assert_eq!(strip_single_quoted(r"'a \n $b'"), r"a \n $b");
    }

    #[test]
    fn test_double_quoted_escapes() {
        assert_eq!(unescape_double_quoted(r#""say \"hi\"""#), r#"say "hi""#);
        assert_eq!(unescape_double_quoted(r#""cost \$5""#), "cost $5");
        assert_eq!(unescape_double_quoted(r#""keep \n""#), r"keep \n");
    }

    #[test]
    fn test_ansi_c_escapes() {
        assert_eq!(unescape_ansi_c(r"$'a\tb'"), "a\tb");
        assert_eq!(unescape_ansi_c(r"$'it\'s'"), "it's");
    }
}
