use crate::grammar::ScriptDocument;
use crate::ManifestError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of the maintainer comment line.
pub const MAINTAINER_PREFIX: &str = "Maintainer:";

/// RFC 5322 `addr-spec`: a dot-atom or quoted local part, and a dot-atom or
/// literal domain.
#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static ADDR_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r#"^(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|"(?:[^"\\\r\n]|\\.)*")"#,
        r#"@(?:[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*"#,
        r#"|\[[^\[\]\\\r\n]*\])$"#,
    ))
    .expect("address pattern should compile")
});

/// Characters that need quoting inside a display name.
const NAME_SPECIALS: &[char] = &['<', '>', '@', ',', ';', ':', '\\', '"', '[', ']', '(', ')'];

/// The person responsible for a package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Maintainer {
    /// Display name, possibly empty.
    pub name: String,
    pub email: String,
}

impl Maintainer {
    /// Parse `Name <address>` or a bare `address`.
    pub fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err("no address given".to_string());
        }

        let (name, email) = match value.strip_suffix('>').and_then(|rest| rest.rsplit_once('<')) {
            Some((name, email)) => (parse_display_name(name.trim())?, email.trim()),
            None if value.contains(['<', '>']) => {
                return Err("unbalanced angle brackets".to_string());
            }
            None => (String::new(), value),
        };

        if !ADDR_SPEC.is_match(email) {
            return Err(format!("'{email}' is not a valid mail address"));
        }

        Ok(Maintainer {
            name,
            email: email.to_string(),
        })
    }
}

fn parse_display_name(name: &str) -> Result<String, String> {
    if let Some(quoted) = name.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        let mut out = String::with_capacity(quoted.len());
        let mut chars = quoted.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.extend(chars.next()),
                '"' => return Err("unescaped quote in display name".to_string()),
                _ => out.push(c),
            }
        }
        return Ok(out);
    }

    if let Some(bad) = name.chars().find(|c| NAME_SPECIALS.contains(c)) {
        return Err(format!("'{bad}' must be quoted in a display name"));
    }
    Ok(name.split_whitespace().collect::<Vec<_>>().join(" "))
}

impl fmt::Display for Maintainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.email)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// Find the maintainer among the comments above the first statement.
///
/// Only that one location is inspected. Zero or several `Maintainer:` lines,
/// or an unparsable one, is an error.
pub fn extract_maintainer(doc: &ScriptDocument) -> Result<Maintainer, ManifestError> {
    let first = doc
        .statements
        .first()
        .ok_or(ManifestError::MissingMaintainer)?;

    let mut found: Option<(usize, &str)> = None;
    for comment in &first.leading_comments {
        let Some(value) = comment.text.trim().strip_prefix(MAINTAINER_PREFIX) else {
            continue;
        };
        if found.is_some() {
            return Err(ManifestError::DuplicateMaintainer { line: comment.line });
        }
        found = Some((comment.line, value));
    }

    let (line, value) = found.ok_or(ManifestError::MissingMaintainer)?;
    Maintainer::parse(value).map_err(|reason| ManifestError::InvalidMaintainer {
        line,
        value: value.trim().to_string(),
        reason,
    })
}
