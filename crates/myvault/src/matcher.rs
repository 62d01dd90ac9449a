//! Property expression matching
//!
//! An expression is one or more glob alternatives separated by `|`:
//!
//! - `website1.com` exact (case-insensitive)
//! - `web*.com`, `api?`, `db[0-9]` glob
//! - `web*|*api*|database.*` any of several
//!
//! Empty alternatives are ignored. An empty expression, or an empty value,
//! never matches.

use glob::Pattern;
use std::fmt;

/// A compiled filter expression
#[derive(Debug, Clone)]
pub struct FilterExpression {
    source: String,
    alternatives: Vec<Pattern>,
}

/// Compile one lower-cased alternative. Falls back to a fully escaped
/// pattern if the glob crate still rejects it.
fn compile(text: &str) -> Option<Pattern> {
    let lowered = collapse_stars(&text.to_lowercase());
    Pattern::new(&escape_unclosed_brackets(&lowered))
        .or_else(|_| Pattern::new(&Pattern::escape(&lowered)))
        .ok()
}

/// `**` means recursive descent to the glob crate; here a run of stars is
/// just "any run of characters".
fn collapse_stars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '*' && out.ends_with('*') {
            continue;
        }
        out.push(c);
    }
    out
}

/// A `[` with no closing `]` is an ordinary character, the rest of the
/// pattern keeps its glob meaning. `]` right after `[` or `[!` belongs to
/// the class.
fn escape_unclosed_brackets(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '[' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let mut j = i + 1;
        if chars.get(j) == Some(&'!') {
            j += 1;
        }
        if chars.get(j) == Some(&']') {
            j += 1;
        }

        match chars[j.min(chars.len())..].iter().position(|&c| c == ']') {
            Some(offset) => {
                let close = j + offset;
                out.extend(&chars[i..=close]);
                i = close + 1;
            }
            None => {
                out.push_str("[[]");
                i += 1;
            }
        }
    }
    out
}

impl FilterExpression {
    pub fn parse(expression: &str) -> Self {
        let alternatives = expression
            .split('|')
            .map(str::trim)
            .filter(|alt| !alt.is_empty())
            .filter_map(compile)
            .collect();

        Self {
            source: expression.to_string(),
            alternatives,
        }
    }

    /// True when no usable alternative remains
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        let value = value.to_lowercase();
        self.alternatives.iter().any(|pattern| pattern.matches(&value))
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Match a property value against an expression
pub fn matches(value: &str, expression: &str) -> bool {
    FilterExpression::parse(expression).matches(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_case_insensitive() {
        assert!(matches("website1.com", "website1.com"));
        assert!(!matches("website1.com", "website2.com"));
        assert!(matches("Website1.Com", "website1.com"));
        assert!(matches("website1.com", "WEBSITE1.COM"));
    }

    #[test]
    fn test_glob_patterns() {
        assert!(matches("website1.com", "web*"));
        assert!(matches("website1.com", "*.com"));
        assert!(matches("website1.com", "*site*"));

        assert!(matches("web1.com", "web?.com"));
        assert!(!matches("web123.com", "web?.com"));

        assert!(matches("web1.com", "web[0-9].com"));
        assert!(!matches("weba.com", "web[0-9].com"));
        assert!(matches("weba.com", "web[!0-9].com"));
    }

    #[test]
    fn test_alternatives_are_or() {
        let expr = "web*|*api*|database.*";
        assert!(matches("Website1.com", expr));
        assert!(matches("web2.net", expr));
        assert!(matches("myapi.server", expr));
        assert!(matches("database.prod", expr));
        assert!(!matches("ftp.server", expr));

        assert!(matches("Website1.com", "web*|*api*"));
        assert!(!matches("ftp.server", "web*|*api*"));
        assert!(matches("Website1.com", "*api*|web*"));
    }

    #[test]
    fn test_empty_inputs_never_match() {
        assert!(!matches("", "pattern"));
        assert!(!matches("property", ""));
        assert!(!matches("", ""));
        assert!(!matches("", "*"));
        assert!(!matches("property", " | |"));
        assert!(FilterExpression::parse(" | ").is_empty());
    }

    #[test]
    fn test_whitespace_around_alternatives() {
        let expr = " web* | *api* | database.* ";
        assert!(matches("website1.com", expr));
        assert!(matches("api.service", expr));
        assert!(matches("database.prod", expr));
    }

    #[test]
    fn test_unclosed_bracket_is_literal() {
        assert!(matches("a[b", "A[B"));
        assert!(!matches("ab", "a[b"));
        // the rest of the alternative is still a glob
        assert!(matches("a[bxyz", "a[b*"));
        assert!(matches("web[1", "web[?"));
        assert!(!matches("web[12", "web[?"));
        assert!(matches("[]", "[]"));
        assert!(matches("x[!", "x[!"));
    }

    #[test]
    fn test_escape_unclosed_brackets() {
        assert_eq!(escape_unclosed_brackets("web[0-9]"), "web[0-9]");
        assert_eq!(escape_unclosed_brackets("a[b*"), "a[[]b*");
        assert_eq!(escape_unclosed_brackets("[]]x"), "[]]x");
        assert_eq!(escape_unclosed_brackets("[[]"), "[[]");
        assert_eq!(escape_unclosed_brackets("a[b[0-9]"), "a[b[0-9]");
    }

    #[test]
    fn test_odd_patterns() {
        // repeated stars behave like one
        assert!(matches("web/site", "web**"));
        assert!(matches("x.y", "*"));
    }

    #[test]
    fn test_display_keeps_source() {
        let expr = FilterExpression::parse("Web*|API");
        assert_eq!(expr.to_string(), "Web*|API");
        assert_eq!(expr.as_str(), "Web*|API");
    }
}
