//! Pattern construction for document-store regex filters.
//!
//! User input never reaches a pattern unescaped. Patterns are built here,
//! serialized as `$regex` for the remote store, and compiled with the
//! `regex` crate for in-memory evaluation. The escaped forms are valid in
//! both dialects.

use regex::{Regex, RegexBuilder};

/// Characters with special meaning in a regular expression.
const PATTERN_METACHARACTERS: &[char] = &[
    '.', '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// Allowed gap between characters of a separator-tolerant pattern.
const SEPARATOR_GAP: &str = r"[-_\s]*";

/// Escape every pattern metacharacter so `input` matches literally.
pub fn escape_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() * 2);
    for c in input.chars() {
        push_escaped(&mut escaped, c);
    }
    escaped
}

fn push_escaped(out: &mut String, c: char) {
    if PATTERN_METACHARACTERS.contains(&c) {
        out.push('\\');
    }
    out.push(c);
}

fn is_separator(c: char) -> bool {
    c == '-' || c == '_' || c.is_whitespace()
}

/// A regular expression filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    case_insensitive: bool,
}

impl Pattern {
    /// Case-insensitive substring match of `text` taken literally.
    pub fn literal(text: &str) -> Self {
        Self {
            source: escape_pattern(text),
            case_insensitive: true,
        }
    }

    /// Alias of [`Pattern::literal`] for "field contains" clauses.
    pub fn contains(text: &str) -> Self {
        Self::literal(text)
    }

    /// Whole-value, case-insensitive match that ignores hyphens, underscores
    /// and whitespace between characters.
    ///
    /// Returns `None` when `input` holds nothing but separators.
    pub fn separator_tolerant(input: &str) -> Option<Self> {
        let chars: Vec<char> = input.chars().filter(|c| !is_separator(*c)).collect();
        if chars.is_empty() {
            return None;
        }

        let mut source = String::from("^");
        for (i, c) in chars.into_iter().enumerate() {
            if i > 0 {
                source.push_str(SEPARATOR_GAP);
            }
            push_escaped(&mut source, c);
        }
        source.push('$');

        Some(Self {
            source,
            case_insensitive: true,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    /// Options string in the `$options` format.
    pub fn options(&self) -> &'static str {
        if self.case_insensitive {
            "i"
        } else {
            ""
        }
    }

    /// Compile for in-memory matching.
    pub fn compile(&self) -> Result<Regex, regex::Error> {
        RegexBuilder::new(&self.source)
            .case_insensitive(self.case_insensitive)
            .build()
    }
}
