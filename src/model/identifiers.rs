//! Core identifier newtypes with smart constructors.
//!
//! Content panels are addressed by element id. Raw constructors are never
//! exported - use the smart constructors so every id in the system has been
//! validated once at the boundary.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Element id of a Content panel, the canonical addressing key.
///
/// Valid ids are non-empty and contain neither ASCII whitespace nor NUL,
/// matching what a document accepts as a fragment-addressable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId(String);

impl ContentId {
    /// Smart constructor: validates a bare id (no leading `#`).
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidContentId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidContentId::Empty);
        }
        if raw.contains('\0') {
            return Err(InvalidContentId::ContainsNul);
        }
        if raw.chars().any(|c| c.is_ascii_whitespace()) {
            return Err(InvalidContentId::ContainsWhitespace(raw));
        }
        Ok(Self(raw))
    }

    /// Parse a location fragment or `#id` reference.
    ///
    /// A single leading `#` is stripped; the remainder is taken verbatim.
    pub fn from_fragment(fragment: &str) -> Result<Self, InvalidContentId> {
        Self::new(fragment.strip_prefix('#').unwrap_or(fragment))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `#`-prefixed CSS selector for this id, with identifier escaping applied.
    pub fn to_selector(&self) -> String {
        format!("#{}", escape_identifier(&self.0))
    }

    /// Fragment form (`#id`), unescaped.
    pub fn to_fragment(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accordion group identifier read from a Trigger's group attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupName(String);

impl GroupName {
    /// Smart constructor: validates non-empty group name
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidGroupName> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidGroupName::Empty);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one controller instance, used as its listener registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(usize);

impl InstanceId {
    pub(crate) fn next() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "houdini-{}", self.0)
    }
}

/// Escape a string for use as a CSS identifier.
///
/// Follows the CSSOM "serialize an identifier" rules: control characters and
/// a leading digit (or a digit right after a leading `-`) become code-point
/// escapes (`\31 `), identifier characters and non-ASCII pass through, and
/// any other ASCII character is backslash-escaped. NUL is replaced by U+FFFD.
fn escape_identifier(raw: &str) -> String {
    if raw == "-" {
        return "\\-".to_string();
    }

    let first = raw.chars().next();
    let mut out = String::with_capacity(raw.len());

    for (index, c) in raw.chars().enumerate() {
        let code = c as u32;
        if c == '\0' {
            out.push('\u{FFFD}');
            continue;
        }
        let code_point_escape = (0x01..=0x1F).contains(&code)
            || code == 0x7F
            || (index == 0 && c.is_ascii_digit())
            || (index == 1 && c.is_ascii_digit() && first == Some('-'));
        if code_point_escape {
            out.push_str(&format!("\\{:x} ", code));
            continue;
        }
        if code >= 0x80 || c == '-' || c == '_' || c.is_ascii_alphanumeric() {
            out.push(c);
            continue;
        }
        out.push('\\');
        out.push(c);
    }

    out
}

// ===== Error Types =====

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidContentId {
    #[error("Content ID cannot be empty")]
    Empty,
    #[error("Content ID cannot contain NUL")]
    ContainsNul,
    #[error("Content ID cannot contain whitespace: {0:?}")]
    ContainsWhitespace(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidGroupName {
    #[error("Group name cannot be empty")]
    Empty,
}

// ===== Tests =====
