//! CSS selector subset used for scoping and querying.
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, `[attr^=value]`, `[attr*=value]`, compound selectors,
//! descendant (whitespace) and child (`>`) combinators, and comma lists.
//! Identifiers accept CSS escapes, so ids produced by
//! [`ContentId::to_selector`](crate::model::ContentId::to_selector) round-trip.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::{DocumentAccess, NodeId};

/// Errors produced while parsing a selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    /// Selector (or one comma-separated part of it) is empty.
    #[error("Selector is empty: {0:?}")]
    Empty(String),

    /// A character that cannot start or continue a selector was found.
    #[error("Unexpected {found:?} at position {position} in selector {selector:?}")]
    Unexpected {
        /// Full selector text.
        selector: String,
        /// Character offset of the offending character.
        position: usize,
        /// The offending character.
        found: char,
    },

    /// Input ended in the middle of a construct.
    #[error("Unexpected end of selector {0:?}")]
    UnexpectedEnd(String),
}

/// Attribute condition inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrCondition {
    Exists { name: String },
    Equals { name: String, value: String },
    StartsWith { name: String, value: String },
    Contains { name: String, value: String },
}

impl AttrCondition {
    fn matches<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        match self {
            AttrCondition::Exists { name } => doc.attribute(node, name).is_some(),
            AttrCondition::Equals { name, value } => {
                doc.attribute(node, name).as_deref() == Some(value.as_str())
            }
            AttrCondition::StartsWith { name, value } => doc
                .attribute(node, name)
                .is_some_and(|v| !value.is_empty() && v.starts_with(value.as_str())),
            AttrCondition::Contains { name, value } => doc
                .attribute(node, name)
                .is_some_and(|v| !value.is_empty() && v.contains(value.as_str())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One compound selector, e.g. `div.panel[data-x]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    universal: bool,
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some(tag) = doc.tag_name(node) else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if !tag.eq_ignore_ascii_case(expected) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attribute(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if self.classes.iter().any(|class| !doc.has_class(node, class)) {
            return false;
        }
        self.attrs.iter().all(|cond| cond.matches(doc, node))
    }
}

/// A compound plus the combinator linking it to the compound on its left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    combinator: Option<Combinator>,
    compound: Compound,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Vec<Part>>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse()
    }

    /// `[name]`
    pub fn attribute(name: &str) -> Self {
        Self::single(
            format!("[{}]", name),
            Compound {
                attrs: vec![AttrCondition::Exists {
                    name: name.to_string(),
                }],
                ..Compound::default()
            },
        )
    }

    /// `[name="value"]`
    pub fn attribute_value(name: &str, value: &str) -> Self {
        Self::single(
            format!("[{}=\"{}\"]", name, value.replace('"', "\\\"")),
            Compound {
                attrs: vec![AttrCondition::Equals {
                    name: name.to_string(),
                    value: value.to_string(),
                }],
                ..Compound::default()
            },
        )
    }

    /// Type selector, e.g. `video`.
    pub fn tag(name: &str) -> Self {
        Self::single(
            name.to_ascii_lowercase(),
            Compound {
                tag: Some(name.to_ascii_lowercase()),
                ..Compound::default()
            },
        )
    }

    /// `.class`
    pub fn class(name: &str) -> Self {
        Self::single(
            format!(".{}", name),
            Compound {
                classes: vec![name.to_string()],
                ..Compound::default()
            },
        )
    }

    fn single(source: String, compound: Compound) -> Self {
        Self {
            source,
            alternatives: vec![vec![Part {
                combinator: None,
                compound,
            }]],
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `node` matches any alternative of this selector.
    pub fn matches<D: DocumentAccess + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|parts| matches_chain(doc, node, parts))
    }
}

/// Right-to-left match of one complex selector.
fn matches_chain<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId, parts: &[Part]) -> bool {
    let Some((last, rest)) = parts.split_last() else {
        return false;
    };
    if !last.compound.matches(doc, node) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }

    match last.combinator.unwrap_or(Combinator::Descendant) {
        Combinator::Child => doc
            .parent(node)
            .is_some_and(|parent| matches_chain(doc, parent, rest)),
        Combinator::Descendant => {
            let mut cursor = doc.parent(node);
            while let Some(ancestor) = cursor {
                if matches_chain(doc, ancestor, rest) {
                    return true;
                }
                cursor = doc.parent(ancestor);
            }
            false
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ===== Parser =====

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Selector, SelectorError> {
        let mut alternatives = Vec::new();
        loop {
            alternatives.push(self.parse_complex()?);
            if self.peek() == Some(',') {
                self.pos += 1;
                continue;
            }
            break;
        }
        Ok(Selector {
            source: self.source.trim().to_string(),
            alternatives,
        })
    }

    fn parse_complex(&mut self) -> Result<Vec<Part>, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = None;
        self.skip_whitespace();

        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return match self.peek() {
                    None | Some(',') => Err(SelectorError::Empty(self.source.to_string())),
                    Some(found) => Err(self.unexpected(found)),
                };
            }
            parts.push(Part {
                combinator,
                compound,
            });

            let had_whitespace = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => return Ok(parts),
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinator = Some(Combinator::Child);
                }
                Some(_) if had_whitespace => combinator = Some(Combinator::Descendant),
                Some(found) => return Err(self.unexpected(found)),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                compound.universal = true;
            }
            Some(c) if is_ident_char(c) || c == '\\' => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attribute()?);
                }
                _ => break,
            }
        }

        Ok(compound)
    }

    fn parse_attribute(&mut self) -> Result<AttrCondition, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttrCondition::Exists { name });
            }
            Some('=') => {
                self.pos += 1;
                '='
            }
            Some(c @ ('^' | '*')) => {
                self.pos += 1;
                match self.peek() {
                    Some('=') => self.pos += 1,
                    Some(found) => return Err(self.unexpected(found)),
                    None => return Err(SelectorError::UnexpectedEnd(self.source.to_string())),
                }
                c
            }
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(SelectorError::UnexpectedEnd(self.source.to_string())),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                self.parse_quoted(quote)?
            }
            Some(_) => self.parse_ident()?,
            None => return Err(SelectorError::UnexpectedEnd(self.source.to_string())),
        };
        self.skip_whitespace();
        match self.peek() {
            Some(']') => self.pos += 1,
            Some(found) => return Err(self.unexpected(found)),
            None => return Err(SelectorError::UnexpectedEnd(self.source.to_string())),
        }

        Ok(match op {
            '=' => AttrCondition::Equals { name, value },
            '^' => AttrCondition::StartsWith { name, value },
            _ => AttrCondition::Contains { name, value },
        })
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let mut out = String::new();
        loop {
            match self.next() {
                None => return Err(SelectorError::UnexpectedEnd(self.source.to_string())),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) => out.push(c),
            }
        }
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.pos += 1;
                out.push(self.parse_escape()?);
            } else if is_ident_char(c) {
                self.pos += 1;
                out.push(c);
            } else {
                break;
            }
        }
        if out.is_empty() {
            return match self.peek() {
                Some(found) => Err(self.unexpected(found)),
                None => Err(SelectorError::UnexpectedEnd(self.source.to_string())),
            };
        }
        Ok(out)
    }

    /// Escape body after the backslash: 1-6 hex digits plus one optional
    /// whitespace, or any single character taken literally.
    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        let start = self.pos;
        while self.pos - start < 6 && self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
            self.pos += 1;
        }
        if self.pos > start {
            let hex: String = self.chars[start..self.pos].iter().collect();
            if self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
                self.pos += 1;
            }
            let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
            return Ok(match char::from_u32(code) {
                Some('\0') | None => '\u{FFFD}',
                Some(c) => c,
            });
        }
        self.next()
            .ok_or_else(|| SelectorError::UnexpectedEnd(self.source.to_string()))
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            selector: self.source.to_string(),
            position: self.pos,
            found,
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

#[cfg(test)]
#[path = "selector_tests.rs"]
mod tests;
