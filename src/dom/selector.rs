//! Minimal CSS-style selector matching.
//!
//! Supports exactly the selector forms this crate queries with: tag
//! names, `[attr]` presence, `[attr=value]` equality, `[attr$=value]`
//! suffix, and `:not(...)` negation. Attribute values may be quoted
//! with `"` or `'`. Matching is case-sensitive throughout; `.gif` and
//! `.GIF` are different suffixes on purpose.

use thiserror::Error;

/// Selector parsing errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unexpected character `{0}` at byte {1}")]
    Unexpected(char, usize),

    #[error("unsupported pseudo-class `:{0}`")]
    UnsupportedPseudo(String),
}

/// One condition of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    /// `img`
    Tag(String),
    /// `[srcset]`
    HasAttr(String),
    /// `[role=main]`
    AttrEq(String, String),
    /// `[src$=".gif"]`
    AttrSuffix(String, String),
    /// `:not(...)`
    Not(Box<Selector>),
}

impl Part {
    fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        match self {
            Part::Tag(name) => tag == name,
            Part::HasAttr(name) => attrs.iter().any(|(k, _)| k == name),
            Part::AttrEq(name, value) => attrs.iter().any(|(k, v)| k == name && v == value),
            Part::AttrSuffix(name, suffix) => attrs
                .iter()
                .any(|(k, v)| k == name && v.ends_with(suffix.as_str())),
            Part::Not(inner) => !inner.matches(tag, attrs),
        }
    }
}

/// A compiled compound selector: every part must match the same element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Part>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut cursor = Cursor::new(input.trim());
        let selector = cursor.compound()?;

        if let Some(c) = cursor.peek() {
            return Err(SelectorError::Unexpected(c, cursor.pos));
        }
        if selector.parts.is_empty() {
            return Err(SelectorError::Empty);
        }

        Ok(selector)
    }

    /// Whether an element with this tag and attribute list matches.
    pub fn matches(&self, tag: &str, attrs: &[(String, String)]) -> bool {
        self.parts.iter().all(|part| part.matches(tag, attrs))
    }
}

// ============================================================================
// Parser
// ============================================================================

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(SelectorError::Unexpected(c, self.pos - c.len_utf8())),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// A run of identifier characters (attribute or tag names).
    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(SelectorError::Unexpected(c, self.pos)),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(self.input[start..self.pos].to_string())
    }

    /// An attribute value, optionally quoted.
    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        let value = self.input[start..self.pos].to_string();
                        self.bump();
                        return Ok(value);
                    }
                    self.bump();
                }
                Err(SelectorError::UnexpectedEnd)
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ']' {
                        break;
                    }
                    self.bump();
                }
                Ok(self.input[start..self.pos].to_string())
            }
        }
    }

    /// A compound selector; stops at end of input or `)`.
    fn compound(&mut self) -> Result<Selector, SelectorError> {
        let mut parts = Vec::new();

        loop {
            match self.peek() {
                None | Some(')') => break,
                Some('[') => {
                    self.bump();
                    parts.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    parts.push(self.pseudo()?);
                }
                Some(c) if c.is_ascii_alphanumeric() => {
                    parts.push(Part::Tag(self.ident()?));
                }
                Some(c) => return Err(SelectorError::Unexpected(c, self.pos)),
            }
        }

        Ok(Selector { parts })
    }

    /// The body of a `[...]` attribute condition.
    fn attribute(&mut self) -> Result<Part, SelectorError> {
        let name = self.ident()?;

        match self.peek() {
            Some(']') => {
                self.bump();
                Ok(Part::HasAttr(name))
            }
            Some('=') => {
                self.bump();
                let value = self.value()?;
                self.expect(']')?;
                Ok(Part::AttrEq(name, value))
            }
            Some('$') => {
                self.bump();
                self.expect('=')?;
                let value = self.value()?;
                self.expect(']')?;
                Ok(Part::AttrSuffix(name, value))
            }
            Some(c) => Err(SelectorError::Unexpected(c, self.pos)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// A pseudo-class; only `:not(...)` is supported.
    fn pseudo(&mut self) -> Result<Part, SelectorError> {
        let name = self.ident()?;
        if name != "not" {
            return Err(SelectorError::UnsupportedPseudo(name));
        }

        self.expect('(')?;
        let inner = self.compound()?;
        self.expect(')')?;

        if inner.parts.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Part::Not(Box::new(inner)))
    }
}
