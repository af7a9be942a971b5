//! Field path parser
//!
//! Parses `Platforms[0].Points[1]`-style locators into segments.
//!
//! ```text
//! path     = [ segment ("." segment)* ]
//! segment  = [ name ] accessor*
//! accessor = "[" key "]"
//! name     = 1*(ALPHA / DIGIT / "_")
//! key      = 1*(ALPHA / DIGIT / "_")
//! ```
//!
//! Whether a key is an index or a map key is decided during navigation, by
//! the container it is applied to.

use std::fmt;
use std::str::FromStr;

/// Path syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("empty segment at position {0}")]
    EmptySegment(usize),

    #[error("unclosed bracket in segment '{0}'")]
    UnclosedBracket(String),

    #[error("empty brackets in segment '{0}'")]
    EmptyAccessor(String),

    #[error("invalid character {ch:?} in segment '{segment}'")]
    InvalidCharacter { segment: String, ch: char },

    #[error("unexpected '{text}' after accessor in segment '{segment}'")]
    TrailingText { segment: String, text: String },
}

/// One dot-separated piece of a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    name: Option<String>,
    accessors: Vec<String>,
}

impl Segment {
    /// Leading field or key name, if the segment starts with one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Bracket contents, in application order
    pub fn accessors(&self) -> &[String] {
        &self.accessors
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        for key in &self.accessors {
            write!(f, "[{}]", key)?;
        }
        Ok(())
    }
}

/// A parsed path. The empty path addresses the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// The empty path
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path string
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.is_empty() {
            return Ok(Self::root());
        }

        let segments = input
            .split('.')
            .enumerate()
            .map(|(position, text)| parse_segment(text, position))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }

    /// Segments in application order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True for the empty path
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn check_ident(text: &str, segment: &str) -> Result<(), PathError> {
    match text.chars().find(|c| !is_ident_char(*c)) {
        Some(ch) => Err(PathError::InvalidCharacter {
            segment: segment.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

fn parse_segment(text: &str, position: usize) -> Result<Segment, PathError> {
    if text.is_empty() {
        return Err(PathError::EmptySegment(position));
    }

    let (name, mut rest) = match text.find('[') {
        Some(open) => text.split_at(open),
        None => (text, ""),
    };
    check_ident(name, text)?;

    let mut accessors = Vec::new();
    while !rest.is_empty() {
        let body = rest.strip_prefix('[').ok_or_else(|| PathError::TrailingText {
            segment: text.to_string(),
            text: rest.to_string(),
        })?;
        let close = body
            .find(']')
            .ok_or_else(|| PathError::UnclosedBracket(text.to_string()))?;

        let key = &body[..close];
        if key.is_empty() {
            return Err(PathError::EmptyAccessor(text.to_string()));
        }
        check_ident(key, text)?;

        accessors.push(key.to_string());
        rest = &body[close + 1..];
    }

    Ok(Segment {
        name: (!name.is_empty()).then(|| name.to_string()),
        accessors,
    })
}
