use std::fmt;
use std::str::FromStr;

use crate::error::{FlowError, Result};

/// One item shape on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// `i`: 32-bit signed integer as VInt.
    Int,
    /// `L`: 64-bit signed integer as VLong.
    Long,
    /// `f`: 32-bit big-endian float.
    Float,
    /// `s`: VInt length followed by raw bytes.
    Bytes,
    /// `S`: marker byte, then the `s` form when present.
    NullableBytes,
    /// `A`: VInt count followed by that many `s` items.
    Array,
}

impl TypeTag {
    pub const ALL: [TypeTag; 6] = [
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Bytes,
        TypeTag::NullableBytes,
        TypeTag::Array,
    ];

    pub fn from_char(c: char) -> Result<Self> {
        match c {
            'i' => Ok(TypeTag::Int),
            'L' => Ok(TypeTag::Long),
            'f' => Ok(TypeTag::Float),
            's' => Ok(TypeTag::Bytes),
            'S' => Ok(TypeTag::NullableBytes),
            'A' => Ok(TypeTag::Array),
            other => Err(FlowError::UnknownTag(other)),
        }
    }

    pub fn as_char(self) -> char {
        match self {
            TypeTag::Int => 'i',
            TypeTag::Long => 'L',
            TypeTag::Float => 'f',
            TypeTag::Bytes => 's',
            TypeTag::NullableBytes => 'S',
            TypeTag::Array => 'A',
        }
    }

    /// Human-readable item name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Long => "long",
            TypeTag::Float => "float",
            TypeTag::Bytes => "string",
            TypeTag::NullableBytes => "nullable string",
            TypeTag::Array => "array",
        }
    }
}

impl TryFrom<char> for TypeTag {
    type Error = FlowError;

    fn try_from(c: char) -> Result<Self> {
        TypeTag::from_char(c)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An ordered sequence of tags describing a tuple.
///
/// The empty rule is the zero-argument tuple.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rule(Vec<TypeTag>);

impl Rule {
    /// Parse a rule string such as `"sii"`. Unknown characters are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        s.chars().map(TypeTag::from_char).collect::<Result<Vec<_>>>().map(Rule)
    }

    pub fn empty() -> Self {
        Rule(Vec::new())
    }

    pub fn tags(&self) -> &[TypeTag] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.0.iter().copied()
    }
}

impl From<Vec<TypeTag>> for Rule {
    fn from(tags: Vec<TypeTag>) -> Self {
        Rule(tags)
    }
}

impl FromIterator<TypeTag> for Rule {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        Rule(iter.into_iter().collect())
    }
}

impl FromStr for Rule {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self> {
        Rule::parse(s)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tag in &self.0 {
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}
