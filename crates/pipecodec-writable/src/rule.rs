use std::collections::HashSet;
use std::fmt;

use pipecodec_flow::{Rule, TypeTag};

use crate::error::{Result, WritableError};

/// One `(field, tag)` pair of a writable rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    pub tag: TypeTag,
}

/// The ordered fields of one shape.
///
/// A single field with an empty name makes the shape scalar. The flattened
/// tag rule is computed once at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritableRule {
    fields: Vec<FieldRule>,
    flat: Rule,
}

impl WritableRule {
    /// Build a rule from `(field, tag)` pairs.
    ///
    /// Rejects an empty field list, duplicate field names, and an unnamed
    /// field anywhere but in a one-field rule.
    pub fn new<N, I>(fields: I) -> std::result::Result<Self, String>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, TypeTag)>,
    {
        let fields: Vec<FieldRule> = fields
            .into_iter()
            .map(|(name, tag)| FieldRule {
                name: name.into(),
                tag,
            })
            .collect();

        if fields.is_empty() {
            return Err("rule has no fields".to_string());
        }
        if fields.len() > 1 {
            let mut seen = HashSet::new();
            for field in &fields {
                if field.name.is_empty() {
                    return Err("unnamed field in a multi-field rule".to_string());
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(format!("duplicate field {:?}", field.name));
                }
            }
        }

        let flat = fields.iter().map(|field| field.tag).collect();
        Ok(Self { fields, flat })
    }

    /// A scalar rule: the value is encoded as one item under `tag`.
    pub fn scalar(tag: TypeTag) -> Self {
        Self {
            fields: vec![FieldRule {
                name: String::new(),
                tag,
            }],
            flat: Rule::from(vec![tag]),
        }
    }

    /// Parse `(field, tag-char)` pairs, as found in rule files.
    pub fn parse<N: AsRef<str>, T: AsRef<str>>(shape: &str, pairs: &[(N, T)]) -> Result<Self> {
        let invalid = |reason: String| WritableError::InvalidRule {
            shape: shape.to_string(),
            reason,
        };
        let mut fields = Vec::with_capacity(pairs.len());
        for (name, tag) in pairs {
            let mut chars = tag.as_ref().chars();
            let tag = match (chars.next(), chars.next()) {
                (Some(c), None) => TypeTag::from_char(c).map_err(|err| invalid(err.to_string()))?,
                _ => return Err(invalid(format!("tag {:?} is not a single character", tag.as_ref()))),
            };
            fields.push((name.as_ref().to_string(), tag));
        }
        Self::new(fields).map_err(invalid)
    }

    pub fn is_scalar(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].name.is_empty()
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    /// The concatenated tags, in field order.
    pub fn flattened(&self) -> &Rule {
        &self.flat
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for WritableRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_scalar() {
            return write!(f, "{}", self.flat);
        }
        for (idx, field) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}:{}", field.name, field.tag)?;
        }
        Ok(())
    }
}
