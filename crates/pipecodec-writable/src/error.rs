use pipecodec_flow::FlowError;

/// Errors that can occur while marshaling structured values.
#[derive(Debug, thiserror::Error)]
pub enum WritableError {
    /// Encoding or decoding the flattened tuple failed.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// No shape was given and the reader has no default.
    #[error("no shape given and no default shape configured")]
    NoDefaultShape,

    /// The registry has no rule for the shape.
    #[error("no rule registered for shape {0:?}")]
    UnknownShape(String),

    /// A rule definition is malformed.
    #[error("invalid rule for shape {shape:?}: {reason}")]
    InvalidRule { shape: String, reason: String },

    /// Raw values did not match the number of fields in the shape's rule.
    #[error("shape {shape:?} has {expected} field(s), got {found} value(s)")]
    Arity {
        shape: String,
        expected: usize,
        found: usize,
    },

    /// A structured value did not provide a field its rule names.
    #[error("value of shape {shape:?} has no field {field:?}")]
    MissingField { shape: String, field: String },

    /// A value refused the assignment of a decoded field.
    #[error("cannot set field {field:?} on shape {shape:?}: {reason}")]
    FieldRejected {
        shape: String,
        field: String,
        reason: String,
    },

    /// A scalar shape's value could not be taken as a single item.
    #[error("value of shape {0:?} is not a scalar")]
    NotScalar(String),

    /// The registry is full.
    #[error("too many rules (max {max})")]
    TooManyRules { max: usize },

    /// A rule file could not be loaded.
    #[error("failed to load rules: {0}")]
    LoadFailed(String),

    /// A rule file is not valid JSON of the expected layout.
    #[error("rule file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl WritableError {
    /// Returns true for a clean end of stream between values.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, WritableError::Flow(err) if err.is_end_of_stream())
    }

    /// Returns true for malformed framing or a shape the registry cannot
    /// resolve.
    pub fn is_protocol(&self) -> bool {
        match self {
            WritableError::Flow(err) => err.is_protocol(),
            WritableError::NoDefaultShape
            | WritableError::UnknownShape(_)
            | WritableError::Arity { .. } => true,
            _ => false,
        }
    }

    /// Returns true when a value's fields could not be read or assigned.
    pub fn is_value(&self) -> bool {
        match self {
            WritableError::Flow(err) => err.is_value(),
            WritableError::MissingField { .. }
            | WritableError::FieldRejected { .. }
            | WritableError::NotScalar(_) => true,
            _ => false,
        }
    }

    /// Returns true if the underlying transport failed.
    pub fn is_io(&self) -> bool {
        matches!(self, WritableError::Flow(err) if err.is_io())
    }
}

pub type Result<T> = std::result::Result<T, WritableError>;
