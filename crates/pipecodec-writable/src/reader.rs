use pipecodec_flow::{FlowConfig, FlowReader};
use pipecodec_stream::InStream;
use tracing::trace;

use crate::error::{Result, WritableError};
use crate::object::{Object, Readable, Record};
use crate::registry::WritableRegistry;

/// Reads structured values using a borrowed [`WritableRegistry`].
pub struct WritableReader<'r, S> {
    inner: FlowReader<S>,
    registry: &'r WritableRegistry,
    default_shape: Option<String>,
}

impl<'r, S: InStream> WritableReader<'r, S> {
    /// Create a reader. `default_shape` is used when [`WritableReader::read`]
    /// is called without a shape.
    pub fn new(inner: S, registry: &'r WritableRegistry, default_shape: Option<&str>) -> Self {
        Self::with_config(inner, registry, default_shape, FlowConfig::default())
    }

    /// Create a reader with explicit decoding limits.
    pub fn with_config(
        inner: S,
        registry: &'r WritableRegistry,
        default_shape: Option<&str>,
        config: FlowConfig,
    ) -> Self {
        Self {
            inner: FlowReader::with_config(inner, config),
            registry,
            default_shape: default_shape.map(str::to_string),
        }
    }

    /// Read one value of `shape` (or the default shape) as a dynamic
    /// [`Record`] or scalar.
    pub fn read(&mut self, shape: Option<&str>) -> Result<Object> {
        self.read_as::<Record>(shape)
    }

    /// Read one value of `shape` (or the default shape), building structured
    /// values as `R`.
    pub fn read_as<R: Readable>(&mut self, shape: Option<&str>) -> Result<Object<R>> {
        let shape = match shape {
            Some(shape) => shape,
            None => self
                .default_shape
                .as_deref()
                .ok_or(WritableError::NoDefaultShape)?,
        };
        let rule = self
            .registry
            .rule(shape)
            .ok_or_else(|| WritableError::UnknownShape(shape.to_string()))?;

        let values = self.inner.read(rule.flattened())?;
        trace!(shape, fields = values.len(), "read writable");

        if rule.is_scalar() {
            let found = values.len();
            return values
                .into_iter()
                .next()
                .map(Object::Scalar)
                .ok_or_else(|| WritableError::Arity {
                    shape: shape.to_string(),
                    expected: 1,
                    found,
                });
        }

        let mut record = R::create(shape);
        for (field, value) in rule.fields().iter().zip(values) {
            record
                .set_field(&field.name, value)
                .map_err(|reason| WritableError::FieldRejected {
                    shape: shape.to_string(),
                    field: field.name.clone(),
                    reason,
                })?;
        }
        Ok(Object::Record(record))
    }

    pub fn default_shape(&self) -> Option<&str> {
        self.default_shape.as_deref()
    }

    pub fn registry(&self) -> &'r WritableRegistry {
        self.registry
    }

    /// Bytes consumed from the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Close the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close()?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }
}

impl<S> std::fmt::Debug for WritableReader<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritableReader")
            .field("default_shape", &self.default_shape)
            .field("rules", &self.registry.len())
            .finish_non_exhaustive()
    }
}
