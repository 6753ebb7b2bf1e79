use pipecodec_flow::{FlowWriter, Value};
use pipecodec_stream::OutStream;
use tracing::trace;

use crate::error::{Result, WritableError};
use crate::object::Writable;
use crate::registry::WritableRegistry;
use crate::rule::WritableRule;

/// Writes structured values using a borrowed [`WritableRegistry`].
pub struct WritableWriter<'r, S> {
    inner: FlowWriter<S>,
    registry: &'r WritableRegistry,
}

impl<'r, S: OutStream> WritableWriter<'r, S> {
    pub fn new(inner: S, registry: &'r WritableRegistry) -> Self {
        Self {
            inner: FlowWriter::new(inner),
            registry,
        }
    }

    /// Write `value` under the rule of its runtime shape.
    ///
    /// Every field is gathered and checked before anything is written.
    pub fn write<W: Writable + ?Sized>(&mut self, value: &W) -> Result<()> {
        let shape = value.shape();
        let rule = self.rule(shape)?;

        let values = if rule.is_scalar() {
            let item = value
                .to_scalar()
                .ok_or_else(|| WritableError::NotScalar(shape.to_string()))?;
            vec![item]
        } else {
            rule.fields()
                .iter()
                .map(|field| {
                    value
                        .field(&field.name)
                        .ok_or_else(|| WritableError::MissingField {
                            shape: shape.to_string(),
                            field: field.name.clone(),
                        })
                })
                .collect::<Result<Vec<_>>>()?
        };

        self.inner.write(rule.flattened(), &values)?;
        trace!(shape, fields = values.len(), "wrote writable");
        Ok(())
    }

    /// Write already-gathered field values under `shape`'s rule, in rule order.
    pub fn write_values(&mut self, shape: &str, values: &[Value]) -> Result<()> {
        let rule = self.rule(shape)?;
        if values.len() != rule.len() {
            return Err(WritableError::Arity {
                shape: shape.to_string(),
                expected: rule.len(),
                found: values.len(),
            });
        }
        self.inner.write(rule.flattened(), values)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Bytes produced on the underlying stream so far.
    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    /// Flush and close the underlying stream.
    pub fn close(&mut self) -> Result<()> {
        self.inner.close()?;
        Ok(())
    }

    pub fn registry(&self) -> &'r WritableRegistry {
        self.registry
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    fn rule(&self, shape: &str) -> Result<&'r WritableRule> {
        self.registry
            .rule(shape)
            .ok_or_else(|| WritableError::UnknownShape(shape.to_string()))
    }
}

impl<S> std::fmt::Debug for WritableWriter<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WritableWriter")
            .field("rules", &self.registry.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use pipecodec_flow::{FlowError, TypeTag};
    use pipecodec_stream::{BufferInStream, BufferOutStream};

    use super::*;
    use crate::object::{Object, Readable, Record, Scalar};
    use crate::reader::WritableReader;

    fn registry() -> WritableRegistry {
        let mut registry = WritableRegistry::with_scalars();
        registry
            .add_fields("Item", &[("x", "i"), ("name", "s")])
            .unwrap();
        registry
            .add("LongLong", WritableRule::scalar(TypeTag::Long))
            .unwrap();
        registry
    }

    fn written(registry: &WritableRegistry, build: impl FnOnce(&mut WritableWriter<'_, BufferOutStream>)) -> BufferInStream {
        let mut writer = WritableWriter::new(BufferOutStream::new(), registry);
        build(&mut writer);
        writer.flush().unwrap();
        BufferInStream::new(writer.into_inner().into_bytes())
    }

    #[test]
    fn scalar_roundtrip() {
        let registry = registry();
        let values = [
            Value::Int(1),
            Value::Int(849_898_989),
            Value::Float(0.333),
            Value::from("this here is bytes"),
        ];
        let input = written(&registry, |w| {
            for value in &values {
                w.write(value).unwrap();
            }
        });

        let mut reader = WritableReader::new(input, &registry, None);
        for value in &values {
            let object = reader.read(Some(value.shape())).unwrap();
            assert_eq!(object, Object::Scalar(value.clone()));
        }
        assert!(reader.read(Some("int")).unwrap_err().is_end_of_stream());
    }

    #[test]
    fn structured_roundtrip() {
        let registry = registry();
        let item = Record::new("Item").with("x", 42).with("name", "abc");
        let input = written(&registry, |w| w.write(&item).unwrap());

        // x=42 as VInt, then "abc" as VInt length + bytes.
        assert_eq!(input.get_ref().as_ref(), &[42, 3, b'a', b'b', b'c']);

        let mut reader = WritableReader::new(input, &registry, None);
        let object = reader.read(Some("Item")).unwrap();
        assert_eq!(object, Object::Record(item));
    }

    #[test]
    fn default_shape_is_used_when_none_given() {
        let registry = registry();
        let input = written(&registry, |w| {
            for v in 1..100 {
                w.write(&Value::Int(v)).unwrap();
            }
        });

        let mut reader = WritableReader::new(input, &registry, Some("int"));
        for v in 1..100 {
            assert_eq!(reader.read(None).unwrap(), Object::Scalar(Value::Int(v)));
        }
    }

    #[test]
    fn custom_scalar_shape() {
        let registry = registry();
        let values = [89_289_839_898i64, 8_938_988_989];
        let input = written(&registry, |w| {
            for v in values {
                w.write(&Scalar::new("LongLong", v)).unwrap();
            }
        });

        let mut reader = WritableReader::new(input, &registry, Some("LongLong"));
        for v in values {
            assert_eq!(reader.read(None).unwrap().into_scalar(), Some(Value::Long(v)));
        }
    }

    #[test]
    fn unknown_shape_and_missing_default() {
        let registry = registry();
        let mut writer = WritableWriter::new(BufferOutStream::new(), &registry);
        let err = writer.write(&Record::new("Complex")).unwrap_err();
        assert!(matches!(err, WritableError::UnknownShape(ref s) if s == "Complex"));
        assert!(err.is_protocol());
        assert_eq!(writer.position(), 0);

        let mut reader = WritableReader::new(BufferInStream::new(Vec::new()), &registry, None);
        assert!(matches!(reader.read(None), Err(WritableError::NoDefaultShape)));
        assert!(matches!(
            reader.read(Some("Complex")),
            Err(WritableError::UnknownShape(_))
        ));
    }

    #[test]
    fn empty_stream_is_end_of_stream() {
        let registry = registry();
        let mut reader = WritableReader::new(BufferInStream::new(Vec::new()), &registry, Some("int"));
        let err = reader.read(None).unwrap_err();
        assert!(err.is_end_of_stream());
        assert!(matches!(err, WritableError::Flow(FlowError::EndOfStream)));
    }

    #[test]
    fn missing_field_writes_nothing() {
        let registry = registry();
        let mut writer = WritableWriter::new(BufferOutStream::new(), &registry);
        let err = writer.write(&Record::new("Item").with("x", 1)).unwrap_err();
        assert!(matches!(
            err,
            WritableError::MissingField { ref field, .. } if field == "name"
        ));
        assert!(err.is_value());
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn field_type_mismatch_writes_nothing() {
        let registry = registry();
        let mut writer = WritableWriter::new(BufferOutStream::new(), &registry);
        let bad = Record::new("Item").with("x", "not an int").with("name", "abc");
        let err = writer.write(&bad).unwrap_err();
        assert!(matches!(err, WritableError::Flow(FlowError::TypeMismatch { .. })));
        assert_eq!(writer.position(), 0);
    }

    #[test]
    fn write_values_checks_arity() {
        let registry = registry();
        let mut writer = WritableWriter::new(BufferOutStream::new(), &registry);
        let err = writer.write_values("Item", &[Value::Int(1)]).unwrap_err();
        assert!(matches!(
            err,
            WritableError::Arity {
                expected: 2,
                found: 1,
                ..
            }
        ));
        writer
            .write_values("Item", &[Value::Int(1), Value::from("n")])
            .unwrap();
        assert_eq!(writer.get_ref().as_slice(), &[1, 1, b'n']);
    }

    #[derive(Debug, Default)]
    struct Point {
        x: i32,
        locked: bool,
    }

    impl Readable for Point {
        fn create(_shape: &str) -> Self {
            Point {
                x: 0,
                locked: true,
            }
        }

        fn set_field(&mut self, name: &str, value: Value) -> std::result::Result<(), String> {
            match name {
                "x" => {
                    self.x = value.as_int().ok_or("x must be an int")?;
                    Ok(())
                }
                _ if self.locked => Err(format!("{name} is read-only")),
                _ => Ok(()),
            }
        }
    }

    #[test]
    fn typed_read_and_rejected_assignment() {
        let registry = registry();
        let input = written(&registry, |w| {
            w.write(&Record::new("Item").with("x", 7).with("name", "n")).unwrap()
        });

        let mut reader = WritableReader::new(input, &registry, Some("Item"));
        let err = reader.read_as::<Point>(None).unwrap_err();
        assert!(matches!(
            err,
            WritableError::FieldRejected { ref field, .. } if field == "name"
        ));
        assert!(err.is_value());
    }

    #[test]
    fn typed_read_success() {
        let mut registry = registry();
        registry.add_fields("P", &[("x", "i")]).unwrap();
        let input = written(&registry, |w| w.write(&Record::new("P").with("x", -5)).unwrap());

        let mut reader = WritableReader::new(input, &registry, None);
        let point = reader.read_as::<Point>(Some("P")).unwrap().into_record().unwrap();
        assert_eq!(point.x, -5);
    }

    #[test]
    fn not_scalar_is_value_error() {
        let registry = registry();
        let mut writer = WritableWriter::new(BufferOutStream::new(), &registry);
        // A record claiming a scalar shape has no whole-value form.
        let err = writer.write(&Record::new("LongLong")).unwrap_err();
        assert!(matches!(err, WritableError::NotScalar(_)));
    }
}
