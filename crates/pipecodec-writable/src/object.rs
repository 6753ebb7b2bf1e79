use pipecodec_flow::Value;

/// A value that can be written through a registry rule.
pub trait Writable {
    /// Registry key of the value's runtime shape.
    fn shape(&self) -> &str;

    /// The value as one item, for scalar shapes.
    fn to_scalar(&self) -> Option<Value> {
        None
    }

    /// The named field, for structured shapes.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// A structured value the reader can build field by field.
pub trait Readable: Sized {
    /// A fresh value of `shape` with no fields assigned.
    fn create(shape: &str) -> Self;

    /// Assign one decoded field. An `Err` carries the reason the assignment
    /// was refused.
    fn set_field(&mut self, name: &str, value: Value) -> Result<(), String>;
}

/// Result of a read: a scalar shape yields the decoded item itself, a
/// structured shape yields a freshly built value.
#[derive(Debug, Clone, PartialEq)]
pub enum Object<R = Record> {
    Scalar(Value),
    Record(R),
}

impl<R> Object<R> {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Object::Scalar(value) => Some(value),
            Object::Record(_) => None,
        }
    }

    pub fn into_scalar(self) -> Option<Value> {
        match self {
            Object::Scalar(value) => Some(value),
            Object::Record(_) => None,
        }
    }

    pub fn into_record(self) -> Option<R> {
        match self {
            Object::Scalar(_) => None,
            Object::Record(record) => Some(record),
        }
    }
}

/// A dynamically shaped record: a shape name plus ordered fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    shape: String,
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            fields: Vec::new(),
        }
    }

    /// Builder form of [`Record::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set a field, replacing any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

impl Writable for Record {
    fn shape(&self) -> &str {
        &self.shape
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Readable for Record {
    fn create(shape: &str) -> Self {
        Record::new(shape)
    }

    fn set_field(&mut self, name: &str, value: Value) -> Result<(), String> {
        self.set(name, value);
        Ok(())
    }
}

/// A bare value written under a caller-chosen scalar shape, for shapes other
/// than the built-in ones [`Value`] maps to.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    pub shape: String,
    pub value: Value,
}

impl Scalar {
    pub fn new(shape: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            shape: shape.into(),
            value: value.into(),
        }
    }
}

impl Writable for Scalar {
    fn shape(&self) -> &str {
        &self.shape
    }

    fn to_scalar(&self) -> Option<Value> {
        Some(self.value.clone())
    }
}

/// Shape names used for bare [`Value`]s.
pub mod shapes {
    pub const INT: &str = "int";
    pub const LONG: &str = "long";
    pub const FLOAT: &str = "float";
    pub const BYTES: &str = "bytes";
    pub const NULLABLE: &str = "nullable";
    pub const ARRAY: &str = "array";
}

impl Writable for Value {
    fn shape(&self) -> &str {
        match self {
            Value::Int(_) => shapes::INT,
            Value::Long(_) => shapes::LONG,
            Value::Float(_) => shapes::FLOAT,
            Value::Bytes(_) => shapes::BYTES,
            Value::Null => shapes::NULLABLE,
            Value::Array(_) => shapes::ARRAY,
        }
    }

    fn to_scalar(&self) -> Option<Value> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_set_replaces_in_place() {
        let mut record = Record::new("Point").with("x", 1).with("y", 2);
        record.set("x", 10);
        assert_eq!(record.get("x"), Some(&Value::Int(10)));
        assert_eq!(record.fields()[0].0, "x");
        assert_eq!(record.fields().len(), 2);
    }

    #[test]
    fn values_map_to_kind_shapes() {
        assert_eq!(Value::Int(1).shape(), "int");
        assert_eq!(Value::Null.shape(), "nullable");
        assert_eq!(Value::from("x").to_scalar(), Some(Value::from("x")));
        assert!(Value::Int(1).field("x").is_none());
    }

    #[test]
    fn object_accessors() {
        let scalar: Object = Object::Scalar(Value::Int(3));
        assert_eq!(scalar.as_scalar(), Some(&Value::Int(3)));
        assert!(scalar.into_record().is_none());

        let record: Object = Object::Record(Record::new("R"));
        assert!(record.into_record().is_some());
    }
}
