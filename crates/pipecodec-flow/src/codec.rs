use bytes::{BufMut, Bytes};
use pipecodec_stream::{InStream, StreamError};

use crate::config::FlowConfig;
use crate::error::{FlowError, Result};
use crate::rule::{Rule, TypeTag};
use crate::value::Value;
use crate::vint::{decode_size, decode_vlong, put_vlong};

/// Marker byte preceding a present `S` item.
pub const NULLABLE_PRESENT: u8 = 0x00;
/// Marker byte standing for an absent `S` item.
pub const NULLABLE_NULL: u8 = 0x01;

/// Lengths and counts travel as VInt, so nothing larger can be encoded.
const MAX_WIRE_LEN: usize = i32::MAX as usize;

/// Check that `value` can be encoded under `tag` without writing anything.
pub fn check_item(tag: TypeTag, value: &Value) -> Result<()> {
    match (tag, value) {
        (TypeTag::Int, Value::Int(_)) => Ok(()),
        (TypeTag::Int, Value::Long(v)) => match i32::try_from(*v) {
            Ok(_) => Ok(()),
            Err(_) => Err(FlowError::Overflow(*v)),
        },
        (TypeTag::Long, Value::Int(_) | Value::Long(_)) => Ok(()),
        (TypeTag::Float, Value::Float(_)) => Ok(()),
        (TypeTag::Bytes | TypeTag::NullableBytes, Value::Bytes(b)) => check_wire_len("string", b.len()),
        (TypeTag::NullableBytes, Value::Null) => Ok(()),
        (TypeTag::Array, Value::Array(items)) => {
            check_wire_len("array", items.len())?;
            items
                .iter()
                .try_for_each(|item| check_wire_len("string", item.len()))
        }
        (tag, other) => Err(FlowError::TypeMismatch {
            tag,
            found: other.kind_name(),
        }),
    }
}

/// Check arity and every value of a tuple without writing anything.
pub fn check_tuple(rule: &Rule, values: &[Value]) -> Result<()> {
    if rule.len() != values.len() {
        return Err(FlowError::Arity {
            expected: rule.len(),
            found: values.len(),
        });
    }
    rule.iter()
        .zip(values)
        .try_for_each(|(tag, value)| check_item(tag, value))
}

/// Encode one item. On error nothing has been appended to `dst`.
pub fn encode_item(tag: TypeTag, value: &Value, dst: &mut impl BufMut) -> Result<()> {
    check_item(tag, value)?;
    put_item(tag, value, dst);
    Ok(())
}

/// Encode a whole tuple. Arity and coercion of every value are checked before
/// the first byte is appended.
pub fn encode_tuple(rule: &Rule, values: &[Value], dst: &mut impl BufMut) -> Result<()> {
    check_tuple(rule, values)?;
    for (tag, value) in rule.iter().zip(values) {
        put_item(tag, value, dst);
    }
    Ok(())
}

fn put_item(tag: TypeTag, value: &Value, dst: &mut impl BufMut) {
    match (tag, value) {
        (TypeTag::Int | TypeTag::Long, value) => {
            if let Some(v) = value.as_long() {
                put_vlong(dst, v);
            }
        }
        (TypeTag::Float, Value::Float(v)) => dst.put_f32(*v),
        (TypeTag::Bytes, Value::Bytes(b)) => put_string(dst, b),
        (TypeTag::NullableBytes, Value::Bytes(b)) => {
            dst.put_u8(NULLABLE_PRESENT);
            put_string(dst, b);
        }
        (TypeTag::NullableBytes, Value::Null) => dst.put_u8(NULLABLE_NULL),
        (TypeTag::Array, Value::Array(items)) => {
            put_vlong(dst, items.len() as i64);
            for item in items {
                put_string(dst, item);
            }
        }
        // Rejected by check_item.
        _ => {}
    }
}

/// Encode raw bytes as an `s` item without wrapping them in a [`Value`].
pub fn encode_bytes(bytes: &[u8], dst: &mut impl BufMut) -> Result<()> {
    check_wire_len("string", bytes.len())?;
    put_string(dst, bytes);
    Ok(())
}

fn put_string(dst: &mut impl BufMut, bytes: &[u8]) {
    put_vlong(dst, bytes.len() as i64);
    dst.put_slice(bytes);
}

fn check_wire_len(what: &'static str, length: usize) -> Result<()> {
    if length > MAX_WIRE_LEN {
        return Err(FlowError::LengthLimit {
            what,
            length,
            max: MAX_WIRE_LEN,
        });
    }
    Ok(())
}

/// Decode one item.
///
/// A stream that ends cleanly before the first byte yields
/// [`FlowError::EndOfStream`]; one that ends after it yields
/// [`FlowError::Truncated`].
pub fn decode_item<I>(tag: TypeTag, input: &mut I, config: &FlowConfig) -> Result<Value>
where
    I: InStream + ?Sized,
{
    let what = tag.name();
    match tag {
        TypeTag::Int => {
            let v = read_vlong(input, true, what)?;
            i32::try_from(v)
                .map(Value::Int)
                .map_err(|_| FlowError::Overflow(v))
        }
        TypeTag::Long => read_vlong(input, true, what).map(Value::Long),
        TypeTag::Float => {
            let mut buf = [0u8; 4];
            read_exact(input, &mut buf, true, what)?;
            Ok(Value::Float(f32::from_be_bytes(buf)))
        }
        TypeTag::Bytes => read_string(input, true, config).map(Value::Bytes),
        TypeTag::NullableBytes => {
            let mut marker = [0u8; 1];
            read_exact(input, &mut marker, true, what)?;
            match marker[0] {
                NULLABLE_PRESENT => read_string(input, false, config).map(Value::Bytes),
                NULLABLE_NULL => Ok(Value::Null),
                other => Err(FlowError::BadMarker(other)),
            }
        }
        TypeTag::Array => {
            let count = read_length(input, true, what, config.max_array_len)?;
            let mut items = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                items.push(read_string(input, false, config)?);
            }
            Ok(Value::Array(items))
        }
    }
}

/// Decode a whole tuple, left to right, stopping at the first failure.
///
/// Only a clean end before the first item is [`FlowError::EndOfStream`];
/// running out of input before any later item means the tuple was cut.
pub fn decode_tuple<I>(rule: &Rule, input: &mut I, config: &FlowConfig) -> Result<Vec<Value>>
where
    I: InStream + ?Sized,
{
    let mut values = Vec::with_capacity(rule.len());
    for (idx, tag) in rule.iter().enumerate() {
        let value = decode_item(tag, input, config).map_err(|err| {
            if idx == 0 {
                err
            } else {
                err.mid_frame(tag.name())
            }
        })?;
        values.push(value);
    }
    Ok(values)
}

pub(crate) fn read_exact<I>(input: &mut I, buf: &mut [u8], at_start: bool, what: &'static str) -> Result<()>
where
    I: InStream + ?Sized,
{
    input
        .read(buf)
        .map_err(|err| classify_stream_error(err, at_start, what))
}

pub(crate) fn classify_stream_error(err: StreamError, at_start: bool, what: &'static str) -> FlowError {
    if at_start && err.is_clean_eof() {
        FlowError::EndOfStream
    } else if err.is_eof() {
        FlowError::Truncated { what }
    } else {
        FlowError::Stream(err)
    }
}

pub(crate) fn read_vlong<I>(input: &mut I, at_start: bool, what: &'static str) -> Result<i64>
where
    I: InStream + ?Sized,
{
    let mut lead = [0u8; 1];
    read_exact(input, &mut lead, at_start, what)?;
    let lead = lead[0] as i8;
    let mut rest = [0u8; 8];
    let rest = &mut rest[..decode_size(lead) - 1];
    read_exact(input, rest, false, what)?;
    Ok(decode_vlong(lead, rest))
}

fn read_length<I>(input: &mut I, at_start: bool, what: &'static str, max: usize) -> Result<usize>
where
    I: InStream + ?Sized,
{
    let raw = read_vlong(input, at_start, what)?;
    let length = i32::try_from(raw).map_err(|_| FlowError::Overflow(raw))?;
    if length < 0 {
        return Err(FlowError::NegativeLength {
            what,
            length: raw,
        });
    }
    let length = length as usize;
    if length > max {
        return Err(FlowError::LengthLimit { what, length, max });
    }
    Ok(length)
}

pub(crate) fn read_string<I>(input: &mut I, at_start: bool, config: &FlowConfig) -> Result<Bytes>
where
    I: InStream + ?Sized,
{
    let what = TypeTag::Bytes.name();
    let length = read_length(input, at_start, what, config.max_string_len)?;
    let mut buf = vec![0u8; length];
    read_exact(input, &mut buf, false, what)?;
    Ok(Bytes::from(buf))
}
