//! # Marshalled Arguments
//!
//! `invoke` carries its parameters inside a `java.rmi.MarshalledObject`: the
//! argument array is serialized into a stream of its own, and that stream's
//! bytes become the `objBytes` field of the wrapper in the outer stream.
//!
//! Both steps are generic. `marshal_stream` turns any builder session into an
//! independent stream; `marshalled_object` embeds any such bytes.

use indexmap::IndexMap;
use jserial::Builder;
use jserial::Elements;
use jserial::Field;
use jserial::FieldType;
use jserial::Primitive;
use jserial::Value;
use jserial::types::SC_SERIALIZABLE;
use tracing::trace;

use crate::classes;
use crate::config::ArgValue;
use crate::error::CallError;
use crate::error::Result;

/// Serializes `values` as an `Object[]` of strings in a fresh stream.
pub fn marshal(values: &[&str]) -> Result<Vec<u8>> {
    let mut builder = Builder::new();
    let array = builder.build_array(
        classes::OBJECT_ARRAY_CLASS,
        classes::OBJECT_ARRAY_UID,
        FieldType::Object(classes::OBJECT_SIGNATURE.into()),
        Elements::Values(values.iter().map(|v| Value::utf(*v)).collect()),
        Some(vec![Value::EndBlockData]),
    )?;
    marshal_stream(&builder, &[array])
}

/// Marshals the values of an `invoke` argument map, in map order.
///
/// # Errors
/// `UnsupportedArgumentType` naming the parameter whose value is not a string.
pub fn marshal_args(args: &IndexMap<String, ArgValue>) -> Result<Vec<u8>> {
    let mut values = Vec::with_capacity(args.len());
    for (param_type, value) in args {
        let utf = value.as_utf().ok_or_else(|| CallError::UnsupportedArgumentType {
            param_type: param_type.clone(),
            found: value.kind().to_string(),
        })?;
        values.push(utf);
    }
    marshal(&values)
}

/// Serializes a builder session as a standalone stream.
pub fn marshal_stream(builder: &Builder, contents: &[Value]) -> Result<Vec<u8>> {
    let bytes = builder.serialize_stream(contents)?;
    trace!(contents = contents.len(), bytes = bytes.len(), "marshalled nested stream");
    Ok(bytes)
}

/// Wraps serialized bytes in a `java.rmi.MarshalledObject` built in `builder`.
///
/// The wrapper has no codebase annotation (`locBytes` is null).
pub fn marshalled_object(builder: &mut Builder, obj_bytes: Vec<u8>) -> Result<Value> {
    let data = builder.build_array(
        classes::BYTE_ARRAY_CLASS,
        classes::BYTE_ARRAY_UID,
        FieldType::Byte,
        Elements::Bytes(obj_bytes),
        None,
    )?;

    let object = builder.build_object(
        classes::MARSHALLED_OBJECT_CLASS,
        classes::MARSHALLED_OBJECT_UID,
        SC_SERIALIZABLE,
        vec![
            Field::new("hash", FieldType::Int),
            Field::new("locBytes", FieldType::Array(classes::BYTE_ARRAY_CLASS.into())),
            Field::new("objBytes", FieldType::Array(classes::BYTE_ARRAY_CLASS.into())),
        ],
        vec![
            Primitive::Int(classes::MARSHALLED_OBJECT_HASH).into(),
            Value::Null.into(),
            data.into(),
        ],
    )?;
    Ok(object)
}
