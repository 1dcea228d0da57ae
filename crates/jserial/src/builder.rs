//! # Builder
//!
//! An arena of objects and arrays for one stream-construction session.
//!
//! ## Invariants
//! - Handles are issued sequentially and are only meaningful to the builder
//!   that issued them.
//! - Entries are validated on insertion: class data matches the descriptor's
//!   fields, array elements match the component type.

use crate::encoder::Encoder;
use crate::model::ClassDesc;
use crate::model::Datum;
use crate::model::Elements;
use crate::model::Entry;
use crate::model::Field;
use crate::model::FieldType;
use crate::model::NewArray;
use crate::model::NewObject;
use crate::model::ObjectHandle;
use crate::model::Value;
use crate::model::default_annotations;
use crate::types::Error;
use crate::types::Result;
use crate::types::SC_SERIALIZABLE;

#[derive(Debug, Default, Clone)]
pub struct Builder {
    entries: Vec<Entry>,
}

impl Builder {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&Entry> {
        self.entries.get(handle.0)
    }

    /// Builds a new object from its class identity, field layout and data.
    ///
    /// `fields` and `field_values` are in stream order: primitives first,
    /// then references, as `ObjectStreamClass` sorts them.
    pub fn build_object(
        &mut self,
        class_name: &str,
        serial_uid: u64,
        flags: u8,
        fields: Vec<Field>,
        field_values: Vec<Datum>,
    ) -> Result<Value> {
        let desc = ClassDesc::new(class_name, serial_uid).flags(flags).fields(fields);
        self.new_object(desc, field_values)
    }

    /// Builds a new array. `annotations` defaults to `[Null, EndBlockData]`.
    pub fn build_array(
        &mut self,
        class_name: &str,
        serial_uid: u64,
        element_type: FieldType,
        elements: Elements,
        annotations: Option<Vec<Value>>,
    ) -> Result<Value> {
        let desc = ClassDesc::new(class_name, serial_uid)
            .flags(SC_SERIALIZABLE)
            .annotations(annotations.unwrap_or_else(default_annotations));
        self.new_array(desc, element_type, elements)
    }

    /// Adds an object with an explicit descriptor.
    ///
    /// # Errors
    /// `FieldCountMismatch` when `data` does not cover every field of the
    /// class hierarchy; `TypeMismatch` when a datum disagrees with its field.
    pub fn new_object(&mut self, desc: ClassDesc, data: Vec<Datum>) -> Result<Value> {
        let fields = hierarchy_fields(&desc);
        if fields.len() != data.len() {
            return Err(Error::FieldCountMismatch {
                class: desc.name.clone(),
                expected: fields.len(),
                found: data.len(),
            });
        }
        for (field, datum) in fields.iter().zip(&data) {
            self.check_datum(&field.ty, datum)?;
        }
        self.check_annotations(&desc)?;
        Ok(self.push(Entry::Object(NewObject { desc, data })))
    }

    /// Adds an array with an explicit descriptor.
    pub fn new_array(&mut self, desc: ClassDesc, element_type: FieldType, elements: Elements) -> Result<Value> {
        match &elements {
            Elements::Bytes(_) => {
                if element_type != FieldType::Byte {
                    return Err(mismatch(&element_type, "byte"));
                }
            }
            Elements::Primitives(items) => {
                for p in items {
                    if p.field_type() != element_type {
                        return Err(mismatch(&element_type, &p.field_type().to_string()));
                    }
                }
            }
            Elements::Values(items) => {
                if element_type.is_primitive() {
                    return Err(mismatch(&element_type, "reference"));
                }
                for v in items {
                    self.check_reference(v)?;
                }
            }
        }
        self.check_annotations(&desc)?;
        Ok(self.push(Entry::Array(NewArray { desc, element_type, elements })))
    }

    /// Serializes `contents` as one complete stream.
    pub fn serialize_stream(&self, contents: &[Value]) -> Result<Vec<u8>> {
        let mut enc = Encoder::new(self);
        enc.stream_header();
        for value in contents {
            enc.value(value)?;
        }
        Ok(enc.into_bytes())
    }

    fn push(&mut self, entry: Entry) -> Value {
        let handle = ObjectHandle(self.entries.len());
        self.entries.push(entry);
        Value::Object(handle)
    }

    fn check_datum(&self, ty: &FieldType, datum: &Datum) -> Result<()> {
        match datum {
            Datum::Primitive(p) if p.field_type() == *ty => Ok(()),
            Datum::Primitive(p) => Err(mismatch(ty, &p.field_type().to_string())),
            Datum::Value(_) if ty.is_primitive() => Err(mismatch(ty, "reference")),
            Datum::Value(v) => self.check_reference(v),
        }
    }

    /// Only strings, null and built entries can occupy a reference slot.
    fn check_reference(&self, v: &Value) -> Result<()> {
        match v {
            Value::Utf(_) | Value::Null => Ok(()),
            Value::Object(h) => self.check_handle(*h),
            Value::EndBlockData | Value::BlockData(_) => Err(Error::TypeMismatch {
                expected: "reference".into(),
                found: v.kind().into(),
            }),
        }
    }

    /// Annotations must end with the only `EndBlockData` in the list.
    fn check_annotations(&self, desc: &ClassDesc) -> Result<()> {
        let mut next = Some(desc);
        while let Some(d) = next {
            let Some((last, body)) = d.annotations.split_last() else {
                return Err(unterminated(&d.name, "nothing"));
            };
            if *last != Value::EndBlockData {
                return Err(unterminated(&d.name, last.kind()));
            }
            for v in body {
                match v {
                    Value::Object(h) => self.check_handle(*h)?,
                    Value::EndBlockData => return Err(unterminated(&d.name, "early end-block-data")),
                    _ => {}
                }
            }
            next = d.super_class.as_deref();
        }
        Ok(())
    }

    fn check_handle(&self, h: ObjectHandle) -> Result<()> {
        if h.0 < self.entries.len() { Ok(()) } else { Err(Error::UnknownHandle(h.0)) }
    }
}

/// Fields of the whole hierarchy, top-most superclass first.
pub(crate) fn hierarchy_fields(desc: &ClassDesc) -> Vec<&Field> {
    let mut chain = Vec::new();
    let mut next = Some(desc);
    while let Some(d) = next {
        chain.push(d);
        next = d.super_class.as_deref();
    }
    chain.iter().rev().flat_map(|d| d.fields.iter()).collect()
}

fn unterminated(class: &str, found: &str) -> Error {
    Error::TypeMismatch { expected: format!("end-block-data closing annotations of {}", class), found: found.to_string() }
}

fn mismatch(expected: &FieldType, found: &str) -> Error {
    Error::TypeMismatch { expected: expected.to_string(), found: found.to_string() }
}
