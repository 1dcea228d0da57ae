//! # Encoder
//!
//! Writes `Value`s into a serialization stream.
//!
//! ## Handle Assignment
//!
//! Wire handles are assigned in the order `ObjectInputStream` assigns them
//! while reading: a class descriptor takes its handle before its field
//! signatures, annotations and superclass are written; an object or array
//! takes its handle after its descriptor and before its data; every string
//! takes one. An arena entry emitted a second time is written as a
//! `TC_REFERENCE` to the handle it received the first time.

use std::collections::HashMap;

use crate::builder::Builder;
use crate::model::ClassDesc;
use crate::model::Datum;
use crate::model::Elements;
use crate::model::Entry;
use crate::model::ObjectHandle;
use crate::model::Value;
use crate::mutf8;
use crate::types::BASE_WIRE_HANDLE;
use crate::types::Error;
use crate::types::MAX_SHORT_BLOCK;
use crate::types::MAX_SHORT_UTF;
use crate::types::Result;
use crate::types::STREAM_MAGIC;
use crate::types::STREAM_VERSION;
use crate::types::Tag;

/// Encodes a leaf value on its own.
///
/// Objects and arrays need the arena that owns them; use
/// `Builder::serialize_stream` for those.
pub fn encode_primitive(value: &Value) -> Result<Vec<u8>> {
    let arena = Builder::new();
    let mut enc = Encoder::new(&arena);
    enc.value(value)?;
    Ok(enc.into_bytes())
}

/// A growable buffer bound to the `Builder` whose entries it may emit.
pub struct Encoder<'b> {
    buf: Vec<u8>,
    builder: &'b Builder,
    next_handle: u32,
    emitted: HashMap<ObjectHandle, u32>,
}

impl<'b> Encoder<'b> {
    pub fn new(builder: &'b Builder) -> Self {
        Self {
            buf: Vec::with_capacity(256),
            builder,
            next_handle: BASE_WIRE_HANDLE,
            emitted: HashMap::new(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Writes `STREAM_MAGIC` and `STREAM_VERSION`.
    pub fn stream_header(&mut self) {
        self.buf.extend_from_slice(&STREAM_MAGIC.to_be_bytes());
        self.buf.extend_from_slice(&STREAM_VERSION.to_be_bytes());
    }

    /// Writes one content item, recursing into arena entries.
    pub fn value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Utf(s) => self.string(s),
            Value::Null => {
                self.tag(Tag::Null);
                Ok(())
            }
            Value::EndBlockData => {
                self.tag(Tag::EndBlockData);
                Ok(())
            }
            Value::BlockData(data) => {
                self.block_data(data);
                Ok(())
            }
            Value::Object(handle) => self.entry(*handle),
        }
    }

    fn tag(&mut self, tag: Tag) {
        self.buf.push(tag as u8);
    }

    fn assign_handle(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        handle
    }

    /// `writeUTF` body: u16 length then modified UTF-8, no tag.
    fn utf(&mut self, s: &str) -> Result<()> {
        let bytes = mutf8::encode(s);
        if bytes.len() > MAX_SHORT_UTF {
            return Err(Error::StringTooLong(bytes.len()));
        }
        self.buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        self.buf.extend_from_slice(&bytes);
        Ok(())
    }

    fn string(&mut self, s: &str) -> Result<()> {
        let bytes = mutf8::encode(s);
        if bytes.len() > MAX_SHORT_UTF {
            self.tag(Tag::LongString);
            self.buf.extend_from_slice(&(bytes.len() as u64).to_be_bytes());
        } else {
            self.tag(Tag::String);
            self.buf.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
        }
        self.buf.extend_from_slice(&bytes);
        self.assign_handle();
        Ok(())
    }

    fn block_data(&mut self, data: &[u8]) {
        if data.len() > MAX_SHORT_BLOCK {
            self.tag(Tag::BlockDataLong);
            self.buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
        } else {
            self.tag(Tag::BlockData);
            self.buf.push(data.len() as u8);
        }
        self.buf.extend_from_slice(data);
    }

    fn entry(&mut self, handle: ObjectHandle) -> Result<()> {
        if let Some(&wire) = self.emitted.get(&handle) {
            self.tag(Tag::Reference);
            self.buf.extend_from_slice(&wire.to_be_bytes());
            return Ok(());
        }

        let builder = self.builder;
        let entry = builder.get(handle).ok_or(Error::UnknownHandle(handle.index()))?;
        match entry {
            Entry::Object(obj) => {
                self.tag(Tag::Object);
                self.class_desc(&obj.desc)?;
                let wire = self.assign_handle();
                self.emitted.insert(handle, wire);
                for datum in &obj.data {
                    match datum {
                        Datum::Primitive(p) => p.write_to(&mut self.buf),
                        Datum::Value(v) => self.value(v)?,
                    }
                }
            }
            Entry::Array(arr) => {
                self.tag(Tag::Array);
                self.class_desc(&arr.desc)?;
                let wire = self.assign_handle();
                self.emitted.insert(handle, wire);
                self.buf.extend_from_slice(&(arr.elements.len() as i32).to_be_bytes());
                match &arr.elements {
                    Elements::Bytes(bytes) => self.buf.extend_from_slice(bytes),
                    Elements::Primitives(items) => {
                        for p in items {
                            p.write_to(&mut self.buf);
                        }
                    }
                    Elements::Values(items) => {
                        for v in items {
                            self.value(v)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn class_desc(&mut self, desc: &ClassDesc) -> Result<()> {
        self.tag(Tag::ClassDesc);
        self.assign_handle();
        self.utf(&desc.name)?;
        self.buf.extend_from_slice(&desc.serial_uid.to_be_bytes());
        self.buf.push(desc.flags);
        self.buf.extend_from_slice(&(desc.fields.len() as u16).to_be_bytes());
        for field in &desc.fields {
            self.buf.push(field.ty.type_code());
            self.utf(&field.name)?;
            if let Some(sig) = field.ty.signature() {
                self.string(sig)?;
            }
        }
        for annotation in &desc.annotations {
            self.value(annotation)?;
        }
        match &desc.super_class {
            Some(sup) => self.class_desc(sup),
            None => {
                self.tag(Tag::Null);
                Ok(())
            }
        }
    }
}
