//! # Decoder
//!
//! An independent reader for the streams this crate produces, used to check
//! that what was written is what a Java peer would read back.
//!
//! ## Invariants
//! - Handles are assigned in the same order as `ObjectInputStream`.
//! - A `TC_REFERENCE` must name a handle that was already assigned.
//! - Class data is read from the top-most superclass down; classes with a
//!   `writeObject` method contribute their custom data up to `TC_ENDBLOCKDATA`.

use crate::cursor::Cursor;
use crate::model::Field;
use crate::model::FieldType;
use crate::model::Primitive;
use crate::mutf8;
use crate::types::BASE_WIRE_HANDLE;
use crate::types::Error;
use crate::types::Result;
use crate::types::SC_EXTERNALIZABLE;
use crate::types::SC_WRITE_METHOD;
use crate::types::STREAM_MAGIC;
use crate::types::STREAM_VERSION;
use crate::types::Tag;

/// A decoded content item.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Utf(String),
    Null,
    EndBlockData,
    BlockData(Vec<u8>),
    /// Back-reference to an earlier handle.
    Reference(u32),
    Object(DecodedObject),
    Array(DecodedArray),
    ClassDesc(DecodedClass),
}

impl Content {
    pub fn as_utf(&self) -> Option<&str> {
        match self {
            Content::Utf(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&DecodedObject> {
        match self {
            Content::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&DecodedArray> {
        match self {
            Content::Array(a) => Some(a),
            _ => None,
        }
    }
}

/// A decoded class descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedClass {
    pub handle: u32,
    pub name: String,
    pub serial_uid: u64,
    pub flags: u8,
    pub fields: Vec<Field>,
    /// Annotation contents without the closing `TC_ENDBLOCKDATA`.
    pub annotations: Vec<Content>,
    pub super_class: Option<Box<DecodedClass>>,
}

/// A decoded class-data slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    Primitive(Primitive),
    Content(Content),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedObject {
    pub handle: u32,
    pub class: DecodedClass,
    /// Field values of the whole hierarchy, top-most superclass first.
    pub fields: Vec<(String, Data)>,
    /// Contents written by `writeObject`, without the closing terminator.
    pub custom_data: Vec<Content>,
}

impl DecodedObject {
    pub fn field(&self, name: &str) -> Option<&Data> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Bytes(Vec<u8>),
    Primitives(Vec<Primitive>),
    Contents(Vec<Content>),
}

impl ArrayData {
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Bytes(b) => b.len(),
            ArrayData::Primitives(p) => p.len(),
            ArrayData::Contents(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedArray {
    pub handle: u32,
    pub class: DecodedClass,
    pub elements: ArrayData,
}

/// What a wire handle was assigned to.
#[derive(Debug, Clone)]
enum Slot {
    /// A class descriptor still being read.
    Pending,
    Class(DecodedClass),
    Str(String),
    Other,
}

/// Reads a complete stream, rejecting truncated or trailing input.
pub fn read_stream(bytes: &[u8]) -> Result<Vec<Content>> {
    let mut dec = Decoder::new(bytes);
    dec.stream_header()?;
    let mut contents = Vec::new();
    while dec.remaining() > 0 {
        contents.push(dec.content()?);
    }
    Ok(contents)
}

#[derive(Debug, Clone)]
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    handles: Vec<Slot>,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { cursor: Cursor::new(buf), handles: Vec::new() }
    }

    pub fn pos(&self) -> usize {
        self.cursor.pos()
    }

    pub fn remaining(&self) -> usize {
        self.cursor.remaining()
    }

    /// Checks and consumes magic and version.
    pub fn stream_header(&mut self) -> Result<()> {
        let magic = self.cursor.read_u16()?;
        if magic != STREAM_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }
        let version = self.cursor.read_u16()?;
        if version != STREAM_VERSION {
            return Err(Error::InvalidVersion(version));
        }
        Ok(())
    }

    /// Fails with `TrailingBytes` unless the input is exhausted.
    pub fn finish(&self) -> Result<()> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(Error::TrailingBytes(n)),
        }
    }

    fn read_tag(&mut self) -> Result<Tag> {
        let byte = self.cursor.read_byte()?;
        Tag::from_u8(byte).ok_or(Error::InvalidTag(byte))
    }

    fn assign(&mut self, slot: Slot) -> u32 {
        self.handles.push(slot);
        BASE_WIRE_HANDLE + (self.handles.len() as u32 - 1)
    }

    fn slot(&self, handle: u32) -> Result<&Slot> {
        handle
            .checked_sub(BASE_WIRE_HANDLE)
            .and_then(|idx| self.handles.get(idx as usize))
            .ok_or(Error::InvalidWireHandle(handle))
    }

    fn utf(&mut self) -> Result<String> {
        let len = self.cursor.read_u16()? as usize;
        mutf8::decode(self.cursor.read_bytes(len)?)
    }

    fn long_utf(&mut self) -> Result<String> {
        let len = self.cursor.read_i64()?;
        if len < 0 {
            return Err(Error::NegativeLength(len));
        }
        let len = usize::try_from(len).map_err(|_| Error::UnexpectedEnd)?;
        mutf8::decode(self.cursor.read_bytes(len)?)
    }

    /// Reads the next content item.
    pub fn content(&mut self) -> Result<Content> {
        let tag = self.read_tag()?;
        self.content_after_tag(tag)
    }

    fn content_after_tag(&mut self, tag: Tag) -> Result<Content> {
        match tag {
            Tag::Null => Ok(Content::Null),
            Tag::EndBlockData => Ok(Content::EndBlockData),
            Tag::Reference => {
                let handle = self.cursor.read_u32()?;
                self.slot(handle)?;
                Ok(Content::Reference(handle))
            }
            Tag::String | Tag::LongString => {
                let s = if tag == Tag::String { self.utf()? } else { self.long_utf()? };
                self.assign(Slot::Str(s.clone()));
                Ok(Content::Utf(s))
            }
            Tag::BlockData => {
                let len = self.cursor.read_byte()? as usize;
                Ok(Content::BlockData(self.cursor.read_bytes(len)?.to_vec()))
            }
            Tag::BlockDataLong => {
                let len = self.cursor.read_i32()?;
                if len < 0 {
                    return Err(Error::NegativeLength(len as i64));
                }
                Ok(Content::BlockData(self.cursor.read_bytes(len as usize)?.to_vec()))
            }
            Tag::ClassDesc => Ok(Content::ClassDesc(self.new_class_desc()?)),
            Tag::Object => Ok(Content::Object(self.new_object()?)),
            Tag::Array => Ok(Content::Array(self.new_array()?)),
            Tag::Class | Tag::Reset | Tag::Exception | Tag::ProxyClassDesc | Tag::Enum => {
                Err(Error::UnsupportedTag(tag))
            }
        }
    }

    /// Reads contents up to and including `TC_ENDBLOCKDATA`.
    fn block_contents(&mut self) -> Result<Vec<Content>> {
        let mut out = Vec::new();
        loop {
            match self.content()? {
                Content::EndBlockData => return Ok(out),
                other => out.push(other),
            }
        }
    }

    /// A descriptor in class-desc position: new, null, or a reference.
    fn class_desc(&mut self) -> Result<Option<DecodedClass>> {
        match self.read_tag()? {
            Tag::ClassDesc => Ok(Some(self.new_class_desc()?)),
            Tag::Null => Ok(None),
            Tag::Reference => {
                let handle = self.cursor.read_u32()?;
                match self.slot(handle)? {
                    Slot::Class(c) => Ok(Some(c.clone())),
                    _ => Err(Error::TypeMismatch {
                        expected: "class descriptor".into(),
                        found: format!("handle {:#x}", handle),
                    }),
                }
            }
            other => Err(Error::InvalidTag(other as u8)),
        }
    }

    fn required_class_desc(&mut self) -> Result<DecodedClass> {
        self.class_desc()?.ok_or(Error::TypeMismatch {
            expected: "class descriptor".into(),
            found: "null".into(),
        })
    }

    fn new_class_desc(&mut self) -> Result<DecodedClass> {
        let handle = self.assign(Slot::Pending);
        let name = self.utf()?;
        let serial_uid = self.cursor.read_u64()?;
        let flags = self.cursor.read_byte()?;
        let count = self.cursor.read_u16()?;

        let mut fields = Vec::with_capacity(count as usize);
        for _ in 0..count {
            fields.push(self.field()?);
        }

        let annotations = self.block_contents()?;
        let super_class = self.class_desc()?.map(Box::new);

        let class = DecodedClass { handle, name, serial_uid, flags, fields, annotations, super_class };
        self.handles[(handle - BASE_WIRE_HANDLE) as usize] = Slot::Class(class.clone());
        Ok(class)
    }

    fn field(&mut self) -> Result<Field> {
        let code = self.cursor.read_byte()?;
        let name = self.utf()?;
        let ty = match code {
            b'B' => FieldType::Byte,
            b'C' => FieldType::Char,
            b'D' => FieldType::Double,
            b'F' => FieldType::Float,
            b'I' => FieldType::Int,
            b'J' => FieldType::Long,
            b'S' => FieldType::Short,
            b'Z' => FieldType::Boolean,
            b'L' => FieldType::Object(self.type_string()?),
            b'[' => FieldType::Array(self.type_string()?),
            other => return Err(Error::InvalidTypeCode(other)),
        };
        Ok(Field { name, ty })
    }

    fn type_string(&mut self) -> Result<String> {
        match self.content()? {
            Content::Utf(s) => Ok(s),
            Content::Reference(h) => match self.slot(h)? {
                Slot::Str(s) => Ok(s.clone()),
                _ => Err(Error::TypeMismatch {
                    expected: "string".into(),
                    found: format!("handle {:#x}", h),
                }),
            },
            other => Err(Error::TypeMismatch {
                expected: "string".into(),
                found: format!("{:?}", other),
            }),
        }
    }

    fn primitive(&mut self, ty: &FieldType) -> Result<Primitive> {
        let p = match ty {
            FieldType::Byte => Primitive::Byte(self.cursor.read_byte()? as i8),
            FieldType::Char => Primitive::Char(self.cursor.read_u16()?),
            FieldType::Double => Primitive::Double(self.cursor.read_f64()?),
            FieldType::Float => Primitive::Float(self.cursor.read_f32()?),
            FieldType::Int => Primitive::Int(self.cursor.read_i32()?),
            FieldType::Long => Primitive::Long(self.cursor.read_i64()?),
            FieldType::Short => Primitive::Short(self.cursor.read_i16()?),
            FieldType::Boolean => Primitive::Boolean(self.cursor.read_byte()? != 0),
            FieldType::Object(_) | FieldType::Array(_) => {
                return Err(Error::TypeMismatch { expected: "primitive".into(), found: ty.to_string() });
            }
        };
        Ok(p)
    }

    fn new_object(&mut self) -> Result<DecodedObject> {
        let class = self.required_class_desc()?;
        let handle = self.assign(Slot::Other);

        let mut chain = Vec::new();
        let mut next = Some(&class);
        while let Some(c) = next {
            chain.push(c.clone());
            next = c.super_class.as_deref();
        }

        let mut fields = Vec::new();
        let mut custom_data = Vec::new();
        for c in chain.iter().rev() {
            for field in &c.fields {
                let data = if field.ty.is_primitive() {
                    Data::Primitive(self.primitive(&field.ty)?)
                } else {
                    Data::Content(self.content()?)
                };
                fields.push((field.name.clone(), data));
            }
            if c.flags & (SC_WRITE_METHOD | SC_EXTERNALIZABLE) != 0 {
                custom_data.extend(self.block_contents()?);
            }
        }

        Ok(DecodedObject { handle, class, fields, custom_data })
    }

    fn new_array(&mut self) -> Result<DecodedArray> {
        let class = self.required_class_desc()?;
        let handle = self.assign(Slot::Other);
        let len = self.cursor.read_i32()?;
        if len < 0 {
            return Err(Error::NegativeLength(len as i64));
        }
        let len = len as usize;

        let component = FieldType::component_of(&class.name)
            .ok_or_else(|| Error::InvalidTypeCode(class.name.bytes().nth(1).unwrap_or(0)))?;
        let elements = match component {
            FieldType::Byte => ArrayData::Bytes(self.cursor.read_bytes(len)?.to_vec()),
            ref ty if ty.is_primitive() => {
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.primitive(ty)?);
                }
                ArrayData::Primitives(items)
            }
            _ => {
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for _ in 0..len {
                    items.push(self.content()?);
                }
                ArrayData::Contents(items)
            }
        };

        Ok(DecodedArray { handle, class, elements })
    }
}
