//! # Value Model
//!
//! The pieces a stream is assembled from. Leaf values (`Utf`, `Null`, block
//! markers) are owned directly; objects and arrays live in a `Builder` arena
//! and are referred to by `ObjectHandle`, so emitting the same handle twice
//! produces a back-reference instead of a second copy.

use crate::types::SC_SERIALIZABLE;

/// Index of an object or array inside the `Builder` that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectHandle(pub(crate) usize);

impl ObjectHandle {
    /// Position in the arena; handles are issued sequentially from zero.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A top-level content item, annotation, or object-typed slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A `java.lang.String`.
    Utf(String),
    /// The null reference.
    Null,
    /// Terminates custom data (class annotations, `writeObject` output).
    EndBlockData,
    /// Raw primitive data written in block mode.
    BlockData(Vec<u8>),
    /// An object or array built by a `Builder`.
    Object(ObjectHandle),
}

impl Value {
    pub fn utf(s: impl Into<String>) -> Self {
        Value::Utf(s.into())
    }

    /// Short name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Utf(_) => "string",
            Value::Null => "null",
            Value::EndBlockData => "end-block-data",
            Value::BlockData(_) => "block-data",
            Value::Object(_) => "object",
        }
    }
}

/// A primitive field value or array element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
}

impl Primitive {
    pub fn field_type(&self) -> FieldType {
        match self {
            Primitive::Byte(_) => FieldType::Byte,
            Primitive::Char(_) => FieldType::Char,
            Primitive::Double(_) => FieldType::Double,
            Primitive::Float(_) => FieldType::Float,
            Primitive::Int(_) => FieldType::Int,
            Primitive::Long(_) => FieldType::Long,
            Primitive::Short(_) => FieldType::Short,
            Primitive::Boolean(_) => FieldType::Boolean,
        }
    }

    /// Appends the big-endian encoding.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match *self {
            Primitive::Byte(v) => buf.push(v as u8),
            Primitive::Char(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Double(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Long(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Short(v) => buf.extend_from_slice(&v.to_be_bytes()),
            Primitive::Boolean(v) => buf.push(v as u8),
        }
    }
}

/// The declared type of a field or array component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Int,
    Long,
    Short,
    Boolean,
    /// Object type with its JVM signature, e.g. `Ljava/lang/String;`.
    Object(String),
    /// Array type with its JVM signature, e.g. `[B`.
    Array(String),
}

impl FieldType {
    /// The JVM descriptor character written before the field name.
    pub fn type_code(&self) -> u8 {
        match self {
            FieldType::Byte => b'B',
            FieldType::Char => b'C',
            FieldType::Double => b'D',
            FieldType::Float => b'F',
            FieldType::Int => b'I',
            FieldType::Long => b'J',
            FieldType::Short => b'S',
            FieldType::Boolean => b'Z',
            FieldType::Object(_) => b'L',
            FieldType::Array(_) => b'[',
        }
    }

    /// Signature string written after object and array field names.
    pub fn signature(&self) -> Option<&str> {
        match self {
            FieldType::Object(sig) | FieldType::Array(sig) => Some(sig),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.signature().is_none()
    }

    /// Byte width of a primitive, `None` for references.
    pub fn width(&self) -> Option<usize> {
        match self {
            FieldType::Byte | FieldType::Boolean => Some(1),
            FieldType::Char | FieldType::Short => Some(2),
            FieldType::Int | FieldType::Float => Some(4),
            FieldType::Long | FieldType::Double => Some(8),
            FieldType::Object(_) | FieldType::Array(_) => None,
        }
    }

    /// Component type of an array class name (`[B`, `[Ljava.lang.String;`).
    pub fn component_of(class_name: &str) -> Option<FieldType> {
        let rest = class_name.strip_prefix('[')?;
        let ty = match rest.as_bytes().first()? {
            b'B' => FieldType::Byte,
            b'C' => FieldType::Char,
            b'D' => FieldType::Double,
            b'F' => FieldType::Float,
            b'I' => FieldType::Int,
            b'J' => FieldType::Long,
            b'S' => FieldType::Short,
            b'Z' => FieldType::Boolean,
            b'L' => FieldType::Object(rest.replace('.', "/")),
            b'[' => FieldType::Array(rest.replace('.', "/")),
            _ => return None,
        };
        Some(ty)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.signature() {
            Some(sig) => f.write_str(sig),
            None => write!(f, "{}", self.type_code() as char),
        }
    }
}

/// A serializable field declared by a class descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// A class descriptor (`TC_CLASSDESC`).
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDesc {
    pub name: String,
    /// Bit pattern of the Java `long` serialVersionUID.
    pub serial_uid: u64,
    pub flags: u8,
    pub fields: Vec<Field>,
    /// Written verbatim; include `EndBlockData` to terminate.
    pub annotations: Vec<Value>,
    pub super_class: Option<Box<ClassDesc>>,
}

impl ClassDesc {
    /// A serializable class with no fields and the annotations an RMI
    /// marshal stream writes: a null codebase, then the terminator.
    pub fn new(name: impl Into<String>, serial_uid: u64) -> Self {
        Self {
            name: name.into(),
            serial_uid,
            flags: SC_SERIALIZABLE,
            fields: Vec::new(),
            annotations: default_annotations(),
            super_class: None,
        }
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.push(Field::new(name, ty));
        self
    }

    pub fn fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn annotations(mut self, annotations: Vec<Value>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn super_class(mut self, desc: ClassDesc) -> Self {
        self.super_class = Some(Box::new(desc));
        self
    }
}

/// `[Null, EndBlockData]`
pub fn default_annotations() -> Vec<Value> {
    vec![Value::Null, Value::EndBlockData]
}

/// One slot of object class data.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Primitive(Primitive),
    Value(Value),
}

impl From<Primitive> for Datum {
    fn from(p: Primitive) -> Self {
        Datum::Primitive(p)
    }
}

impl From<Value> for Datum {
    fn from(v: Value) -> Self {
        Datum::Value(v)
    }
}

/// Array contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements {
    /// A `byte[]`, stored unboxed.
    Bytes(Vec<u8>),
    Primitives(Vec<Primitive>),
    Values(Vec<Value>),
}

impl Elements {
    pub fn len(&self) -> usize {
        match self {
            Elements::Bytes(b) => b.len(),
            Elements::Primitives(p) => p.len(),
            Elements::Values(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A new object: descriptor plus class data in field order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewObject {
    pub desc: ClassDesc,
    pub data: Vec<Datum>,
}

/// A new array: descriptor, component type and contents.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArray {
    pub desc: ClassDesc,
    pub element_type: FieldType,
    pub elements: Elements,
}

/// An arena entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Object(NewObject),
    Array(NewArray),
}

impl Entry {
    pub fn desc(&self) -> &ClassDesc {
        match self {
            Entry::Object(o) => &o.desc,
            Entry::Array(a) => &a.desc,
        }
    }
}
