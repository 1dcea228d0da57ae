//! Core types for the Java serialization stream format

/// First two bytes of every stream.
pub const STREAM_MAGIC: u16 = 0xACED;
/// Protocol version written after the magic.
pub const STREAM_VERSION: u16 = 5;
/// Size of the magic + version prefix.
pub const STREAM_HEADER_SIZE: usize = 4;
/// The first handle assigned in a stream.
pub const BASE_WIRE_HANDLE: u32 = 0x7E_0000;

/// Class defines a `writeObject` method.
pub const SC_WRITE_METHOD: u8 = 0x01;
/// Class is `Serializable`.
pub const SC_SERIALIZABLE: u8 = 0x02;
/// Class is `Externalizable`.
pub const SC_EXTERNALIZABLE: u8 = 0x04;

/// Longest string that fits a `TC_STRING` length prefix.
pub const MAX_SHORT_UTF: usize = 0xFFFF;
/// Longest payload that fits a `TC_BLOCKDATA` length prefix.
pub const MAX_SHORT_BLOCK: usize = 0xFF;

/// Stream type codes (`TC_*`).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Null = 0x70,
    Reference = 0x71,
    ClassDesc = 0x72,
    Object = 0x73,
    String = 0x74,
    Array = 0x75,
    Class = 0x76,
    BlockData = 0x77,
    EndBlockData = 0x78,
    Reset = 0x79,
    BlockDataLong = 0x7A,
    Exception = 0x7B,
    LongString = 0x7C,
    ProxyClassDesc = 0x7D,
    Enum = 0x7E,
}

impl Tag {
    pub const fn from_u8(b: u8) -> Option<Self> {
        match b {
            0x70 => Some(Tag::Null),
            0x71 => Some(Tag::Reference),
            0x72 => Some(Tag::ClassDesc),
            0x73 => Some(Tag::Object),
            0x74 => Some(Tag::String),
            0x75 => Some(Tag::Array),
            0x76 => Some(Tag::Class),
            0x77 => Some(Tag::BlockData),
            0x78 => Some(Tag::EndBlockData),
            0x79 => Some(Tag::Reset),
            0x7A => Some(Tag::BlockDataLong),
            0x7B => Some(Tag::Exception),
            0x7C => Some(Tag::LongString),
            0x7D => Some(Tag::ProxyClassDesc),
            0x7E => Some(Tag::Enum),
            _ => None,
        }
    }
}

/// Serialization and deserialization errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Buffer exhausted while reading.
    UnexpectedEnd,
    /// Stream does not start with `0xACED`.
    InvalidMagic(u16),
    /// Stream version is not 5.
    InvalidVersion(u16),
    /// Byte does not correspond to a `Tag`.
    InvalidTag(u8),
    /// A valid tag this library does not produce or parse.
    UnsupportedTag(Tag),
    /// String bytes are not valid modified UTF-8.
    InvalidUtf8,
    /// A class or field name longer than a `writeUTF` length prefix allows.
    StringTooLong(usize),
    /// Field or array type code is not a JVM descriptor character.
    InvalidTypeCode(u8),
    /// `ObjectHandle` does not belong to the builder being encoded.
    UnknownHandle(usize),
    /// `TC_REFERENCE` to a handle that was never assigned.
    InvalidWireHandle(u32),
    /// Object data does not supply one value per declared field.
    FieldCountMismatch { class: String, expected: usize, found: usize },
    /// A value does not agree with its declared field or element type.
    TypeMismatch { expected: String, found: String },
    /// A length prefix was negative.
    NegativeLength(i64),
    /// Bytes left over after the last content of a stream.
    TrailingBytes(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidMagic(m) => write!(f, "Invalid stream magic: {:#06x}", m),
            Error::InvalidVersion(v) => write!(f, "Unsupported stream version: {}", v),
            Error::InvalidTag(b) => write!(f, "Invalid type code byte: {:#04x}", b),
            Error::InvalidWireHandle(h) => write!(f, "Reference to unassigned handle {:#x}", h),
            Error::FieldCountMismatch { class, expected, found } => {
                write!(f, "{}: expected {} field values, found {}", class, expected, found)
            }
            Error::TypeMismatch { expected, found } => {
                write!(f, "Type mismatch: expected {}, found {}", expected, found)
            }
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for Error {}

/// Specialized `Result` for serialization operations.
pub type Result<T> = std::result::Result<T, Error>;
