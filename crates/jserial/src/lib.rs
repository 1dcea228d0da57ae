//! # jserial
//!
//! A small, strict writer (and verifying reader) for the Java Object
//! Serialization Stream Protocol.
//!
//! ## Architecture
//!
//! - **Arena**: objects and arrays are added to a `Builder`, which hands out
//!   sequential `ObjectHandle`s. One builder is one stream session.
//! - **Encoder**: walks `Value`s against a builder and assigns wire handles in
//!   the order a Java reader would; re-emitting a handle writes a
//!   back-reference.
//! - **Decoder**: an independent reader producing a `Content` tree, used to
//!   check produced streams.
//!
//! ## Format
//!
//! - **Stream**: `[Magic: 0xACED][Version: 5][Content...]`
//! - **Strings**: `[TC_STRING][Len: u16][Modified UTF-8]`
//! - **Objects**: `[TC_OBJECT][ClassDesc][ClassData]`
//! - **Arrays**: `[TC_ARRAY][ClassDesc][Len: i32][Elements]`
//!
//! All integers are Big-Endian.

pub mod builder;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod model;
pub mod mutf8;
pub mod types;

pub use types::Error;
pub use types::Result;
pub use types::Tag;

pub use builder::Builder;

pub use encoder::Encoder;
pub use encoder::encode_primitive;

pub use decoder::ArrayData;
pub use decoder::Content;
pub use decoder::Data;
pub use decoder::DecodedArray;
pub use decoder::DecodedClass;
pub use decoder::DecodedObject;
pub use decoder::Decoder;
pub use decoder::read_stream;

pub use model::ClassDesc;
pub use model::Datum;
pub use model::Elements;
pub use model::Entry;
pub use model::Field;
pub use model::FieldType;
pub use model::ObjectHandle;
pub use model::Primitive;
pub use model::Value;
