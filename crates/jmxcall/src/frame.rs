//! # Call Frames
//!
//! The RMI `Call` message: a one-byte message type, then a single
//! serialization stream whose first item is a block of call metadata and
//! whose remaining items are the serialized arguments.
//!
//! ```text
//! [0x50][ACED 0005][TC_BLOCKDATA 0x22]
//!     [object_number: i64][uid.number: i32][uid.time: i64][uid.count: i16]
//!     [operation: i32 = -1][method_hash: i64]
//! [argument contents...]
//! ```
//!
//! ## Invariants
//! - `operation` is always `NO_OPERATION`; the server dispatches on the hash.
//! - A frame is immutable once assembled; encoding it twice yields the same
//!   bytes.

use jserial::Builder;
use jserial::Encoder;
use jserial::Value;
use tracing::debug;

use crate::error::Result;

/// RMI transport message type for a call.
pub const CALL_MESSAGE: u8 = 0x50;
/// Operation number meaning "dispatch by method hash".
pub const NO_OPERATION: i32 = -1;
/// Bytes of an `ObjID`: object number plus unique-id triple.
pub const OBJ_ID_SIZE: usize = 8 + 4 + 8 + 2;
/// Bytes of the call metadata block: `ObjID`, operation and hash.
pub const CALL_HEADER_SIZE: usize = OBJ_ID_SIZE + 4 + 8;
/// `TC_BLOCKDATA` tag and length byte preceding the metadata.
pub const BLOCK_HEADER_SIZE: usize = 2;

/// The `UID` half of an `ObjID`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniqueId {
    pub number: i32,
    pub time: i64,
    pub count: i16,
}

/// Identity of an exported remote object, as obtained from the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjId {
    pub object_number: i64,
    pub uid: UniqueId,
}

impl ObjId {
    pub fn new(object_number: i64, uid: UniqueId) -> Self {
        Self { object_number, uid }
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.object_number.to_be_bytes());
        buf.extend_from_slice(&self.uid.number.to_be_bytes());
        buf.extend_from_slice(&self.uid.time.to_be_bytes());
        buf.extend_from_slice(&self.uid.count.to_be_bytes());
    }
}

/// A fully built call: target, method hash and the argument arena.
#[derive(Debug, Clone)]
pub struct CallFrame {
    obj_id: ObjId,
    operation: i32,
    method_hash: i64,
    builder: Builder,
    arguments: Vec<Value>,
}

/// Wraps arguments built in `builder` into a call on `obj_id`.
pub fn assemble(obj_id: ObjId, method_hash: i64, builder: Builder, arguments: Vec<Value>) -> CallFrame {
    CallFrame { obj_id, operation: NO_OPERATION, method_hash, builder, arguments }
}

impl CallFrame {
    pub fn obj_id(&self) -> ObjId {
        self.obj_id
    }

    pub fn operation(&self) -> i32 {
        self.operation
    }

    pub fn method_hash(&self) -> i64 {
        self.method_hash
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// The arena the arguments' objects and arrays live in.
    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    /// The fixed-layout call metadata.
    pub fn header(&self) -> [u8; CALL_HEADER_SIZE] {
        let mut buf = Vec::with_capacity(CALL_HEADER_SIZE);
        self.obj_id.write_to(&mut buf);
        buf.extend_from_slice(&self.operation.to_be_bytes());
        buf.extend_from_slice(&self.method_hash.to_be_bytes());

        let mut out = [0u8; CALL_HEADER_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// The call stream without the message-type byte.
    pub fn call_data(&self) -> Result<Vec<u8>> {
        let mut enc = Encoder::new(&self.builder);
        enc.stream_header();
        enc.value(&Value::BlockData(self.header().to_vec()))?;
        for arg in &self.arguments {
            enc.value(arg)?;
        }
        Ok(enc.into_bytes())
    }

    /// The complete `Call` message, ready for the transport.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let data = self.call_data()?;
        let mut out = Vec::with_capacity(1 + data.len());
        out.push(CALL_MESSAGE);
        out.extend_from_slice(&data);
        debug!(
            method_hash = self.method_hash,
            object_number = self.obj_id.object_number,
            arguments = self.arguments.len(),
            bytes = out.len(),
            "encoded rmi call"
        );
        Ok(out)
    }
}
