//! # Error Definitions
//!
//! Everything that can stop a call stream from being built.

use jserial::Error as SerialError;

/// Failures while building or encoding a call.
#[derive(Debug, Clone, PartialEq)]
pub enum CallError {
    /// The underlying stream encoder rejected a value.
    Serialization(SerialError),
    /// An `invoke` argument value has no string form.
    UnsupportedArgumentType { param_type: String, found: String },
    /// A method-hash strategy disagrees with the known constant.
    ProtocolConstantMismatch { method: &'static str, expected: i64, computed: i64 },
}

impl std::fmt::Display for CallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialization(e) => write!(f, "Serialization failed: {}", e),
            Self::UnsupportedArgumentType { param_type, found } => {
                write!(f, "Argument for parameter {} is a {}, only strings can be marshalled", param_type, found)
            }
            Self::ProtocolConstantMismatch { method, expected, computed } => {
                write!(f, "Hash mismatch for {}: expected {}, computed {}", method, expected, computed)
            }
        }
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SerialError> for CallError {
    fn from(e: SerialError) -> Self { Self::Serialization(e) }
}

/// A specialized Result type for call construction.
pub type Result<T> = std::result::Result<T, CallError>;
