//! # Method Hashes
//!
//! RMI stubs identify a method by a 64-bit hash of its name and descriptor.
//! The hash is the first eight bytes of the SHA-1 digest of the signature as
//! written by `DataOutputStream.writeUTF`, read as a little-endian `long`.
//!
//! Callers choose a `MethodHasher`: `DigestHasher` computes hashes, so any
//! method can be targeted; `KnownHasher` returns the recorded constants for
//! the three `RMIConnection` methods this crate encodes.

use jserial::mutf8;
use jserial::types::MAX_SHORT_UTF;
use sha1::Digest;
use sha1::Sha1;

use crate::error::CallError;
use crate::error::Result;

/// `javax.management.remote.rmi.RMIConnection` methods with an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteMethod {
    CreateMBean,
    GetObjectInstance,
    Invoke,
}

impl RemoteMethod {
    pub const ALL: [RemoteMethod; 3] = [
        RemoteMethod::CreateMBean,
        RemoteMethod::GetObjectInstance,
        RemoteMethod::Invoke,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RemoteMethod::CreateMBean => "createMBean",
            RemoteMethod::GetObjectInstance => "getObjectInstance",
            RemoteMethod::Invoke => "invoke",
        }
    }

    /// JVM method descriptor; every method ends with the delegation `Subject`.
    pub fn descriptor(self) -> &'static str {
        match self {
            RemoteMethod::CreateMBean => {
                "(Ljava/lang/String;Ljavax/management/ObjectName;Ljavax/security/auth/Subject;)Ljavax/management/ObjectInstance;"
            }
            RemoteMethod::GetObjectInstance => {
                "(Ljavax/management/ObjectName;Ljavax/security/auth/Subject;)Ljavax/management/ObjectInstance;"
            }
            RemoteMethod::Invoke => {
                "(Ljavax/management/ObjectName;Ljava/lang/String;Ljava/rmi/MarshalledObject;[Ljava/lang/String;Ljavax/security/auth/Subject;)Ljava/lang/Object;"
            }
        }
    }

    pub fn signature(self) -> String {
        format!("{}{}", self.name(), self.descriptor())
    }

    /// Hash observed on the wire from a real JMX client.
    pub fn known_hash(self) -> i64 {
        match self {
            RemoteMethod::CreateMBean => 2510753813974665446,
            RemoteMethod::GetObjectInstance => 6950095694996159938,
            RemoteMethod::Invoke => 1434350937885235744,
        }
    }
}

/// Strategy for obtaining a method's interface hash.
pub trait MethodHasher {
    fn method_hash(&self, method: RemoteMethod) -> Result<i64>;
}

/// Computes hashes from method signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct DigestHasher;

impl MethodHasher for DigestHasher {
    fn method_hash(&self, method: RemoteMethod) -> Result<i64> {
        hash_signature(&method.signature())
    }
}

/// Returns the recorded constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct KnownHasher;

impl MethodHasher for KnownHasher {
    fn method_hash(&self, method: RemoteMethod) -> Result<i64> {
        Ok(method.known_hash())
    }
}

/// Interface hash of an arbitrary `name(descriptor)` signature.
///
/// # Errors
/// Fails if the signature exceeds the `writeUTF` length limit.
pub fn hash_signature(signature: &str) -> Result<i64> {
    let utf = mutf8::encode(signature);
    if utf.len() > MAX_SHORT_UTF {
        return Err(jserial::Error::StringTooLong(utf.len()).into());
    }

    let mut hasher = Sha1::new();
    hasher.update((utf.len() as u16).to_be_bytes());
    hasher.update(&utf);
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    Ok(i64::from_le_bytes(head))
}

/// Checks a strategy against the recorded constants.
pub fn verify_hasher(hasher: &dyn MethodHasher) -> Result<()> {
    for method in RemoteMethod::ALL {
        let computed = hasher.method_hash(method)?;
        if computed != method.known_hash() {
            return Err(CallError::ProtocolConstantMismatch {
                method: method.name(),
                expected: method.known_hash(),
                computed,
            });
        }
    }
    Ok(())
}
