//! # jmxcall
//!
//! Byte-accurate RMI call streams for the `javax.management.remote.rmi.RMIConnection`
//! methods a JMX client uses to load and drive an MBean.
//!
//! ## Architecture
//!
//! - **Config**: one serde record per call (`CreateMBeanConfig`,
//!   `GetObjectInstanceConfig`, `InvokeConfig`), all fields defaulted.
//! - **Connection**: `ServerConnection` turns a record into a `CallFrame`,
//!   building the argument objects in a fresh `jserial::Builder`.
//! - **Frame**: a `CallFrame` encodes to the transport `Call` message.
//! - **Hash**: method hashes come from a `MethodHasher`, computed by default.
//!
//! ## Example
//!
//! ```no_run
//! use jmxcall::InvokeConfig;
//!
//! let cfg = InvokeConfig::new("DefaultDomain:type=Loader", "run")
//!     .arg("java.lang.String", "payload");
//! let bytes = jmxcall::invoke_stream(&cfg)?.encode()?;
//! # Ok::<(), jmxcall::CallError>(())
//! ```

pub mod classes;
pub mod config;
pub mod error;
pub mod frame;
pub mod hash;
pub mod marshal;
pub mod mbean;

pub use error::CallError;
pub use error::Result;

pub use config::ArgValue;
pub use config::CallTarget;
pub use config::CreateMBeanConfig;
pub use config::GetObjectInstanceConfig;
pub use config::InvokeConfig;

pub use frame::CallFrame;
pub use frame::ObjId;
pub use frame::UniqueId;

pub use hash::DigestHasher;
pub use hash::KnownHasher;
pub use hash::MethodHasher;
pub use hash::RemoteMethod;

pub use mbean::ServerConnection;

/// `createMBean` on the default connection.
pub fn create_mbean_stream(cfg: &CreateMBeanConfig) -> Result<CallFrame> {
    ServerConnection::new().create_mbean_stream(cfg)
}

/// `getObjectInstance` on the default connection.
pub fn get_object_instance_stream(cfg: &GetObjectInstanceConfig) -> Result<CallFrame> {
    ServerConnection::new().get_object_instance_stream(cfg)
}

/// `invoke` on the default connection.
pub fn invoke_stream(cfg: &InvokeConfig) -> Result<CallFrame> {
    ServerConnection::new().invoke_stream(cfg)
}

#[cfg(test)]
mod tests;
