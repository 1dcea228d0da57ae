//! # MBean Server Calls
//!
//! Builds the argument lists a Java JMX client sends for each supported
//! `RMIConnection` method. Every method takes a trailing delegation
//! `Subject`, which is always null here.
//!
//! An `ObjectName` argument is written the way its `writeObject` writes it:
//! the object carries no field data, and the canonical name string followed
//! by `TC_ENDBLOCKDATA` come right after it in the stream.

use jserial::Builder;
use jserial::Elements;
use jserial::FieldType;
use jserial::Value;
use jserial::types::SC_SERIALIZABLE;
use jserial::types::SC_WRITE_METHOD;
use tracing::debug;

use crate::classes;
use crate::config::CreateMBeanConfig;
use crate::config::GetObjectInstanceConfig;
use crate::config::InvokeConfig;
use crate::error::Result;
use crate::frame::CallFrame;
use crate::frame::ObjId;
use crate::frame::assemble;
use crate::hash::DigestHasher;
use crate::hash::MethodHasher;
use crate::hash::RemoteMethod;
use crate::marshal::marshal_args;
use crate::marshal::marshalled_object;

/// Call-stream factory for one `RMIConnection`, parameterised by how method
/// hashes are obtained.
#[derive(Debug, Clone, Default)]
pub struct ServerConnection<H = DigestHasher> {
    hasher: H,
}

impl ServerConnection<DigestHasher> {
    pub fn new() -> Self {
        Self { hasher: DigestHasher }
    }
}

impl<H: MethodHasher> ServerConnection<H> {
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// `createMBean(String className, ObjectName name, Subject delegationSubject)`
    pub fn create_mbean_stream(&self, cfg: &CreateMBeanConfig) -> Result<CallFrame> {
        let arguments = vec![Value::utf(cfg.name.as_str()), Value::Null, Value::Null];
        self.call(RemoteMethod::CreateMBean, cfg.target.obj_id(), Builder::new(), arguments)
    }

    /// `getObjectInstance(ObjectName name, Subject delegationSubject)`
    pub fn get_object_instance_stream(&self, cfg: &GetObjectInstanceConfig) -> Result<CallFrame> {
        let mut builder = Builder::new();
        let object_name = new_object_name(&mut builder)?;

        let arguments = vec![
            object_name,
            Value::utf(cfg.name.as_str()),
            Value::EndBlockData,
            Value::Null,
        ];
        self.call(RemoteMethod::GetObjectInstance, cfg.target.obj_id(), builder, arguments)
    }

    /// `invoke(ObjectName name, String operationName, MarshalledObject params,
    /// String[] signature, Subject delegationSubject)`
    ///
    /// `cfg.args` supplies both: its keys become `signature`, its values are
    /// marshalled into `params`.
    pub fn invoke_stream(&self, cfg: &InvokeConfig) -> Result<CallFrame> {
        let params = marshal_args(&cfg.args)?;

        let mut builder = Builder::new();
        let object_name = new_object_name(&mut builder)?;
        let marshalled = marshalled_object(&mut builder, params)?;
        let signature = builder.build_array(
            classes::STRING_ARRAY_CLASS,
            classes::STRING_ARRAY_UID,
            FieldType::Object(classes::STRING_SIGNATURE.into()),
            Elements::Values(cfg.args.keys().map(|k| Value::utf(k.as_str())).collect()),
            None,
        )?;

        let arguments = vec![
            object_name,
            Value::utf(cfg.object.as_str()),
            Value::EndBlockData,
            Value::utf(cfg.method.as_str()),
            marshalled,
            signature,
            Value::Null,
        ];
        self.call(RemoteMethod::Invoke, cfg.target.obj_id(), builder, arguments)
    }

    fn call(
        &self,
        method: RemoteMethod,
        obj_id: ObjId,
        builder: Builder,
        arguments: Vec<Value>,
    ) -> Result<CallFrame> {
        let hash = self.hasher.method_hash(method)?;
        debug!(method = method.name(), hash, arguments = arguments.len(), "built call");
        Ok(assemble(obj_id, hash, builder, arguments))
    }
}

/// A `javax.management.ObjectName` with no field data; its name must follow.
fn new_object_name(builder: &mut Builder) -> Result<Value> {
    let value = builder.build_object(
        classes::OBJECT_NAME_CLASS,
        classes::OBJECT_NAME_UID,
        SC_SERIALIZABLE | SC_WRITE_METHOD,
        Vec::new(),
        Vec::new(),
    )?;
    Ok(value)
}
