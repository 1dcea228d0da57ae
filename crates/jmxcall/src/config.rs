//! # Call Configuration
//!
//! One record per call type. Every field has a default, so a partial option
//! record (or none at all) still produces a call; unknown keys are ignored
//! and an explicit `null` counts as absent.

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Deserializer;

use crate::frame::ObjId;
use crate::frame::UniqueId;

/// Which exported object receives the call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CallTarget {
    #[serde(deserialize_with = "null_as_default")]
    pub object_number: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub uid_number: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub uid_time: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub uid_count: i16,
}

impl CallTarget {
    pub fn obj_id(&self) -> ObjId {
        ObjId::new(
            self.object_number,
            UniqueId { number: self.uid_number, time: self.uid_time, count: self.uid_count },
        )
    }
}

impl From<ObjId> for CallTarget {
    fn from(id: ObjId) -> Self {
        Self {
            object_number: id.object_number,
            uid_number: id.uid.number,
            uid_time: id.uid.time,
            uid_count: id.uid.count,
        }
    }
}

fn null_as_default<'de, D, T>(de: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

/// An `invoke` argument as it appears in an option record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    Null,
}

impl ArgValue {
    pub fn as_utf(&self) -> Option<&str> {
        match self {
            ArgValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::String(_) => "string",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Integer(_) => "integer",
            ArgValue::Float(_) => "float",
            ArgValue::Null => "null",
        }
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CreateMBeanConfig {
    #[serde(flatten)]
    pub target: CallTarget,
    /// Class name of the MBean to instantiate.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

impl CreateMBeanConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_target(mut self, target: CallTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GetObjectInstanceConfig {
    #[serde(flatten)]
    pub target: CallTarget,
    /// Object name of the MBean, e.g. `DefaultDomain:type=Foo`.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

impl GetObjectInstanceConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn with_target(mut self, target: CallTarget) -> Self {
        self.target = target;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct InvokeConfig {
    #[serde(flatten)]
    pub target: CallTarget,
    /// Object name of the MBean whose operation is invoked.
    #[serde(deserialize_with = "null_as_default")]
    pub object: String,
    /// Operation name.
    #[serde(deserialize_with = "null_as_default")]
    pub method: String,
    /// Parameter type name to argument value, in signature order.
    #[serde(deserialize_with = "null_as_default")]
    pub args: IndexMap<String, ArgValue>,
}

impl InvokeConfig {
    pub fn new(object: impl Into<String>, method: impl Into<String>) -> Self {
        Self { object: object.into(), method: method.into(), ..Self::default() }
    }

    pub fn with_target(mut self, target: CallTarget) -> Self {
        self.target = target;
        self
    }

    /// Appends a parameter; a repeated type name replaces the earlier value
    /// in place.
    pub fn arg(mut self, param_type: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args.insert(param_type.into(), value.into());
        self
    }
}
