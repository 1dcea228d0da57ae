//! Java classes that appear in `RMIConnection` call streams, with the
//! `serialVersionUID`s their JDK implementations declare.

pub const OBJECT_NAME_CLASS: &str = "javax.management.ObjectName";
pub const OBJECT_NAME_UID: u64 = 0x0f03_a71b_eb6d_15cf;

pub const MARSHALLED_OBJECT_CLASS: &str = "java.rmi.MarshalledObject";
pub const MARSHALLED_OBJECT_UID: u64 = 0x7cbd_1e97_ed63_fc3e;
/// `hash` field value of the wrapper, as JDK clients send it.
pub const MARSHALLED_OBJECT_HASH: i32 = 1_919_492_550;

pub const BYTE_ARRAY_CLASS: &str = "[B";
pub const BYTE_ARRAY_UID: u64 = 0xacf3_17f8_0608_54e0;

pub const STRING_ARRAY_CLASS: &str = "[Ljava.lang.String;";
pub const STRING_ARRAY_UID: u64 = 0xadd2_56e7_e91d_7b47;
pub const STRING_SIGNATURE: &str = "Ljava/lang/String;";

pub const OBJECT_ARRAY_CLASS: &str = "[Ljava.lang.Object;";
pub const OBJECT_ARRAY_UID: u64 = 0x90ce_589f_1073_296c;
pub const OBJECT_SIGNATURE: &str = "Ljava/lang/Object;";
