//! End-to-end tests: option records parsed from JSON, turned into call
//! messages, and read back with the stream decoder.

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use tracing_subscriber::EnvFilter;

use jmxcall::CallTarget;
use jmxcall::CreateMBeanConfig;
use jmxcall::GetObjectInstanceConfig;
use jmxcall::InvokeConfig;
use jmxcall::ServerConnection;
use jmxcall::KnownHasher;
use jmxcall::RemoteMethod;
use jserial::ArrayData;
use jserial::Content;
use jserial::Data;
use jserial::read_stream;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Decodes a `Call` message into its metadata block and argument contents.
fn split_call(msg: &[u8]) -> Result<(Vec<u8>, Vec<Content>)> {
    let (&kind, stream) = msg.split_first().context("empty message")?;
    if kind != 0x50 {
        bail!("not a call message: {:#04x}", kind);
    }
    let mut contents = read_stream(stream)?.into_iter();
    let Some(Content::BlockData(header)) = contents.next() else {
        bail!("call metadata missing");
    };
    Ok((header, contents.collect()))
}

#[test]
fn empty_record_uses_defaults() -> Result<()> {
    let cfg: InvokeConfig = serde_json::from_str("{}")?;
    assert_eq!(cfg.target, CallTarget::default());
    assert!(cfg.object.is_empty());
    assert!(cfg.method.is_empty());
    assert!(cfg.args.is_empty());

    let cfg: CreateMBeanConfig = serde_json::from_str("{}")?;
    assert_eq!(cfg, CreateMBeanConfig::default());
    Ok(())
}

#[test]
fn null_options_count_as_absent() -> Result<()> {
    let cfg: InvokeConfig = serde_json::from_str(
        r#"{ "object": null, "method": null, "args": null, "object_number": null, "uid_count": null }"#,
    )?;
    assert_eq!(cfg, InvokeConfig::default());

    let cfg: CreateMBeanConfig = serde_json::from_str(r#"{ "name": null, "uid_time": 5 }"#)?;
    assert_eq!(cfg.name, "");
    assert_eq!(cfg.target.uid_time, 5);

    let cfg: GetObjectInstanceConfig = serde_json::from_str(r#"{ "name": null }"#)?;
    assert_eq!(cfg, GetObjectInstanceConfig::default());

    let cfg: InvokeConfig = serde_json::from_str(r#"{ "args": { "java.lang.String": null } }"#)?;
    assert_eq!(cfg.args["java.lang.String"], jmxcall::ArgValue::Null);
    Ok(())
}

#[test]
fn default_records_encode() -> Result<()> {
    init_tracing();
    let zero_id = [0u8; 22];

    let cfg: CreateMBeanConfig = serde_json::from_str("{}")?;
    let (header, args) = split_call(&jmxcall::create_mbean_stream(&cfg)?.encode()?)?;
    assert_eq!(&header[..22], &zero_id);
    assert_eq!(args, vec![Content::Utf(String::new()), Content::Null, Content::Null]);

    let cfg: GetObjectInstanceConfig = serde_json::from_str("{}")?;
    assert_eq!(cfg, GetObjectInstanceConfig::default());
    let (header, args) = split_call(&jmxcall::get_object_instance_stream(&cfg)?.encode()?)?;
    assert_eq!(&header[..22], &zero_id);
    let name = args[0].as_object().context("ObjectName missing")?;
    assert_eq!(name.custom_data, vec![Content::Utf(String::new())]);
    assert_eq!(args[1], Content::Null);

    let (header, args) = split_call(&jmxcall::invoke_stream(&InvokeConfig::default())?.encode()?)?;
    assert_eq!(&header[..22], &zero_id);
    assert_eq!(args.len(), 5);
    let name = args[0].as_object().context("ObjectName missing")?;
    assert_eq!(name.custom_data, vec![Content::Utf(String::new())]);
    assert_eq!(args[1], Content::Utf(String::new()));

    let wrapper = args[2].as_object().context("MarshalledObject missing")?;
    let Some(Data::Content(Content::Array(blob))) = wrapper.field("objBytes") else {
        bail!("objBytes missing");
    };
    let ArrayData::Bytes(nested) = &blob.elements else { bail!("objBytes is not a byte array") };
    let inner = read_stream(nested)?;
    let params = inner[0].as_array().context("parameter array missing")?;
    assert_eq!(params.class.name, "[Ljava.lang.Object;");
    assert!(params.elements.is_empty());

    let signature = args[3].as_array().context("signature missing")?;
    assert_eq!(signature.class.name, "[Ljava.lang.String;");
    assert!(signature.elements.is_empty());
    assert_eq!(args[4], Content::Null);
    Ok(())
}

#[test]
fn record_fields_and_unknown_keys() -> Result<()> {
    let cfg: GetObjectInstanceConfig = serde_json::from_str(
        r#"{ "object_number": 7, "uid_number": 1, "uid_time": 2, "uid_count": 3,
             "name": "d:k=v", "color": "blue" }"#,
    )?;
    assert_eq!(cfg.name, "d:k=v");
    assert_eq!(cfg.target, CallTarget { object_number: 7, uid_number: 1, uid_time: 2, uid_count: 3 });
    Ok(())
}

#[test]
fn create_mbean_roundtrip() -> Result<()> {
    init_tracing();
    let cfg: CreateMBeanConfig = serde_json::from_str(r#"{ "name": "com.example.Loader", "object_number": 9 }"#)?;
    let msg = jmxcall::create_mbean_stream(&cfg)?.encode()?;

    let (header, args) = split_call(&msg)?;
    assert_eq!(header.len(), 34);
    assert_eq!(&header[0..8], &9i64.to_be_bytes());
    assert_eq!(&header[26..34], &RemoteMethod::CreateMBean.known_hash().to_be_bytes());
    assert_eq!(args, vec![Content::Utf("com.example.Loader".into()), Content::Null, Content::Null]);
    Ok(())
}

#[test]
fn get_object_instance_roundtrip() -> Result<()> {
    init_tracing();
    let msg = jmxcall::get_object_instance_stream(&GetObjectInstanceConfig::new("DefaultDomain:type=Foo"))?.encode()?;

    let (_, args) = split_call(&msg)?;
    assert_eq!(args.len(), 2);
    let name = args[0].as_object().context("ObjectName missing")?;
    assert_eq!(name.class.name, "javax.management.ObjectName");
    assert_eq!(name.class.serial_uid, 0x0f03a71beb6d15cf);
    assert_eq!(name.class.flags, 0x03);
    assert_eq!(name.custom_data, vec![Content::Utf("DefaultDomain:type=Foo".into())]);
    assert_eq!(args[1], Content::Null);
    Ok(())
}

#[test]
fn invoke_roundtrip_with_nested_stream() -> Result<()> {
    init_tracing();
    let cfg: InvokeConfig = serde_json::from_str(
        r#"{ "object": "DefaultDomain:type=Foo", "method": "run",
             "args": { "java.lang.String": "hello", "java.lang.Object": "world" } }"#,
    )?;
    let msg = jmxcall::invoke_stream(&cfg)?.encode()?;

    let (header, args) = split_call(&msg)?;
    assert_eq!(&header[26..34], &RemoteMethod::Invoke.known_hash().to_be_bytes());
    assert_eq!(args.len(), 5);
    assert_eq!(args[1].as_utf(), Some("run"));

    let wrapper = args[2].as_object().context("MarshalledObject missing")?;
    assert_eq!(wrapper.class.name, "java.rmi.MarshalledObject");
    let Some(Data::Content(Content::Array(blob))) = wrapper.field("objBytes") else {
        bail!("objBytes missing");
    };
    let ArrayData::Bytes(nested) = &blob.elements else { bail!("objBytes is not a byte array") };

    let inner = read_stream(nested)?;
    let params = inner[0].as_array().context("parameter array missing")?;
    assert_eq!(params.class.name, "[Ljava.lang.Object;");
    assert!(params.class.annotations.is_empty());
    let ArrayData::Contents(values) = &params.elements else { bail!("parameters are not references") };
    assert_eq!(values, &vec![Content::Utf("hello".into()), Content::Utf("world".into())]);

    let signature = args[3].as_array().context("signature missing")?;
    let ArrayData::Contents(types) = &signature.elements else { bail!("signature is not references") };
    assert_eq!(types, &vec![Content::Utf("java.lang.String".into()), Content::Utf("java.lang.Object".into())]);
    assert_eq!(args[4], Content::Null);
    Ok(())
}

#[test]
fn known_and_computed_hashes_encode_identically() -> Result<()> {
    let cfg = InvokeConfig::new("a:b=c", "run").arg("java.lang.String", "x");
    let computed = jmxcall::invoke_stream(&cfg)?.encode()?;
    let known = ServerConnection::with_hasher(KnownHasher).invoke_stream(&cfg)?.encode()?;
    assert_eq!(computed, known);
    Ok(())
}

#[test]
fn non_string_argument_is_rejected() -> Result<()> {
    let cfg: InvokeConfig = serde_json::from_str(r#"{ "method": "run", "args": { "boolean": true } }"#)?;
    let err = jmxcall::invoke_stream(&cfg).unwrap_err();
    assert!(err.to_string().contains("boolean"));
    Ok(())
}
