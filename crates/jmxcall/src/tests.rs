use crate::*;
use crate::frame::BLOCK_HEADER_SIZE;
use crate::frame::CALL_HEADER_SIZE;
use crate::frame::CALL_MESSAGE;
use crate::frame::NO_OPERATION;
use crate::frame::OBJ_ID_SIZE;
use crate::hash::hash_signature;
use crate::hash::verify_hasher;
use crate::marshal::marshal;
use jserial::ArrayData;
use jserial::Content;
use jserial::Data;
use jserial::Primitive;
use jserial::read_stream;
use jserial::types::STREAM_HEADER_SIZE;

type R<T> = Result<T>;

fn hex(s: &str) -> Vec<u8> {
    let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
        .collect()
}

fn target() -> CallTarget {
    CallTarget { object_number: 0x0102030405060708, uid_number: -2, uid_time: 0x1122334455667788, uid_count: 0x7fff }
}

// ============================================================================
//  FRAME LAYOUT
// ============================================================================

#[test]
fn test_header_layout() -> R<()> {
    let frame = create_mbean_stream(&CreateMBeanConfig::new("Foo").with_target(target()))?;
    let header = frame.header();

    assert_eq!(OBJ_ID_SIZE, 22);
    assert_eq!(CALL_HEADER_SIZE, 34);
    assert_eq!(&header[0..8], &0x0102030405060708i64.to_be_bytes());
    assert_eq!(&header[8..12], &(-2i32).to_be_bytes());
    assert_eq!(&header[12..20], &0x1122334455667788i64.to_be_bytes());
    assert_eq!(&header[20..22], &0x7fffi16.to_be_bytes());
    assert_eq!(&header[22..26], &NO_OPERATION.to_be_bytes());
    assert_eq!(&header[26..34], &RemoteMethod::CreateMBean.known_hash().to_be_bytes());
    assert_eq!(frame.operation(), -1);
    Ok(())
}

#[test]
fn test_call_data_prefix_and_length() -> R<()> {
    let frame = get_object_instance_stream(&GetObjectInstanceConfig::new("d:k=v"))?;
    let data = frame.call_data()?;

    assert_eq!(&data[0..4], &[0xac, 0xed, 0x00, 0x05]);
    assert_eq!(&data[4..6], &[0x77, 0x22]);
    assert_eq!(&data[6..40], &frame.header());

    // Everything past the metadata block is exactly the arguments.
    let args = frame.builder().serialize_stream(frame.arguments())?;
    assert_eq!(data.len(), STREAM_HEADER_SIZE + BLOCK_HEADER_SIZE + CALL_HEADER_SIZE + args.len() - 4);
    assert_eq!(&data[40..], &args[4..]);
    Ok(())
}

#[test]
fn test_encode_prepends_call_message() -> R<()> {
    let frame = create_mbean_stream(&CreateMBeanConfig::new("Foo"))?;
    let msg = frame.encode()?;
    assert_eq!(msg[0], CALL_MESSAGE);
    assert_eq!(&msg[1..], frame.call_data()?.as_slice());
    Ok(())
}

#[test]
fn test_encoding_is_deterministic() -> R<()> {
    let cfg = InvokeConfig::new("a:b=c", "run").arg("java.lang.String", "x");
    let frame = invoke_stream(&cfg)?;
    assert_eq!(frame.encode()?, frame.encode()?);
    assert_eq!(invoke_stream(&cfg)?.encode()?, frame.encode()?);
    Ok(())
}

// ============================================================================
//  GOLDEN STREAMS
// ============================================================================

#[test]
fn test_create_mbean_bytes() -> R<()> {
    let data = create_mbean_stream(&CreateMBeanConfig::new("Foo"))?.call_data()?;
    let expected = hex(
        "aced0005 7722
         0000000000000000 00000000 0000000000000000 0000 ffffffff 22d7fd4a906ac8e6
         74 0003 466f6f
         70
         70",
    );
    assert_eq!(data, expected);
    Ok(())
}

#[test]
fn test_get_object_instance_bytes() -> R<()> {
    let data = get_object_instance_stream(&GetObjectInstanceConfig::new("bean:type=Test"))?.call_data()?;
    let expected = hex(
        "aced0005 7722
         0000000000000000 00000000 0000000000000000 0000 ffffffff 6073b3361f37bdc2
         73 72 001b 6a617661782e6d616e6167656d656e742e4f626a6563744e616d65
            0f03a71beb6d15cf 03 0000 70 78 70
         74 000e 6265616e3a747970653d54657374
         78
         70",
    );
    assert_eq!(data, expected);
    Ok(())
}

#[test]
fn test_invoke_bytes() -> R<()> {
    let cfg = InvokeConfig::new("a:b=c", "run").arg("java.lang.String", "hello");
    let data = invoke_stream(&cfg)?.call_data()?;
    let expected = hex(
        "aced0005 7722
         0000000000000000 00000000 0000000000000000 0000 ffffffff 13e7d69417e5da20
         73 72 001b 6a617661782e6d616e6167656d656e742e4f626a6563744e616d65
            0f03a71beb6d15cf 03 0000 70 78 70
         74 0005 613a623d63
         78
         74 0003 72756e
         73 72 0019 6a6176612e726d692e4d61727368616c6c65644f626a656374
            7cbd1e97ed63fc3e 02 0003
            49 0004 68617368
            5b 0008 6c6f634279746573 74 0002 5b42
            5b 0008 6f626a4279746573 74 0002 5b42
            70 78 70
            726921c6
            70
            75 72 0002 5b42 acf317f8060854e0 02 0000 70 78 70 00000034
               aced0005
               75 72 0013 5b4c6a6176612e6c616e672e4f626a6563743b 90ce589f1073296c 02 0000 78 70
               00000001 74 0005 68656c6c6f
         75 72 0013 5b4c6a6176612e6c616e672e537472696e673b add256e7e91d7b47 02 0000 70 78 70
            00000001 74 0010 6a6176612e6c616e672e537472696e67
         70",
    );
    assert_eq!(data.len(), 324);
    assert_eq!(data, expected);
    Ok(())
}

// ============================================================================
//  METHOD HASHES
// ============================================================================

#[test]
fn test_digest_matches_known_constants() -> R<()> {
    for method in RemoteMethod::ALL {
        assert_eq!(DigestHasher.method_hash(method)?, KnownHasher.method_hash(method)?);
    }
    verify_hasher(&DigestHasher)?;
    verify_hasher(&KnownHasher)?;
    Ok(())
}

#[test]
fn test_known_hash_values() {
    assert_eq!(RemoteMethod::CreateMBean.known_hash(), 0x22d7fd4a906ac8e6);
    assert_eq!(RemoteMethod::GetObjectInstance.known_hash(), 0x6073b3361f37bdc2);
    assert_eq!(RemoteMethod::Invoke.known_hash(), 0x13e7d69417e5da20);
}

struct OffByOne;

impl MethodHasher for OffByOne {
    fn method_hash(&self, method: RemoteMethod) -> R<i64> {
        Ok(method.known_hash().wrapping_add(1))
    }
}

#[test]
fn test_verify_hasher_reports_mismatch() {
    let err = verify_hasher(&OffByOne).unwrap_err();
    assert_eq!(
        err,
        CallError::ProtocolConstantMismatch {
            method: "createMBean",
            expected: RemoteMethod::CreateMBean.known_hash(),
            computed: RemoteMethod::CreateMBean.known_hash().wrapping_add(1),
        }
    );
}

#[test]
fn test_custom_hasher_reaches_header() -> R<()> {
    let conn = ServerConnection::with_hasher(OffByOne);
    assert!(verify_hasher(conn.hasher()).is_err());
    let frame = conn.create_mbean_stream(&CreateMBeanConfig::new("Foo"))?;
    assert_eq!(frame.method_hash(), RemoteMethod::CreateMBean.known_hash().wrapping_add(1));
    Ok(())
}

#[test]
fn test_hash_signature_rejects_oversized_signature() {
    let long = "x".repeat(0x1_0000);
    assert_eq!(hash_signature(&long), Err(CallError::Serialization(jserial::Error::StringTooLong(0x1_0000))));
}

// ============================================================================
//  MARSHALLED ARGUMENTS
// ============================================================================

#[test]
fn test_marshal_empty_array() -> R<()> {
    let bytes = marshal(&[])?;
    let expected = hex(
        "aced0005
         75 72 0013 5b4c6a6176612e6c616e672e4f626a6563743b 90ce589f1073296c 02 0000 78 70
         00000000",
    );
    assert_eq!(bytes, expected);
    Ok(())
}

#[test]
fn test_invoke_without_args() -> R<()> {
    let frame = invoke_stream(&InvokeConfig::new("a:b=c", "stop"))?;
    let contents = read_stream(&frame.call_data()?)?;
    assert_eq!(contents.len(), 6);

    let wrapper = contents[3].as_object().unwrap();
    let Some(Data::Content(Content::Array(blob))) = wrapper.field("objBytes") else {
        panic!("objBytes is not an array");
    };
    let ArrayData::Bytes(nested) = &blob.elements else { panic!("objBytes is not a byte array") };
    assert_eq!(nested, &marshal(&[])?);

    let signature = contents[4].as_array().unwrap();
    assert_eq!(signature.class.name, "[Ljava.lang.String;");
    assert!(signature.elements.is_empty());
    Ok(())
}

#[test]
fn test_invoke_arguments_in_order() -> R<()> {
    let cfg = InvokeConfig::new("a:b=c", "run")
        .arg("java.lang.String", "one")
        .arg("java.lang.Object", "two");
    let frame = invoke_stream(&cfg)?;
    let contents = read_stream(&frame.call_data()?)?;

    let signature = contents[4].as_array().unwrap();
    let ArrayData::Contents(types) = &signature.elements else { panic!("signature is not a reference array") };
    let types: Vec<_> = types.iter().filter_map(Content::as_utf).collect();
    assert_eq!(types, ["java.lang.String", "java.lang.Object"]);

    let wrapper = contents[3].as_object().unwrap();
    assert_eq!(wrapper.field("hash"), Some(&Data::Primitive(Primitive::Int(1919492550))));
    assert_eq!(wrapper.field("locBytes"), Some(&Data::Content(Content::Null)));
    Ok(())
}

#[test]
fn test_unsupported_argument_names_parameter() {
    let cfg = InvokeConfig::new("a:b=c", "run")
        .arg("java.lang.String", "ok")
        .arg("int", ArgValue::Integer(3));
    let err = invoke_stream(&cfg).unwrap_err();
    assert_eq!(
        err,
        CallError::UnsupportedArgumentType { param_type: "int".into(), found: "integer".into() }
    );
    assert!(err.to_string().contains("int"));
}

#[test]
fn test_repeated_param_type_replaces_value() -> R<()> {
    let cfg = InvokeConfig::new("a:b=c", "run")
        .arg("java.lang.String", "first")
        .arg("java.lang.String", "second");
    assert_eq!(cfg.args.len(), 1);
    assert_eq!(cfg.args["java.lang.String"].as_utf(), Some("second"));
    Ok(())
}

// ============================================================================
//  ERRORS
// ============================================================================

#[test]
fn test_serialization_error_is_source() {
    use std::error::Error as _;
    let err = CallError::from(jserial::Error::UnexpectedEnd);
    assert!(err.source().is_some());
    assert!(CallError::UnsupportedArgumentType { param_type: "a".into(), found: "b".into() }.source().is_none());
}
