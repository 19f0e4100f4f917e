//! Decoding messages produced by prost, the reference encoder.

use pbsift_core::{decode, DecodeError, Decoder, DecoderConfig, Payload};
use pretty_assertions::assert_eq;
use prost::encoding::{encode_key, encode_varint, WireType};
use prost::Message;

#[derive(Clone, PartialEq, Message)]
struct Sample {
    #[prost(int32, tag = "1")]
    int32_1: i32,
    #[prost(int32, tag = "2")]
    int32_2: i32,
    #[prost(int32, tag = "3")]
    int32_3: i32,
    #[prost(string, tag = "4")]
    string_1: String,
    #[prost(string, optional, tag = "6")]
    string_3: Option<String>,
    #[prost(string, repeated, tag = "7")]
    array: Vec<String>,
    #[prost(message, repeated, tag = "8")]
    items: Vec<Item>,
}

#[derive(Clone, PartialEq, Message)]
struct Item {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(int32, tag = "2")]
    value: i32,
}

#[derive(Clone, PartialEq, Message)]
struct Node {
    #[prost(message, optional, boxed, tag = "1")]
    child: Option<Box<Node>>,
    #[prost(int64, tag = "2")]
    value: i64,
}

fn render(data: &[u8]) -> String {
    let mut out = Vec::new();
    let report = decode(data, &mut out).unwrap();
    assert!(report.is_complete(), "stopped: {:?}", report.stopped);
    String::from_utf8(out).unwrap()
}

#[test]
fn test_sample_message() {
    let sample = Sample {
        int32_1: 1,
        int32_2: -1024,
        int32_3: 123_456_789,
        string_1: "test_string_1".to_string(),
        string_3: Some(String::new()),
        array: vec!["array1".to_string(), "array2".to_string()],
        items: vec![Item {
            name: "struct_string".to_string(),
            value: 520,
        }],
    };

    let expected = [
        "pb_1 : 1",
        "pb_2 : -1024",
        "pb_3 : 123456789",
        "pb_4 : test_string_1",
        "pb_6 : ",
        "pb_7 : array1",
        "pb_7 : array2",
        "pb_8_1 : struct_string",
        "pb_8_2 : 520",
    ]
    .map(|line| format!("{}\n", line))
    .concat();
    assert_eq!(render(&sample.encode_to_vec()), expected);
}

#[test]
fn test_single_varint_every_field_number() {
    let values = [0i64, 1, 150, 300, -1, -1024, i64::MIN, i64::MAX];

    for field_number in 1..=512u32 {
        for &value in &values {
            let mut buf = Vec::new();
            encode_key(field_number, WireType::Varint, &mut buf);
            encode_varint(value as u64, &mut buf);

            assert_eq!(render(&buf), format!("pb_{} : {}\n", field_number, value));
        }
    }
}

#[test]
fn test_fixed_width_values() {
    let mut buf = Vec::new();
    encode_key(1, WireType::SixtyFourBit, &mut buf);
    buf.extend_from_slice(&(-5i64).to_le_bytes());
    encode_key(2, WireType::ThirtyTwoBit, &mut buf);
    buf.extend_from_slice(&(-7i32).to_le_bytes());
    encode_key(3, WireType::ThirtyTwoBit, &mut buf);
    buf.extend_from_slice(&u32::MAX.to_le_bytes());

    assert_eq!(render(&buf), "pb_1 : -5\npb_2 : -7\npb_3 : -1\n");
}

#[test]
fn test_nested_nodes() {
    let tree = Node {
        value: 1,
        child: Some(Box::new(Node {
            value: 2,
            child: Some(Box::new(Node {
                value: 3,
                child: None,
            })),
        })),
    };

    assert_eq!(
        render(&tree.encode_to_vec()),
        "pb_1_1_2 : 3\npb_1_2 : 2\npb_2 : 1\n"
    );
}

#[test]
fn test_file_descriptor() {
    use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto};

    let file = FileDescriptorProto {
        name: Some("a.proto".to_string()),
        package: Some("pkg".to_string()),
        message_type: vec![DescriptorProto {
            name: Some("Msg".to_string()),
            field: vec![FieldDescriptorProto {
                name: Some("id".to_string()),
                number: Some(1),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    };

    let expected = "\
pb_1 : a.proto
pb_2 : pkg
pb_4_1 : Msg
pb_4_2_1 : id
pb_4_2_3 : 1
";
    assert_eq!(render(&file.encode_to_vec()), expected);
}

#[test]
fn test_prefix_with_remainder_is_printed_verbatim() {
    let mut payload = Vec::new();
    encode_key(1, WireType::Varint, &mut payload);
    encode_varint(1, &mut payload);
    payload.push(0x00);

    let mut buf = Vec::new();
    encode_key(5, WireType::LengthDelimited, &mut buf);
    encode_varint(payload.len() as u64, &mut buf);
    buf.extend_from_slice(&payload);

    let mut out = Vec::new();
    decode(&buf, &mut out).unwrap();

    let mut expected = b"pb_5 : ".to_vec();
    expected.extend_from_slice(&payload);
    expected.push(b'\n');
    assert_eq!(out, expected);
}

#[test]
fn test_tree_matches_encoded_structure() {
    let sample = Sample {
        int32_1: 7,
        items: vec![
            Item {
                name: "struct_string".to_string(),
                value: 1,
            },
            Item {
                name: String::new(),
                value: 2,
            },
        ],
        ..Default::default()
    };
    let data = sample.encode_to_vec();

    let (fields, stopped) = Decoder::new().decode_fields(&data);
    assert_eq!(stopped, None);
    assert_eq!(
        fields.iter().map(|f| f.field_number).collect::<Vec<_>>(),
        vec![1, 8, 8]
    );
    assert_eq!(fields[0].as_number(), Some(7));

    let first = fields[1].children();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].raw_bytes(), Some(&b"struct_string"[..]));
    assert_eq!(first[1].as_number(), Some(1));
    assert!(first.iter().all(|f| f.depth == 1));

    // an Item with only `value` set is a valid message on its own
    let second = fields[2].children();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].field_number, 2);
}

#[test]
fn test_empty_string_is_never_a_message() {
    let sample = Sample {
        string_3: Some(String::new()),
        ..Default::default()
    };
    let data = sample.encode_to_vec();
    let (fields, _) = Decoder::new().decode_fields(&data);
    assert_eq!(
        fields[0].payload,
        Payload::Bytes {
            raw: &[],
            rejection: None
        }
    );
}

#[test]
fn test_garbage_after_valid_fields_stops_output() {
    let mut buf = Item {
        name: "struct_string".to_string(),
        value: 42,
    }
    .encode_to_vec();
    // field 0 tag, then bytes that would otherwise decode fine
    buf.extend_from_slice(&[0x00, 0x08, 0x01]);

    let mut out = Vec::new();
    let report = decode(&buf, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "pb_1 : struct_string\npb_2 : 42\n"
    );
    assert_eq!(report.fields, 2);
    assert!(matches!(
        report.stopped,
        Some(DecodeError::InvalidFieldNumber { number: 0, .. })
    ));
}

#[test]
fn test_depth_cap_on_deep_input() {
    let mut node = Node {
        value: 9,
        child: None,
    };
    for value in 1..=20 {
        node = Node {
            value,
            child: Some(Box::new(node)),
        };
    }
    let data = node.encode_to_vec();

    let decoder = Decoder::with_config(DecoderConfig::new().max_depth(4));
    let (fields, stopped) = decoder.decode_fields(&data);
    assert_eq!(stopped, None);

    let mut field = &fields[0];
    let mut depth = 0;
    while !field.is_leaf() {
        field = &field.children()[0];
        depth += 1;
    }
    assert_eq!(depth, 4);
    assert!(matches!(
        field.rejection(),
        Some(DecodeError::DepthLimitExceeded { depth: 4, max: 4, .. })
    ));
}
