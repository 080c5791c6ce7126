//! JSON text ⇄ MessagePack through the serde bridge.
//!
//! JSON carries one numeric type, so every number is routed through f64 and
//! classified unsigned → signed → float.  The precision cases below pin the
//! documented behaviour past 2^53.

use msgpack_json::{
    decode_all, json_to_msgpack, msgpack_to_json, parse_json, to_json_string, Encoder, Value,
};

fn encoder() -> Encoder {
    Encoder::new("binary_data").unwrap()
}

fn j2m(json: &str) -> Vec<u8> {
    json_to_msgpack(&encoder(), json.as_bytes()).unwrap()
}

fn m2j(bytes: &[u8]) -> String {
    String::from_utf8(msgpack_to_json(bytes).unwrap()).unwrap()
}

// ── Numbers ─────────────────────────────────────────────────

#[test]
fn json_numbers_pick_canonical_tags() {
    assert_eq!(j2m("0"), vec![0x00]);
    assert_eq!(j2m("1"), vec![0x01]);
    assert_eq!(j2m("127"), vec![0x7f]);
    assert_eq!(j2m("128"), vec![0xcc, 0x80]);
    assert_eq!(j2m("-1"), vec![0xff]);
    assert_eq!(j2m("-32"), vec![0xe0]);
    assert_eq!(j2m("-33"), vec![0xd0, 0xdf]);
    assert_eq!(j2m("1.5"), vec![0xca, 0x3f, 0xc0, 0x00, 0x00]);
    assert_eq!(
        j2m("1.23"),
        vec![0xcb, 0x3f, 0xf3, 0xae, 0x14, 0x7a, 0xe1, 0x47, 0xae]
    );
}

#[test]
fn integral_json_floats_are_integers() {
    // The token is irrelevant; only the f64 value is.
    assert_eq!(j2m("1.0"), vec![0x01]);
    assert_eq!(j2m("1e2"), vec![0x64]);
    assert_eq!(j2m("-0"), vec![0x00]);
    assert_eq!(j2m("-2.0"), vec![0xfe]);
}

#[test]
fn precision_is_exact_up_to_2_pow_53() {
    let bytes = j2m("9007199254740992");
    assert_eq!(bytes, vec![0xcf, 0x00, 0x20, 0, 0, 0, 0, 0, 0]);
    assert_eq!(m2j(&bytes), "9007199254740992");
}

#[test]
fn precision_past_2_pow_53_is_lost_in_the_json_bridge() {
    // 2^53 + 1 has no f64 representation and reads as 2^53.
    let bytes = j2m("9007199254740993");
    assert_eq!(m2j(&bytes), "9007199254740992");

    // 2^53 + 2 is even and happens to be representable, so it survives.
    assert_eq!(m2j(&j2m("9007199254740994")), "9007199254740994");

    // Past u64 range the number is no longer an integer at all.
    assert_eq!(j2m("18446744073709551616")[0], 0xca);
}

#[test]
fn wire_integers_beyond_2_pow_53_serialize_exactly() {
    // Values that never pass through JSON keep full precision.
    let bytes = [0xcf, 0x00, 0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01];
    assert_eq!(m2j(&bytes), "9007199254740993");
}

// ── Structure ───────────────────────────────────────────────

#[test]
fn map_decodes_to_json_object() {
    assert_eq!(m2j(&[0x81, 0xa3, b'k', b'e', b'y', 0x01]), r#"{"key":1}"#);
}

#[test]
fn scalars_and_containers_round_trip() {
    let json = r#"{"a":[1,"test",true,null,-7,2.5],"b":{},"c":[]}"#;
    assert_eq!(m2j(&j2m(json)), json);
}

#[test]
fn object_key_order_is_preserved() {
    let json = r#"{"z":1,"a":2,"m":3}"#;
    assert_eq!(m2j(&j2m(json)), json);
}

#[test]
fn duplicate_json_keys_keep_last_value() {
    let v = parse_json(br#"{"a":1,"b":2,"a":3}"#).unwrap();
    assert_eq!(to_json_string(&v).unwrap(), r#"{"a":3,"b":2}"#);
}

#[test]
fn wide_json_objects_parse_in_linear_time() {
    let n = 100_000;
    let mut json = String::from("{");
    for i in 0..n {
        json.push_str(&format!("\"k{}\":{},", i, i));
    }
    // Repeat the first key at the end: first position, last value.
    json.push_str("\"k0\":-1}");

    let Value::Map(entries) = parse_json(json.as_bytes()).unwrap() else {
        panic!("expected map");
    };
    assert_eq!(entries.len(), n);
    assert_eq!(entries[0].0, "k0");
    assert!(matches!(entries[0].1, Value::Int(-1)));
    assert!(matches!(entries[n - 1].1, Value::UInt(x) if x == (n - 1) as u64));

    let bytes = j2m(&json);
    assert_eq!(&bytes[..5], &[0xdf, 0x00, 0x01, 0x86, 0xa0]);
}

#[test]
fn float32_prints_with_single_precision() {
    assert_eq!(m2j(&[0xca, 0x3f, 0x8c, 0xcc, 0xcd]), "1.1");
}

#[test]
fn non_finite_floats_print_as_null() {
    let nan = [0xcb, 0x7f, 0xf8, 0, 0, 0, 0, 0, 0];
    assert_eq!(m2j(&nan), "null");
}

#[test]
fn trailing_bytes_are_rejected_for_whole_documents() {
    let err = msgpack_to_json(&[0xc0, 0xc0]).unwrap_err();
    assert_eq!(err.code(), "TrailingBytes");
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = json_to_msgpack(&encoder(), b"{\"a\":").unwrap_err();
    assert_eq!(err.code(), "Json");
}

// ── Binary field ────────────────────────────────────────────

#[test]
fn binary_field_round_trips_to_the_same_base64() {
    let json = r#"{"name":"blob","binary_data":"SGVsbG8sIHdvcmxkIQ=="}"#;
    let bytes = j2m(json);

    let value = decode_all(&bytes).unwrap();
    assert_eq!(
        value.get("binary_data"),
        Some(&Value::Bin(b"Hello, world!".to_vec()))
    );
    assert_eq!(m2j(&bytes), json);
}

#[test]
fn binary_field_with_bad_base64_fails_the_whole_conversion() {
    let err = json_to_msgpack(&encoder(), br#"{"ok":1,"binary_data":"@@@"}"#).unwrap_err();
    assert_eq!(err.code(), "BinaryDataInvalid");
}

#[test]
fn bin_decoded_from_any_key_serializes_as_base64() {
    // The decoder needs no configuration; bin is tagged on the wire.
    let bytes = [0x81, 0xa1, b'x', 0xc4, 0x02, 0xff, 0x00];
    assert_eq!(m2j(&bytes), r#"{"x":"/wA="}"#);
}

// ── A realistic document ────────────────────────────────────

const PROFILE: &str = r#"{
    "_id": "66a0d3af2f64df4a43dc28ca",
    "index": 0,
    "guid": "4b984e02-fd5c-49f9-8659-5639c242a866",
    "isActive": true,
    "balance": "$1,135.79",
    "age": 34,
    "eyeColor": "blue",
    "name": "Cline Maddox",
    "about": "Irure irure nostrud officia duis nulla laborum ipsum non qui nulla cupidatat exercitation dolore.\r\n",
    "registered": "2015-10-09T08:57:58 -08:00",
    "latitude": 84.989192,
    "longitude": -113.638803,
    "tags": ["cupidatat", "in", "magna", "deserunt", "duis", "elit", "reprehenderit"],
    "friends": [
        {"id": 0, "name": "Floyd Stone"},
        {"id": 1, "name": "Kirby Pearson"},
        {"id": 2, "name": "Jane Chapman"}
    ],
    "binary_data": "AAECAwQFBgcICQ==",
    "greeting": "Hello, Cline Maddox! You have 10 unread messages.",
    "favoriteFruit": "strawberry"
}"#;

#[test]
fn profile_document_survives_the_round_trip() {
    let original = parse_json(PROFILE.as_bytes()).unwrap();
    let bytes = j2m(PROFILE);

    // 17 top-level keys → map16.
    assert_eq!(&bytes[..3], &[0xde, 0x00, 0x11]);

    let decoded = decode_all(&bytes).unwrap();
    assert_eq!(decoded.get("binary_data"), Some(&Value::Bin((0..10).collect())));
    assert!(matches!(decoded.get("age"), Some(Value::UInt(34))));
    assert!(matches!(decoded.get("longitude"), Some(Value::Float64(x)) if *x == -113.638803));

    // Re-serialized JSON parses back to the same tree.
    let json = msgpack_to_json(&bytes).unwrap();
    assert_eq!(parse_json(&json).unwrap(), original);
}

#[test]
fn serde_json_sees_the_same_document() {
    let bytes = j2m(PROFILE);
    let json = msgpack_to_json(&bytes).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(parsed["friends"][1]["name"], "Kirby Pearson");
    assert_eq!(parsed["binary_data"], "AAECAwQFBgcICQ==");
    assert_eq!(parsed["tags"].as_array().map(|t| t.len()), Some(7));
}
