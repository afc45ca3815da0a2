//! Shaper integration tests
//!
//! Covers the binary layout bit-for-bit, shape identity, reserved-attribute
//! stripping, round-trips over the supported value subset and the accessor
//! path machinery.

use std::sync::Arc;

use vellum_core::{Value, VellumError};
use vellum_shaper::{basic, DictionaryListener, Extraction, Shaper, ShapedDocument};

fn obj(fields: &[(&str, Value)]) -> Value {
    Value::object(
        fields
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone())),
    )
}

// ============================================================================
// Binary layout
// ============================================================================

#[test]
fn test_number_document_layout() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&Value::Number(1.0), true).unwrap();
    assert_eq!(shaped.shape_id, basic::NUMBER);
    assert_eq!(shaped.bytes, 1.0f64.to_le_bytes());
}

#[test]
fn test_bool_and_null_layout() {
    let shaper = Shaper::new();
    let t = shaper.encode(&Value::Bool(true), true).unwrap();
    assert_eq!((t.shape_id, t.bytes.as_slice()), (basic::BOOLEAN, &[1u8][..]));

    let n = shaper.encode(&Value::Null, true).unwrap();
    assert_eq!((n.shape_id, n.bytes.len()), (basic::NULL, 0));
}

#[test]
fn test_short_string_layout() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&Value::from("hi"), true).unwrap();
    assert_eq!(shaped.shape_id, basic::SHORT_STRING);
    // one length byte (counting the NUL), payload, NUL, zero padding to 9 bytes
    assert_eq!(shaped.bytes, [3, b'h', b'i', 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_empty_string_is_short() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&Value::from(""), true).unwrap();
    assert_eq!(shaped.shape_id, basic::SHORT_STRING);
    assert_eq!(shaped.bytes, [1, 0, 0, 0, 0, 0, 0, 0, 0]);
}

#[test]
fn test_string_cut_boundary() {
    let shaper = Shaper::new();
    // seven bytes still fit inline together with the NUL
    let short = shaper.encode(&Value::from("abcdefg"), true).unwrap();
    assert_eq!(short.shape_id, basic::SHORT_STRING);
    assert_eq!(short.bytes.len(), 9);

    // eight bytes spill into a long string: u64 length, payload, NUL
    let long = shaper.encode(&Value::from("abcdefgh"), true).unwrap();
    assert_eq!(long.shape_id, basic::LONG_STRING);
    let mut expected = 9u64.to_le_bytes().to_vec();
    expected.extend_from_slice(b"abcdefgh\0");
    assert_eq!(long.bytes, expected);
}

#[test]
fn test_single_fixed_field_object_layout() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&obj(&[("a", Value::Number(1.0))]), true).unwrap();

    // first dynamically issued shape id
    assert_eq!(shaped.shape_id, basic::FIRST_DYNAMIC);

    // variable offset table with a single entry (no variable fields), then
    // the fixed block holding the number
    let mut expected = 16u64.to_le_bytes().to_vec();
    expected.extend_from_slice(&1.0f64.to_le_bytes());
    assert_eq!(shaped.bytes, expected);
}

#[test]
fn test_empty_object_uses_basic_shape() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&Value::Object(Vec::new()), true).unwrap();
    assert_eq!(shaped.shape_id, basic::EMPTY_OBJECT);
    assert_eq!(shaped.bytes, 8u64.to_le_bytes());
}

#[test]
fn test_empty_list_uses_basic_shape() {
    let shaper = Shaper::new();
    let shaped = shaper.encode(&Value::List(Vec::new()), true).unwrap();
    assert_eq!(shaped.shape_id, basic::LIST);
    assert_eq!(shaped.bytes, 0u32.to_le_bytes());
}

// ============================================================================
// List classification
// ============================================================================

#[test]
fn test_homogeneous_sized_list() {
    let shaper = Shaper::new();
    let list = Value::List(vec![
        Value::Number(1.0),
        Value::Number(2.0),
        Value::Number(3.0),
    ]);
    let shaped = shaper.encode(&list, true).unwrap();

    // equal shapes and equal sizes: count plus packed elements, no offsets
    assert_eq!(shaped.bytes.len(), 4 + 3 * 8);
    assert!(shaped.shape_id >= basic::FIRST_DYNAMIC);
    assert_eq!(shaper.decode(&shaped).unwrap(), list);
}

#[test]
fn test_homogeneous_list_with_varying_sizes() {
    let shaper = Shaper::new();
    // both long strings (same shape id) of different lengths
    let list = Value::List(vec![
        Value::from("a long enough string"),
        Value::from("astring!"),
    ]);
    let shaped = shaper.encode(&list, true).unwrap();
    assert!(shaped.shape_id >= basic::FIRST_DYNAMIC);
    assert_eq!(shaper.decode(&shaped).unwrap(), list);
}

#[test]
fn test_inhomogeneous_list_uses_generic_shape() {
    let shaper = Shaper::new();
    let list = Value::List(vec![Value::Number(1.0), Value::from("x"), Value::Null]);
    let shaped = shaper.encode(&list, true).unwrap();
    assert_eq!(shaped.shape_id, basic::LIST);
    assert_eq!(shaper.decode(&shaped).unwrap(), list);
}

// ============================================================================
// Shape identity
// ============================================================================

#[test]
fn test_structurally_equal_objects_share_a_shape() {
    let shaper = Shaper::new();
    let first = obj(&[("a", Value::Number(1.0)), ("b", Value::from("hi"))]);
    let second = obj(&[("b", Value::from("hello")), ("a", Value::Number(42.0))]);

    let s1 = shaper.encode(&first, true).unwrap();
    let s2 = shaper.encode(&second, true).unwrap();

    assert_eq!(s1.shape_id, s2.shape_id);
    assert_ne!(s1.bytes, s2.bytes);
    assert_ne!(
        shaper.decode(&s1).unwrap(),
        shaper.decode(&s2).unwrap()
    );
}

#[test]
fn test_different_structures_get_distinct_shapes() {
    let shaper = Shaper::new();
    let with_number = shaper
        .encode(&obj(&[("a", Value::Number(1.0))]), true)
        .unwrap();
    let with_bool = shaper
        .encode(&obj(&[("a", Value::Bool(true))]), true)
        .unwrap();
    assert_ne!(with_number.shape_id, with_bool.shape_id);
}

#[test]
fn test_encoding_is_idempotent_across_calls() {
    let shaper = Shaper::new();
    let doc = obj(&[("x", Value::Number(0.5)), ("y", Value::from("hello"))]);
    let a = shaper.encode(&doc, true).unwrap();
    let shapes_before = shaper.shape_count();
    let b = shaper.encode(&doc, true).unwrap();
    assert_eq!(a, b);
    assert_eq!(shaper.shape_count(), shapes_before);
}

// ============================================================================
// Reserved attributes
// ============================================================================

#[test]
fn test_underscore_attributes_are_stripped() {
    let shaper = Shaper::new();
    let doc = obj(&[
        ("_private", Value::Number(1.0)),
        ("_key", Value::from("k1")),
        ("a", Value::Number(2.0)),
    ]);
    let shaped = shaper.encode(&doc, true).unwrap();
    let decoded = shaper.decode(&shaped).unwrap();
    assert_eq!(decoded, obj(&[("a", Value::Number(2.0))]));
    assert_eq!(shaper.lookup_attribute("_private"), None);
}

#[test]
fn test_empty_attribute_names_are_dropped() {
    let shaper = Shaper::new();
    let doc = obj(&[("", Value::Number(1.0)), ("a", Value::Number(2.0))]);
    let decoded = shaper.decode(&shaper.encode(&doc, true).unwrap()).unwrap();
    assert_eq!(decoded, obj(&[("a", Value::Number(2.0))]));
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_round_trip_battery() {
    let shaper = Shaper::new();
    let cases = [
        Value::Null,
        Value::Bool(false),
        Value::Number(-12.75),
        Value::from(""),
        Value::from("short"),
        Value::from("a string well past the short-string cut"),
        Value::List(vec![]),
        Value::List(vec![Value::Bool(true), Value::Bool(false)]),
        obj(&[
            ("name", Value::from("deeply")),
            (
                "nested",
                obj(&[
                    ("list", Value::List(vec![Value::Number(1.0), Value::Null])),
                    ("flag", Value::Bool(true)),
                ]),
            ),
            ("score", Value::Number(99.5)),
        ]),
    ];

    for value in &cases {
        let shaped = shaper.encode(value, true).unwrap();
        let decoded = shaper.decode(&shaped).unwrap();
        assert_eq!(&decoded, value, "round trip failed for {value}");
    }
}

// ============================================================================
// Lookup-only encoding
// ============================================================================

#[test]
fn test_encode_without_create_reports_not_found() {
    let shaper = Shaper::new();
    let doc = obj(&[("unseen", Value::Number(1.0))]);

    let err = shaper.encode(&doc, false).unwrap_err();
    assert!(matches!(err, VellumError::NotFound));
    assert_eq!(shaper.attribute_count(), 0);

    // after a creating encode the lookup-only path succeeds with the same id
    let created = shaper.encode(&doc, true).unwrap();
    let looked_up = shaper.encode(&doc, false).unwrap();
    assert_eq!(created, looked_up);
}

// ============================================================================
// Accessors
// ============================================================================

#[test]
fn test_accessor_through_fixed_and_variable_blocks() {
    let shaper = Shaper::new();
    let doc = obj(&[
        ("a", Value::Number(7.0)),
        (
            "b",
            obj(&[("c", Value::from("past the short string cut"))]),
        ),
    ]);
    let shaped = shaper.encode(&doc, true).unwrap();

    match shaper.extract(&shaped, "a").unwrap() {
        Extraction::Found { shape_id, bytes } => {
            assert_eq!(shape_id, basic::NUMBER);
            assert_eq!(bytes, 7.0f64.to_le_bytes());
        }
        Extraction::Absent => panic!("path a must resolve"),
    }

    match shaper.extract(&shaped, "b.c").unwrap() {
        Extraction::Found { shape_id, bytes } => {
            assert_eq!(shape_id, basic::LONG_STRING);
            let inner = ShapedDocument {
                shape_id,
                bytes: bytes.to_vec(),
            };
            assert_eq!(
                shaper.decode(&inner).unwrap(),
                Value::from("past the short string cut")
            );
        }
        Extraction::Absent => panic!("path b.c must resolve"),
    }
}

#[test]
fn test_accessor_absent_paths() {
    let shaper = Shaper::new();
    let doc = obj(&[("a", Value::Number(1.0))]);
    let shaped = shaper.encode(&doc, true).unwrap();

    assert_eq!(shaper.extract(&shaped, "missing").unwrap(), Extraction::Absent);
    // descending into a non-object value
    assert_eq!(shaper.extract(&shaped, "a.b").unwrap(), Extraction::Absent);
}

#[test]
fn test_accessor_is_cached() {
    let shaper = Shaper::new();
    let shaped = shaper
        .encode(&obj(&[("a", Value::Number(1.0))]), true)
        .unwrap();
    let first = shaper.find_accessor(shaped.shape_id, "a");
    let second = shaper.find_accessor(shaped.shape_id, "a");
    assert!(Arc::ptr_eq(&first, &second));
}

// ============================================================================
// Dictionary listener
// ============================================================================

#[derive(Default)]
struct RecordingListener {
    events: parking_lot::Mutex<Vec<String>>,
    fail_shapes: bool,
}

impl DictionaryListener for RecordingListener {
    fn attribute_created(&self, id: u32, name: &str) -> vellum_core::Result<()> {
        self.events.lock().push(format!("attr {id} {name}"));
        Ok(())
    }

    fn shape_created(&self, id: u32, _canonical: &[u8]) -> vellum_core::Result<()> {
        if self.fail_shapes {
            return Err(VellumError::internal("datafile full"));
        }
        self.events.lock().push(format!("shape {id}"));
        Ok(())
    }
}

#[test]
fn test_listener_sees_inserts_in_issue_order() {
    let listener = Arc::new(RecordingListener::default());
    let shaper = Shaper::with_listener(listener.clone());

    shaper
        .encode(&obj(&[("a", Value::Number(1.0))]), true)
        .unwrap();

    let events = listener.events.lock().clone();
    assert_eq!(events, vec!["attr 1 a".to_owned(), "shape 8".to_owned()]);
}

#[test]
fn test_failing_listener_aborts_the_insert() {
    let listener = Arc::new(RecordingListener {
        events: parking_lot::Mutex::new(Vec::new()),
        fail_shapes: true,
    });
    let shaper = Shaper::with_listener(listener);

    let err = shaper
        .encode(&obj(&[("a", Value::Number(1.0))]), true)
        .unwrap_err();
    assert!(matches!(err, VellumError::Internal { .. }));
    // the shape id was not consumed; only the basic shapes exist
    assert_eq!(shaper.shape_count(), 7);
}

// ============================================================================
// Nesting guard
// ============================================================================

#[test]
fn test_pathological_nesting_reports_cycle() {
    let shaper = Shaper::new();
    let mut value = Value::Number(0.0);
    for _ in 0..300 {
        value = Value::List(vec![value]);
    }
    let err = shaper.encode(&value, true).unwrap_err();
    assert!(matches!(err, VellumError::ShaperCycle));
}

// ============================================================================
// Dictionary replay
// ============================================================================

#[test]
fn test_replayed_dictionaries_decode_old_documents() {
    // shape a document in one shaper, replay its dictionaries into a fresh
    // one, and decode there
    let original = Shaper::new();
    let doc = obj(&[("a", Value::Number(3.0)), ("b", Value::from("hi"))]);
    let shaped = original.encode(&doc, true).unwrap();

    let reopened = Shaper::new();
    for id in 1..=original.attribute_count() as u32 {
        let name = original.attribute_name(id).unwrap();
        reopened.restore_attribute(id, &name).unwrap();
    }
    for id in vellum_shaper::basic::FIRST_DYNAMIC..=original.shape_count() as u32 {
        let shape = original.lookup_shape(id).unwrap();
        reopened.restore_shape(id, (*shape).clone()).unwrap();
    }

    assert_eq!(reopened.decode(&shaped).unwrap(), doc);
}
