//! Property tests for the push codec.

use bcat_script::{PushWidth, Script, ScriptError, decode_next_push, decode_pushes, encode_push};
use proptest::prelude::*;

fn payload(max: usize) -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..max)
}

/// Lengths clustered around each width boundary.
fn boundary_len() -> impl Strategy<Value = usize> {
    prop_oneof![
        0usize..=3,
        73usize..=78,
        253usize..=258,
        65533usize..=65538,
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exactly_one_width_is_chosen(len in boundary_len()) {
        let fragment = encode_push(&vec![0u8; len]).unwrap();
        let width = PushWidth::for_len(len).unwrap();
        prop_assert_eq!(fragment.len(), width.header_len() + len);
        prop_assert_eq!(PushWidth::from_opcode(fragment[0]), Some(width));

        let expected = match len {
            0..=75 => PushWidth::Direct,
            76..=255 => PushWidth::Extended8,
            256..=65535 => PushWidth::Extended16,
            _ => PushWidth::Extended32,
        };
        prop_assert_eq!(width, expected);
    }

    #[test]
    fn pushes_roundtrip(items in proptest::collection::vec(payload(600), 0..8)) {
        let script = Script::builder().push_all(&items).unwrap().build();
        let decoded = decode_pushes(script.as_bytes()).unwrap();
        prop_assert_eq!(decoded.len(), items.len());
        for (got, want) in decoded.iter().zip(&items) {
            prop_assert_eq!(got.as_ref(), want.as_slice());
        }
    }

    #[test]
    fn truncation_inside_a_push_is_detected(data in payload(70_000), cut in any::<prop::sample::Index>()) {
        let script = Script::builder().push(&data).unwrap().build();
        let bytes = script.as_bytes();
        // Any cut after the marker and before the end lands inside the push.
        let cut_at = 2 + cut.index(bytes.len() - 1).min(bytes.len() - 2);
        prop_assume!(cut_at < bytes.len());

        let truncated = &bytes[..cut_at];
        let is_truncated = matches!(decode_pushes(truncated), Err(ScriptError::Truncated { .. }));
        prop_assert!(is_truncated);
        let single = decode_next_push(truncated, 1);
        let single_is_truncated = matches!(single, Err(ScriptError::Truncated { .. }));
        prop_assert!(single_is_truncated);
    }
}
