//! Property tests for the zero-run codec

use proptest::prelude::*;
use tempus_codec::{decode, decode_into, decoded_len, encode, encode_into, encoded_len};

/// Byte vectors biased towards long zero runs
fn zero_heavy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop_oneof![4 => Just(0u8), 1 => any::<u8>()], 0..1200)
}

proptest! {
    #[test]
    fn prop_round_trip_any(raw in prop::collection::vec(any::<u8>(), 0..1024)) {
        prop_assert_eq!(decode(&encode(&raw)).unwrap(), raw);
    }

    #[test]
    fn prop_round_trip_zero_heavy(raw in zero_heavy()) {
        prop_assert_eq!(decode(&encode(&raw)).unwrap(), raw);
    }

    #[test]
    fn prop_lengths_agree(raw in zero_heavy()) {
        let encoded = encode(&raw);
        prop_assert_eq!(encoded.len(), encoded_len(&raw));
        prop_assert_eq!(decoded_len(&encoded).unwrap(), raw.len());
    }

    #[test]
    fn prop_slice_api_matches_vec_api(raw in zero_heavy()) {
        let mut encoded = vec![0u8; encoded_len(&raw)];
        let n = encode_into(&raw, &mut encoded).unwrap();
        let expected = encode(&raw);
        prop_assert_eq!(&encoded[..n], expected.as_slice());

        let mut decoded = vec![0xEEu8; raw.len()];
        let m = decode_into(&encoded[..n], &mut decoded).unwrap();
        prop_assert_eq!(&decoded[..m], raw.as_slice());
    }

    #[test]
    fn prop_no_zero_count_bytes(raw in zero_heavy()) {
        // Every marker is followed by a count in 1..=255
        let encoded = encode(&raw);
        let mut i = 0;
        while i < encoded.len() {
            if encoded[i] == 0 {
                prop_assert!(i + 1 < encoded.len());
                prop_assert!(encoded[i + 1] >= 1);
                i += 2;
            } else {
                i += 1;
            }
        }
    }

    #[test]
    fn prop_zero_free_input_unchanged(raw in prop::collection::vec(1u8..=255, 0..512)) {
        prop_assert_eq!(encode(&raw), raw);
    }
}

#[test]
fn round_trip_boundary_runs() {
    for n in [0usize, 1, 254, 255, 256, 509, 510, 511, 1024] {
        let raw = vec![0u8; n];
        let encoded = encode(&raw);
        assert_eq!(encoded.len(), 2 * n.div_ceil(255), "run of {n}");
        assert_eq!(decode(&encoded).unwrap(), raw, "run of {n}");
    }
}
