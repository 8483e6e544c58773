// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::FakeClock;
use std::collections::HashMap;

#[test]
fn generate_is_26_chars_of_crockford() {
    let clock = FakeClock::new();
    let id = Ulid::generate(&clock);
    assert_eq!(id.as_str().len(), ULID_LEN);
    assert!(id.as_str().bytes().all(|b| ALPHABET.contains(&b)));
}

#[test]
fn timestamp_round_trips() {
    let id = Ulid::from_parts(1_700_000_000_123, "ABCDEFGHJKMNPQRS");
    assert_eq!(id.timestamp_ms(), 1_700_000_000_123);
}

#[test]
fn earlier_timestamp_sorts_first() {
    let a = Ulid::from_parts(1_000, "ZZZZZZZZZZZZZZZZ");
    let b = Ulid::from_parts(1_001, "0000000000000000");
    assert!(a < b);
    assert!(a.as_str() < b.as_str());
}

#[test]
fn generation_order_is_lexicographic() {
    let clock = FakeClock::new();
    let a = Ulid::generate(&clock);
    clock.advance(std::time::Duration::from_millis(2));
    let b = Ulid::generate(&clock);
    assert!(a.as_str() < b.as_str());
}

#[test]
fn parse_accepts_own_output_and_lowercase() {
    let id = Ulid::from_parts(42, "ABCDEFGHJKMNPQRS");
    let parsed = Ulid::parse(id.as_str()).unwrap();
    assert_eq!(parsed, id);
    let lower = id.as_str().to_ascii_lowercase();
    assert_eq!(Ulid::parse(&lower).unwrap(), id);
}

#[yare::parameterized(
    too_short = { "01ABC" },
    too_long  = { "0123456789012345678901234567" },
    bad_char  = { "0123456789ABCDEFGHJKMNPQRU" },
)]
fn parse_rejects_invalid(input: &str) {
    assert!(Ulid::parse(input).is_none());
}

#[test]
fn from_parts_pads_and_maps_invalid_random_chars() {
    let id = Ulid::from_parts(0, "IL");
    // I and L are outside Crockford's alphabet; mapped to '0', rest padded.
    assert_eq!(&id.as_str()[10..], "0000000000000000");
}

#[test]
fn hash_map_lookup_by_str() {
    let mut map = HashMap::new();
    let id = Ulid::from_parts(7, "ABCDEFGHJKMNPQRS");
    map.insert(id, 1);
    assert_eq!(map.get(id.as_str()), Some(&1));
}

#[test]
fn serde_round_trip() {
    let id = Ulid::from_parts(99, "ABCDEFGHJKMNPQRS");
    let json = serde_json::to_string(&id).unwrap();
    let back: Ulid = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

proptest::proptest! {
    #[test]
    fn ordering_matches_timestamp(a in 0u64..(1u64 << 48), b in 0u64..(1u64 << 48)) {
        let ua = Ulid::from_parts(a, "0000000000000000");
        let ub = Ulid::from_parts(b, "0000000000000000");
        proptest::prop_assert_eq!(a.cmp(&b), ua.as_str().cmp(ub.as_str()));
    }

    #[test]
    fn timestamp_decode_is_inverse(ms in 0u64..(1u64 << 48)) {
        let id = Ulid::from_parts(ms, "ABCDEFGHJKMNPQRS");
        proptest::prop_assert_eq!(id.timestamp_ms(), ms);
    }
}
