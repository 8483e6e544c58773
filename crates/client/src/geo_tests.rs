// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    trims     = { "  Des Moines  ", "des moines" },
    lowers    = { "CEDAR RAPIDS", "cedar rapids" },
    unchanged = { "ames", "ames" },
)]
fn normalization(input: &str, expected: &str) {
    assert_eq!(normalize_name(input), expected);
}

#[test]
fn city_lookup_is_normalized() {
    let mut cache = GeoCache::default();
    cache.insert_city("Des Moines", "01NODE");
    assert_eq!(cache.city("  DES MOINES "), Some("01NODE"));
    assert_eq!(cache.city("Ames"), None);
}

#[test]
fn empty_cache_misses() {
    let cache = GeoCache::default();
    assert_eq!(cache.state("Iowa"), None);
    assert_eq!(cache.zipcode("50309"), None);
}
