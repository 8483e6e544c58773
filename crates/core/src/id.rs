// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ULID generation and parsing.
//!
//! Every persisted row is keyed by a 26-character ULID: a 10-character
//! Crockford-Base32 millisecond timestamp followed by 16 random Crockford
//! characters. Lexicographic order equals generation order at millisecond
//! granularity, which keeps primary-key indexes append-mostly.

use crate::clock::Clock;
use serde::{Deserialize, Serialize};

/// Byte length of a ULID.
pub const ULID_LEN: usize = 26;

const TIME_LEN: usize = 10;
const RAND_LEN: usize = 16;

/// Crockford's Base32 alphabet (no I, L, O, U).
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Same alphabet as chars, for the nanoid random segment.
const ALPHABET_CHARS: [char; 32] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J',
    'K', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W', 'X', 'Y', 'Z',
];

/// A 26-character lexicographically sortable identifier.
///
/// Stored inline as a fixed buffer so IDs stay `Copy` and hash like `&str`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ulid {
    buf: [u8; ULID_LEN],
}

impl Ulid {
    /// Generate a fresh ULID stamped from the given clock.
    pub fn generate(clock: &impl Clock) -> Self {
        Self::from_parts(clock.epoch_ms(), &nanoid::nanoid!(RAND_LEN, &ALPHABET_CHARS))
    }

    /// Build a ULID from an explicit timestamp and random suffix.
    ///
    /// The suffix is truncated or zero-padded to 16 characters; characters
    /// outside the Crockford alphabet are mapped to `0`. Mostly useful for
    /// tests that need deterministic ordering.
    pub fn from_parts(epoch_ms: u64, random: &str) -> Self {
        let mut buf = [b'0'; ULID_LEN];
        encode_time(epoch_ms, &mut buf[..TIME_LEN]);
        for (slot, ch) in buf[TIME_LEN..].iter_mut().zip(random.bytes()) {
            *slot = if ALPHABET.contains(&ch.to_ascii_uppercase()) {
                ch.to_ascii_uppercase()
            } else {
                b'0'
            };
        }
        Self { buf }
    }

    /// Parse an existing ULID string (e.g. a primary key read back from the
    /// store). Returns `None` when the length or alphabet is wrong.
    pub fn parse(s: &str) -> Option<Self> {
        if s.len() != ULID_LEN {
            return None;
        }
        let mut buf = [0u8; ULID_LEN];
        for (slot, ch) in buf.iter_mut().zip(s.bytes()) {
            let upper = ch.to_ascii_uppercase();
            if !ALPHABET.contains(&upper) {
                return None;
            }
            *slot = upper;
        }
        Some(Self { buf })
    }

    pub fn as_str(&self) -> &str {
        // Invariant: only constructed from the Crockford alphabet.
        match std::str::from_utf8(&self.buf) {
            Ok(s) => s,
            Err(_) => unreachable!("Ulid constructed from non-ASCII bytes"),
        }
    }

    /// Decode the millisecond timestamp embedded in the first 10 characters.
    pub fn timestamp_ms(&self) -> u64 {
        self.buf[..TIME_LEN].iter().fold(0u64, |acc, &ch| {
            let digit = ALPHABET.iter().position(|&a| a == ch).unwrap_or(0);
            (acc << 5) | digit as u64
        })
    }
}

fn encode_time(mut ms: u64, out: &mut [u8]) {
    for slot in out.iter_mut().rev() {
        *slot = ALPHABET[(ms & 0x1f) as usize];
        ms >>= 5;
    }
}

impl std::fmt::Debug for Ulid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl std::fmt::Display for Ulid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::hash::Hash for Ulid {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        // Hash the string form so it matches str::hash for Borrow<str> lookups.
        self.as_str().hash(state);
    }
}

impl std::borrow::Borrow<str> for Ulid {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Ulid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for Ulid {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Ulid {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Serialize for Ulid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        Ulid::parse(s).ok_or_else(|| serde::de::Error::custom(format!("invalid ULID: {:?}", s)))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
