// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Entity identifiers.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// 128-bit identifier attached to every first-class entity: backends,
/// populations, projections and channels.
///
/// The nil value is reserved for "no entity" (e.g. the presynaptic side of a
/// projection driven by an external channel).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Uid(uuid::Uuid);

impl Uid {
    /// Generate a fresh random identifier.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// The nil identifier.
    pub const fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(uuid::Uuid::from_bytes(bytes))
    }

    pub const fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static UID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Monotonic identifier generator for reproducible runs.
///
/// Produces `0x01, 0x02, …` in little-endian order of an internal process-wide
/// 64-bit counter, so consecutive entities get predictable UIDs. Intended for
/// debugging and tests; production code uses [`Uid::random`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialUidGenerator;

impl SequentialUidGenerator {
    /// Generate the next identifier in the sequence.
    pub fn next() -> Uid {
        let value = UID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Uid::from_bytes(bytes)
    }

    /// Restart the counter from `initial_value`.
    pub fn reset(initial_value: u64) {
        UID_COUNTER.store(initial_value, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_uid() {
        assert!(Uid::nil().is_nil());
        assert!(!Uid::random().is_nil());
        assert_ne!(Uid::random(), Uid::random());
    }

    #[test]
    fn test_display() {
        let uid = Uid::from_bytes([1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(uid.to_string(), "01020300-0000-0000-0000-000000000000");
    }

    #[test]
    fn test_ordering_and_hash() {
        let a = Uid::from_bytes([1; 16]);
        let b = Uid::from_bytes([2; 16]);
        assert!(a < b);

        let mut map = std::collections::HashMap::new();
        map.insert(a, 1u32);
        assert_eq!(map.get(&Uid::from_bytes([1; 16])), Some(&1));
    }

    // All sequential-generator assertions live in one test because the
    // counter is process-wide.
    #[test]
    fn test_sequential_generator() {
        SequentialUidGenerator::reset(1);
        let first = SequentialUidGenerator::next();
        assert_eq!(first.as_bytes()[0], 1);
        assert_eq!(SequentialUidGenerator::next().as_bytes()[0], 2);

        SequentialUidGenerator::reset(5);
        let uid = SequentialUidGenerator::next();
        assert_eq!(uid.as_bytes()[0], 5);
        assert_eq!(&uid.as_bytes()[1..], &[0; 15]);

        SequentialUidGenerator::reset(0x0102);
        let uid = SequentialUidGenerator::next();
        assert_eq!(uid.as_bytes()[0], 2);
        assert_eq!(uid.as_bytes()[1], 1);
    }
}
