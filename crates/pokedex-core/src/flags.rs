//! Growable bit flags over a byte sequence
//!
//! Position `p` lives in byte `p / 8`, bit `p % 8` (least significant bit
//! first). Storage grows to the smallest length that addresses the highest
//! position ever set and never shrinks, so the byte layout is stable across
//! saves.

use serde::{Deserialize, Serialize};

/// Seen or caught flags for one regional catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DexFlags {
    bytes: Vec<u8>,
}

impl DexFlags {
    /// Create empty flags
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw bytes loaded from storage
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// The underlying bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of bytes currently allocated
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Turn on the bit at `position`, growing storage if needed.
    ///
    /// Returns `true` if the bit was previously off.
    pub fn set(&mut self, position: usize) -> bool {
        let (byte, mask) = Self::locate(position);
        if byte >= self.bytes.len() {
            self.bytes.resize(byte + 1, 0);
        }
        let was_set = self.bytes[byte] & mask != 0;
        self.bytes[byte] |= mask;
        !was_set
    }

    /// Consuming variant of [`set`](Self::set)
    pub fn with(mut self, position: usize) -> Self {
        self.set(position);
        self
    }

    /// Read the bit at `position`; positions past the end read as off
    pub fn get(&self, position: usize) -> bool {
        let (byte, mask) = Self::locate(position);
        self.bytes.get(byte).is_some_and(|b| b & mask != 0)
    }

    /// Population count
    pub fn count(&self) -> u32 {
        self.bytes.iter().map(|b| b.count_ones()).sum()
    }

    fn locate(position: usize) -> (usize, u8) {
        (position / 8, 1u8 << (position % 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_grows_to_minimum_length() {
        let mut flags = DexFlags::new();
        for position in [0, 7, 8, 15] {
            flags.set(position);
        }
        assert_eq!(flags.count(), 4);
        assert_eq!(flags.byte_len(), 2);
        assert_eq!(flags.as_bytes(), &[0b1000_0001, 0b1000_0001]);
    }

    #[test]
    fn test_set_is_idempotent() {
        let once = DexFlags::new().with(42);
        let twice = DexFlags::new().with(42).with(42);
        assert_eq!(once, twice);

        let mut flags = DexFlags::new();
        assert!(flags.set(3));
        assert!(!flags.set(3));
    }

    #[test]
    fn test_set_preserves_existing_bits() {
        let mut flags = DexFlags::from_bytes(vec![0b0000_0101]);
        flags.set(20);
        assert!(flags.get(0));
        assert!(flags.get(2));
        assert!(flags.get(20));
        assert!(!flags.get(1));
        assert_eq!(flags.byte_len(), 3);
    }

    #[test]
    fn test_get_past_end_is_false() {
        let flags = DexFlags::new().with(1);
        assert!(!flags.get(1000));
    }

    #[test]
    fn test_count_is_monotonic() {
        let mut flags = DexFlags::new();
        let mut last = 0;
        for position in [5, 5, 9, 0, 130, 9, 64] {
            flags.set(position);
            let count = flags.count();
            assert!(count >= last);
            last = count;
        }
        assert_eq!(last, 5);
    }

    #[test]
    fn test_postcard_encodes_bytes_only() {
        let flags = DexFlags::new().with(0).with(8);
        let encoded = postcard::to_allocvec(&flags).unwrap();
        let decoded: DexFlags = postcard::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, flags);
    }
}
