//! Held-key bitmaps.
//!
//! Same layout as the kernel's `EVIOCGKEY` buffer: bit `n` is set while key
//! code `n` is held, for codes up to `KEY_MAX`.

use crate::KeyCode;
use crate::keys::KEY_MAX;

const BITS: usize = KEY_MAX.raw() as usize + 1;
const WORDS: usize = BITS.div_ceil(64);

/// The set of keys held at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBitmap {
    words: [u64; WORDS],
}

impl KeyBitmap {
    /// An empty bitmap (nothing held).
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Builds a bitmap from held key codes. Codes above `KEY_MAX` are dropped.
    pub fn from_codes(codes: impl IntoIterator<Item = KeyCode>) -> Self {
        let mut bitmap = Self::new();
        for code in codes {
            bitmap.set(code);
        }
        bitmap
    }

    /// Builds a bitmap from a little-endian byte buffer as filled by
    /// `EVIOCGKEY`. Bytes beyond `KEY_MAX` are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut bitmap = Self::new();
        for (i, byte) in bytes.iter().enumerate().take(BITS / 8) {
            bitmap.words[i / 8] |= u64::from(*byte) << ((i % 8) * 8);
        }
        bitmap
    }

    /// Marks `code` as held. Returns false if the code is out of range.
    pub fn set(&mut self, code: KeyCode) -> bool {
        let n = code.raw() as usize;
        if n >= BITS {
            return false;
        }
        self.words[n / 64] |= 1u64 << (n % 64);
        true
    }

    /// Marks `code` as released.
    pub fn clear(&mut self, code: KeyCode) {
        let n = code.raw() as usize;
        if n < BITS {
            self.words[n / 64] &= !(1u64 << (n % 64));
        }
    }

    /// Returns true if `code` is held.
    pub fn contains(&self, code: KeyCode) -> bool {
        let n = code.raw() as usize;
        n < BITS && self.words[n / 64] & (1u64 << (n % 64)) != 0
    }

    /// Returns true if no key is held.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Held key codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            (0..64usize)
                .filter(move |bit| word & (1u64 << *bit) != 0)
                .map(move |bit| KeyCode::new((i * 64 + bit) as u16))
        })
    }
}

impl Default for KeyBitmap {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<KeyCode> for KeyBitmap {
    fn from_iter<T: IntoIterator<Item = KeyCode>>(iter: T) -> Self {
        Self::from_codes(iter)
    }
}
