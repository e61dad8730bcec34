//! Treadle Platform - footswitch input for the routing daemon
//!
//! The footswitch is read as a key bitmap: one bit per key code, set while
//! the key is held. This crate turns those samples into preset selections.
//!
//! # Core Abstractions
//!
//! - [`KeyCode`] / [`KeyBitmap`] - Linux input key codes and held-key sets
//! - [`InputSource`] - Trait for anything that can be waited on for samples
//! - [`SwitchMap`] - Which key selects which [`PresetName`]
//! - [`SwitchDebouncer`] - Turns samples into at most one event per change
//!
//! # Example
//!
//! ```rust
//! use treadle_core::PresetName;
//! use treadle_platform::{KeyBitmap, SwitchDebouncer, SwitchMap, keys};
//!
//! let mut debouncer = SwitchDebouncer::new(SwitchMap::standard());
//!
//! let held_a = KeyBitmap::from_codes([keys::KEY_A]);
//! assert_eq!(debouncer.feed(&held_a), Some(PresetName::A));
//! // Still held: nothing new.
//! assert_eq!(debouncer.feed(&held_a), None);
//! ```

pub mod bitmap;
pub mod debounce;
pub mod switch_map;

pub use bitmap::KeyBitmap;
pub use debounce::{Debounced, SwitchDebouncer};
pub use switch_map::SwitchMap;
pub use treadle_core::PresetName;

use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Linux input key codes used by the default switch layout.
pub mod keys {
    use super::KeyCode;

    /// `KEY_A`, first footswitch.
    pub const KEY_A: KeyCode = KeyCode::new(0x1e);
    /// `KEY_B`, second footswitch.
    pub const KEY_B: KeyCode = KeyCode::new(0x30);
    /// `KEY_C`, third footswitch.
    pub const KEY_C: KeyCode = KeyCode::new(0x2e);
    /// Highest key code the kernel reports (`KEY_MAX`).
    pub const KEY_MAX: KeyCode = KeyCode::new(0x2ff);
}

/// A Linux input key code (`KEY_*` from `input-event-codes.h`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyCode(u16);

impl KeyCode {
    /// Wraps a raw key code.
    #[inline]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the raw key code.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl From<u16> for KeyCode {
    fn from(code: u16) -> Self {
        Self(code)
    }
}

/// Errors from an input device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// Reading the device failed.
    #[error("cannot read input device '{device}': {reason}")]
    Read {
        /// Device path or description.
        device: String,
        /// What went wrong.
        reason: String,
    },

    /// The device or its reader thread went away.
    #[error("input device disconnected: {0}")]
    Disconnected(String),

    /// A scripted or recorded input ran out of samples.
    #[error("end of input")]
    EndOfInput,
}

/// A source of key bitmap samples.
pub trait InputSource {
    /// Waits up to `timeout` for the next sample.
    ///
    /// Returns `Ok(None)` when the wait ends without a sample: the timeout
    /// expired or the wait was interrupted so the caller can check for
    /// pending work.
    fn sample_key_bitmap(&mut self, timeout: Duration) -> Result<Option<KeyBitmap>, DeviceError>;
}

impl<I: InputSource + ?Sized> InputSource for Box<I> {
    fn sample_key_bitmap(&mut self, timeout: Duration) -> Result<Option<KeyBitmap>, DeviceError> {
        (**self).sample_key_bitmap(timeout)
    }
}

/// Replays a fixed list of samples, then reports [`DeviceError::EndOfInput`].
///
/// A `None` entry plays back as a timed-out wait.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    samples: VecDeque<Option<KeyBitmap>>,
}

impl ScriptedInput {
    /// Creates a script from samples; `None` entries are timeouts.
    pub fn new(samples: impl IntoIterator<Item = Option<KeyBitmap>>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    /// Creates a script where each sample holds the given keys.
    pub fn from_presses<I, K>(presses: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: IntoIterator<Item = KeyCode>,
    {
        Self::new(presses.into_iter().map(|held| Some(KeyBitmap::from_codes(held))))
    }

    /// Number of samples left.
    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl InputSource for ScriptedInput {
    fn sample_key_bitmap(&mut self, _timeout: Duration) -> Result<Option<KeyBitmap>, DeviceError> {
        self.samples.pop_front().ok_or(DeviceError::EndOfInput)
    }
}
