//! Key-to-preset assignment for the footswitch.
//!
//! [`SwitchMap`] is a fixed table with one slot per [`PresetName`]. Each slot
//! holds the key code that selects that preset, so a key maps to at most one
//! preset and a preset to at most one key.
//!
//! ```rust
//! use treadle_platform::{KeyCode, PresetName, SwitchMap};
//!
//! let mut map = SwitchMap::new();
//! map.map(KeyCode::new(0x100), PresetName::A); // BTN_0
//! map.map(KeyCode::new(0x101), PresetName::B); // BTN_1
//!
//! assert_eq!(map.preset_for(KeyCode::new(0x101)), Some(PresetName::B));
//! assert_eq!(map.preset_for(KeyCode::new(0x102)), None);
//! ```

use crate::KeyCode;
use crate::keys::{KEY_A, KEY_B, KEY_C};
use treadle_core::PresetName;

/// Maps key codes to presets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchMap {
    /// Key code per preset, indexed by [`PresetName::index`].
    slots: [Option<KeyCode>; PresetName::COUNT],
}

impl SwitchMap {
    /// Creates a map with no keys assigned.
    pub const fn new() -> Self {
        Self {
            slots: [None; PresetName::COUNT],
        }
    }

    /// The stock layout: `KEY_A`, `KEY_B`, `KEY_C` select A, B, C.
    pub const fn standard() -> Self {
        Self {
            slots: [Some(KEY_A), Some(KEY_B), Some(KEY_C)],
        }
    }

    /// Number of assigned presets.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Returns true if no key is assigned.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Assigns `code` to `preset`.
    ///
    /// Replaces the preset's previous key. If `code` was assigned to another
    /// preset, that assignment is removed.
    pub fn map(&mut self, code: KeyCode, preset: PresetName) {
        for slot in &mut self.slots {
            if *slot == Some(code) {
                *slot = None;
            }
        }
        self.slots[preset.index()] = Some(code);
    }

    /// Removes the key assigned to `preset`, returning it.
    pub fn unmap(&mut self, preset: PresetName) -> Option<KeyCode> {
        self.slots[preset.index()].take()
    }

    /// Removes every assignment.
    pub fn clear(&mut self) {
        self.slots = [None; PresetName::COUNT];
    }

    /// The preset selected by `code`, if any.
    pub fn preset_for(&self, code: KeyCode) -> Option<PresetName> {
        PresetName::ALL
            .into_iter()
            .find(|preset| self.slots[preset.index()] == Some(code))
    }

    /// The key assigned to `preset`, if any.
    pub fn code_for(&self, preset: PresetName) -> Option<KeyCode> {
        self.slots[preset.index()]
    }

    /// Iterates over `(key, preset)` assignments in preset order.
    pub fn iter(&self) -> impl Iterator<Item = (KeyCode, PresetName)> + '_ {
        PresetName::ALL
            .into_iter()
            .filter_map(|preset| self.code_for(preset).map(|code| (code, preset)))
    }
}

impl Default for SwitchMap {
    fn default() -> Self {
        Self::standard()
    }
}
