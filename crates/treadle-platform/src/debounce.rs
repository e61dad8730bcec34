//! Footswitch debouncing.
//!
//! Raw samples repeat while a switch is held and may show several switches
//! at once. [`SwitchDebouncer`] reduces them to preset selections:
//!
//! - the lowest-numbered mapped key that is held wins;
//! - a selection is emitted only when the winner differs from the last one
//!   emitted, so holding a switch emits once and releasing emits nothing;
//! - keys without a mapping are ignored.
//!
//! Pressing the same switch again after pressing another one emits again;
//! pressing it again after a plain release does not.

use treadle_core::PresetName;

use crate::bitmap::KeyBitmap;
use crate::switch_map::SwitchMap;
use crate::KeyCode;

/// Turns key bitmap samples into preset selections.
#[derive(Debug, Clone)]
pub struct SwitchDebouncer {
    map: SwitchMap,
    last: Option<KeyCode>,
}

impl SwitchDebouncer {
    /// Creates a debouncer that has emitted nothing yet.
    pub fn new(map: SwitchMap) -> Self {
        Self { map, last: None }
    }

    /// The key assignments in use.
    pub fn map(&self) -> &SwitchMap {
        &self.map
    }

    /// The preset most recently emitted.
    pub fn last_selected(&self) -> Option<PresetName> {
        self.last.and_then(|code| self.map.preset_for(code))
    }

    /// Forgets the last emission so the next held switch emits again.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Feeds one sample, returning a selection if it is a new one.
    pub fn feed(&mut self, sample: &KeyBitmap) -> Option<PresetName> {
        let (code, preset) = sample
            .iter()
            .find_map(|code| self.map.preset_for(code).map(|preset| (code, preset)))?;
        if self.last == Some(code) {
            return None;
        }
        self.last = Some(code);
        tracing::debug!(key = %code, %preset, "switch selected");
        Some(preset)
    }

    /// Adapts an iterator of samples into an iterator of selections.
    pub fn events<I>(self, samples: I) -> Debounced<I::IntoIter>
    where
        I: IntoIterator<Item = KeyBitmap>,
    {
        Debounced {
            debouncer: self,
            samples: samples.into_iter(),
        }
    }
}

/// Iterator returned by [`SwitchDebouncer::events`].
#[derive(Debug, Clone)]
pub struct Debounced<I> {
    debouncer: SwitchDebouncer,
    samples: I,
}

impl<I: Iterator<Item = KeyBitmap>> Iterator for Debounced<I> {
    type Item = PresetName;

    fn next(&mut self) -> Option<PresetName> {
        for sample in self.samples.by_ref() {
            if let Some(preset) = self.debouncer.feed(&sample) {
                return Some(preset);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KEY_A, KEY_B, KEY_C};

    fn held(codes: &[KeyCode]) -> KeyBitmap {
        KeyBitmap::from_codes(codes.iter().copied())
    }

    #[test]
    fn test_collapses_repeats() {
        let samples = [KEY_A, KEY_A, KEY_A, KEY_B, KEY_B, KEY_A].map(|k| held(&[k]));
        let events: Vec<_> = SwitchDebouncer::new(SwitchMap::standard()).events(samples).collect();
        assert_eq!(events, vec![PresetName::A, PresetName::B, PresetName::A]);
    }

    #[test]
    fn test_release_emits_nothing() {
        let mut d = SwitchDebouncer::new(SwitchMap::standard());
        assert_eq!(d.feed(&held(&[KEY_B])), Some(PresetName::B));
        assert_eq!(d.feed(&KeyBitmap::new()), None);
        // Same switch again after a release: still the last emission.
        assert_eq!(d.feed(&held(&[KEY_B])), None);
        assert_eq!(d.last_selected(), Some(PresetName::B));
    }

    #[test]
    fn test_lowest_mapped_code_wins() {
        let mut d = SwitchDebouncer::new(SwitchMap::standard());
        // KEY_A = 0x1e < KEY_C = 0x2e < KEY_B = 0x30
        assert_eq!(d.feed(&held(&[KEY_B, KEY_C])), Some(PresetName::C));
        assert_eq!(d.feed(&held(&[KEY_A, KEY_B, KEY_C])), Some(PresetName::A));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut d = SwitchDebouncer::new(SwitchMap::standard());
        let space = KeyCode::new(0x39);
        let esc = KeyCode::new(0x01);
        assert_eq!(d.feed(&held(&[space])), None);
        assert_eq!(d.feed(&held(&[esc, KEY_B])), Some(PresetName::B));
        assert_eq!(d.feed(&held(&[esc])), None);
    }

    #[test]
    fn test_reset_allows_reemission() {
        let mut d = SwitchDebouncer::new(SwitchMap::standard());
        assert_eq!(d.feed(&held(&[KEY_A])), Some(PresetName::A));
        d.reset();
        assert_eq!(d.last_selected(), None);
        assert_eq!(d.feed(&held(&[KEY_A])), Some(PresetName::A));
    }
}
