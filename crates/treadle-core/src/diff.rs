//! Connection differences between two presets.

use crate::connection::Connection;
use crate::preset::Preset;

/// What a transition between two presets has to change.
///
/// Connections present in both presets appear in neither list. Both lists
/// keep the definition order of the preset they were taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDiff {
    to_add: Vec<Connection>,
    to_remove: Vec<Connection>,
    shared: usize,
}

impl ConnectionDiff {
    /// Diff between two presets: `to - from` is added, `from - to` removed.
    pub fn between(from: &Preset, to: &Preset) -> Self {
        let to_add: Vec<_> = to.iter().filter(|c| !from.contains(c)).cloned().collect();
        let to_remove = from.iter().filter(|c| !to.contains(c)).cloned().collect();
        let shared = to.len() - to_add.len();
        Self {
            to_add,
            to_remove,
            shared,
        }
    }

    /// Diff from "nothing active": every connection of `to` is added.
    pub fn from_nothing(to: &Preset) -> Self {
        Self {
            to_add: to.connections().to_vec(),
            to_remove: Vec::new(),
            shared: 0,
        }
    }

    /// Connections to create.
    pub fn to_add(&self) -> &[Connection] {
        &self.to_add
    }

    /// Connections to break.
    pub fn to_remove(&self) -> &[Connection] {
        &self.to_remove
    }

    /// Number of connections both presets have in common.
    pub fn shared(&self) -> usize {
        self.shared
    }

    /// Returns true if the transition changes nothing.
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Diffs an optional outgoing preset against the incoming one.
pub fn diff(from: Option<&Preset>, to: &Preset) -> ConnectionDiff {
    match from {
        Some(from) => ConnectionDiff::between(from, to),
        None => ConnectionDiff::from_nothing(to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::PresetName;

    fn preset(name: PresetName, pairs: &[(&str, &str)]) -> Preset {
        pairs
            .iter()
            .fold(Preset::new(name), |p, (a, b)| p.with_connection(*a, *b))
    }

    #[test]
    fn test_shared_connections_untouched() {
        let a = preset(PresetName::A, &[("sys:out1", "fx:in")]);
        let b = preset(PresetName::B, &[("fx:in", "sys:out1"), ("fx:out", "sys:in1")]);
        let d = ConnectionDiff::between(&a, &b);
        assert_eq!(d.to_add(), &[Connection::new("fx:out", "sys:in1")]);
        assert!(d.to_remove().is_empty());
        assert_eq!(d.shared(), 1);
    }

    #[test]
    fn test_reverse_diff_swaps_sides() {
        let a = preset(PresetName::A, &[("a", "b"), ("c", "d")]);
        let b = preset(PresetName::B, &[("c", "d"), ("e", "f")]);
        let forward = ConnectionDiff::between(&a, &b);
        let backward = ConnectionDiff::between(&b, &a);
        assert_eq!(forward.to_add(), backward.to_remove());
        assert_eq!(forward.to_remove(), backward.to_add());
    }

    #[test]
    fn test_self_diff_is_empty() {
        let a = preset(PresetName::A, &[("a", "b"), ("c", "d")]);
        assert!(ConnectionDiff::between(&a, &a).is_empty());
    }

    #[test]
    fn test_from_nothing_adds_everything() {
        let b = preset(PresetName::B, &[("a", "b"), ("c", "d")]);
        let d = diff(None, &b);
        assert_eq!(d.to_add().len(), 2);
        assert!(d.to_remove().is_empty());
        assert_eq!(d.shared(), 0);
    }

    #[test]
    fn test_diff_against_empty_preset_removes_everything() {
        let a = preset(PresetName::A, &[("a", "b")]);
        let empty = Preset::new(PresetName::C);
        let d = diff(Some(&a), &empty);
        assert!(d.to_add().is_empty());
        assert_eq!(d.to_remove(), &[Connection::new("a", "b")]);
    }
}
