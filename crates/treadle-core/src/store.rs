//! Preset definitions and the store that holds them.
//!
//! A definition is a sequence of lines, one connection per line:
//!
//! ```text
//! # guitar through the fuzz
//! system:capture_1 fuzz:in
//! fuzz:out system:playback_1
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every other line must
//! hold exactly two port names made of ASCII letters, digits, `_` and `:`.
//! Line numbers in errors are 1-based and count skipped lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connection::{Connection, PortName};
use crate::preset::{Preset, PresetName};

/// What is wrong with a malformed definition line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDefect {
    /// A character outside the port-name charset.
    InvalidCharacter(char),
    /// Only one port on the line.
    MissingPort,
    /// More than two tokens on the line.
    TrailingToken(String),
}

impl std::fmt::Display for LineDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineDefect::InvalidCharacter(c) => write!(f, "invalid character {c:?}"),
            LineDefect::MissingPort => f.write_str("missing second port"),
            LineDefect::TrailingToken(t) => write!(f, "unexpected token '{t}'"),
        }
    }
}

/// Errors from loading preset definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A line that is not two valid port names.
    #[error("preset {preset}, line {line}: {defect}: '{content}'")]
    Malformed {
        /// Preset being loaded.
        preset: PresetName,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
        /// What is wrong with it.
        defect: LineDefect,
    },

    /// The same connection listed twice in one preset.
    #[error("preset {preset}, line {line}: duplicate of the connection on line {first_line}")]
    Duplicate {
        /// Preset being loaded.
        preset: PresetName,
        /// 1-based line number of the repeat.
        line: usize,
        /// 1-based line number of the first occurrence.
        first_line: usize,
    },

    /// The definition could not be read at all.
    #[error("cannot read definition of preset {preset}: {reason}")]
    Source {
        /// Preset being loaded.
        preset: PresetName,
        /// Reader-specific description.
        reason: String,
    },
}

impl LoadError {
    /// The preset whose definition failed.
    pub fn preset(&self) -> PresetName {
        match self {
            LoadError::Malformed { preset, .. }
            | LoadError::Duplicate { preset, .. }
            | LoadError::Source { preset, .. } => *preset,
        }
    }
}

/// How repeated connections inside one definition are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail the load with [`LoadError::Duplicate`].
    #[default]
    Reject,
    /// Keep the first occurrence and log a warning.
    Collapse,
}

/// Where preset definitions come from.
pub trait DefinitionSource {
    /// Reads the definition lines of one preset.
    fn read_lines(&self, preset: PresetName) -> Result<Vec<String>, LoadError>;
}

impl<S: DefinitionSource + ?Sized> DefinitionSource for &S {
    fn read_lines(&self, preset: PresetName) -> Result<Vec<String>, LoadError> {
        (**self).read_lines(preset)
    }
}

/// In-memory definitions. Presets that were never given text are empty.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    texts: HashMap<PresetName, String>,
}

impl MemorySource {
    /// Creates a source where every preset is empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the definition text of one preset.
    pub fn with_preset(mut self, preset: PresetName, text: impl Into<String>) -> Self {
        self.set(preset, text);
        self
    }

    /// Replaces the definition text of one preset.
    pub fn set(&mut self, preset: PresetName, text: impl Into<String>) {
        self.texts.insert(preset, text.into());
    }
}

impl DefinitionSource for MemorySource {
    fn read_lines(&self, preset: PresetName) -> Result<Vec<String>, LoadError> {
        Ok(self
            .texts
            .get(&preset)
            .map(|text| text.lines().map(str::to_owned).collect())
            .unwrap_or_default())
    }
}

/// Parses one definition line.
///
/// Returns `Ok(None)` for blank and comment lines.
pub fn parse_line(line: &str) -> Result<Option<Connection>, LineDefect> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let first = tokens.next().ok_or(LineDefect::MissingPort)?;
    let second = tokens.next().ok_or(LineDefect::MissingPort)?;
    if let Some(extra) = tokens.next() {
        return Err(LineDefect::TrailingToken(extra.to_owned()));
    }

    let source = PortName::parse(first).map_err(LineDefect::InvalidCharacter)?;
    let destination = PortName::parse(second).map_err(LineDefect::InvalidCharacter)?;
    Ok(Some(Connection::new(source, destination)))
}

/// Parses the definition lines of one preset.
pub fn parse_preset<I, L>(preset: PresetName, lines: I, duplicates: DuplicatePolicy) -> Result<Preset, LoadError>
where
    I: IntoIterator<Item = L>,
    L: AsRef<str>,
{
    let mut parsed = Preset::new(preset);
    // Line number of each entry in `parsed`, by position.
    let mut origins = Vec::new();

    for (i, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let number = i + 1;
        let connection = match parse_line(line) {
            Ok(Some(connection)) => connection,
            Ok(None) => continue,
            Err(defect) => {
                return Err(LoadError::Malformed {
                    preset,
                    line: number,
                    content: line.to_owned(),
                    defect,
                });
            }
        };

        match parsed.try_insert(connection) {
            Ok(_) => origins.push(number),
            Err(position) => {
                let first_line = origins[position];
                match duplicates {
                    DuplicatePolicy::Reject => {
                        return Err(LoadError::Duplicate {
                            preset,
                            line: number,
                            first_line,
                        });
                    }
                    DuplicatePolicy::Collapse => {
                        tracing::warn!(%preset, line = number, first_line, "ignoring duplicate connection");
                    }
                }
            }
        }
    }

    Ok(parsed)
}

/// Parsed definitions for every preset.
///
/// A store always holds all of [`PresetName::ALL`]; it is built in one go and
/// replaced whole, never edited in place.
#[derive(Debug, Clone)]
pub struct PresetStore {
    presets: [Preset; PresetName::COUNT],
}

impl PresetStore {
    /// A store where every preset is empty.
    pub fn empty() -> Self {
        Self {
            presets: PresetName::ALL.map(Preset::new),
        }
    }

    /// Loads all presets, rejecting duplicate connections.
    pub fn load(source: &impl DefinitionSource) -> Result<Self, LoadError> {
        Self::load_with(source, DuplicatePolicy::Reject)
    }

    /// Loads all presets with an explicit duplicate policy.
    ///
    /// Either every preset loads or the call fails; there is no partial store.
    pub fn load_with(source: &impl DefinitionSource, duplicates: DuplicatePolicy) -> Result<Self, LoadError> {
        let mut presets = Self::empty().presets;
        for name in PresetName::ALL {
            let lines = source.read_lines(name)?;
            presets[name.index()] = parse_preset(name, lines, duplicates)?;
            tracing::debug!(preset = %name, connections = presets[name.index()].len(), "loaded preset");
        }
        Ok(Self { presets })
    }

    /// Returns a preset's definition.
    pub fn get(&self, name: PresetName) -> &Preset {
        &self.presets[name.index()]
    }

    /// Iterates over presets in switch order.
    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    /// Names of presets whose connection set differs between two stores.
    pub fn changed_since(&self, previous: &PresetStore) -> Vec<PresetName> {
        PresetName::ALL
            .into_iter()
            .filter(|&name| !self.get(name).same_connections(previous.get(name)))
            .collect()
    }
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_pair() {
        let c = parse_line("system:capture_1   fx:in").unwrap().unwrap();
        assert_eq!(c.source().as_str(), "system:capture_1");
        assert_eq!(c.destination().as_str(), "fx:in");
    }

    #[test]
    fn test_parse_line_skips_blank_and_comments() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   \t"), Ok(None));
        assert_eq!(parse_line("# a comment"), Ok(None));
    }

    #[test]
    fn test_parse_line_defects() {
        assert_eq!(parse_line("fx:in"), Err(LineDefect::MissingPort));
        assert_eq!(parse_line("a b c"), Err(LineDefect::TrailingToken("c".into())));
        assert_eq!(parse_line("a:1 b-2"), Err(LineDefect::InvalidCharacter('-')));
    }

    #[test]
    fn test_malformed_line_number_counts_skipped_lines() {
        let err = parse_preset(PresetName::B, ["# header", "", "a b", "broken"], DuplicatePolicy::Reject)
            .unwrap_err();
        match err {
            LoadError::Malformed {
                preset, line, content, ..
            } => {
                assert_eq!(preset, PresetName::B);
                assert_eq!(line, 4);
                assert_eq!(content, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let err = parse_preset(PresetName::A, ["a b", "c d", "b a"], DuplicatePolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            LoadError::Duplicate {
                preset: PresetName::A,
                line: 3,
                first_line: 1,
            }
        );
    }

    #[test]
    fn test_duplicate_collapse_keeps_first() {
        let preset = parse_preset(PresetName::A, ["a b", "b a", "c d"], DuplicatePolicy::Collapse).unwrap();
        assert_eq!(preset.len(), 2);
        assert_eq!(preset.connections()[0].source().as_str(), "a");
    }

    #[test]
    fn test_store_covers_every_preset() {
        let source = MemorySource::new().with_preset(PresetName::C, "x:out y:in");
        let store = PresetStore::load(&source).unwrap();
        assert!(store.get(PresetName::A).is_empty());
        assert!(store.get(PresetName::B).is_empty());
        assert_eq!(store.get(PresetName::C).len(), 1);
        assert_eq!(store.iter().count(), PresetName::COUNT);
        for name in PresetName::ALL {
            assert_eq!(store.get(name).name(), name);
        }
    }

    #[test]
    fn test_store_load_fails_whole() {
        let source = MemorySource::new()
            .with_preset(PresetName::A, "a b")
            .with_preset(PresetName::C, "oops");
        let err = PresetStore::load(&source).unwrap_err();
        assert_eq!(err.preset(), PresetName::C);
    }

    #[test]
    fn test_changed_since() {
        let old = PresetStore::load(&MemorySource::new().with_preset(PresetName::A, "a b")).unwrap();
        let new = PresetStore::load(
            &MemorySource::new()
                .with_preset(PresetName::A, "b a")
                .with_preset(PresetName::B, "c d"),
        )
        .unwrap();
        assert_eq!(new.changed_since(&old), vec![PresetName::B]);
    }

    #[test]
    fn test_error_display() {
        let err = LoadError::Malformed {
            preset: PresetName::A,
            line: 2,
            content: "a".into(),
            defect: LineDefect::MissingPort,
        };
        assert_eq!(err.to_string(), "preset A, line 2: missing second port: 'a'");
    }
}
