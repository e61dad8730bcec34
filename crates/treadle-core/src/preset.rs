//! Preset names and connection sets.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::connection::{Connection, PortName};

/// One of the three presets a footswitch can select.
///
/// The set is closed: a preset that is not `A`, `B` or `C` cannot be named,
/// so lookups by `PresetName` never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PresetName {
    /// First switch.
    A,
    /// Second switch.
    B,
    /// Third switch.
    C,
}

impl PresetName {
    /// Number of presets.
    pub const COUNT: usize = 3;

    /// Every preset, in switch order.
    pub const ALL: [PresetName; Self::COUNT] = [PresetName::A, PresetName::B, PresetName::C];

    /// Zero-based position of this preset.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            PresetName::A => 0,
            PresetName::B => 1,
            PresetName::C => 2,
        }
    }

    /// The preset's letter, also used as its definition file name.
    pub const fn as_char(self) -> char {
        match self {
            PresetName::A => 'A',
            PresetName::B => 'B',
            PresetName::C => 'C',
        }
    }

    /// File name of this preset's definition inside the pedals directory.
    pub const fn file_name(self) -> &'static str {
        match self {
            PresetName::A => "A",
            PresetName::B => "B",
            PresetName::C => "C",
        }
    }

    /// Parses a preset letter, ignoring case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(PresetName::A),
            'B' => Some(PresetName::B),
            'C' => Some(PresetName::C),
            _ => None,
        }
    }
}

impl fmt::Display for PresetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Error returned when a string does not name a preset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown preset '{0}' (expected A, B or C)")]
pub struct UnknownPreset(pub String);

impl FromStr for PresetName {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c).ok_or_else(|| UnknownPreset(s.to_owned())),
            _ => Err(UnknownPreset(s.to_owned())),
        }
    }
}

/// A named, ordered set of connections.
///
/// Connections keep definition order (graph calls follow it) and are unique
/// under unordered-pair equality.
#[derive(Debug, Clone)]
pub struct Preset {
    name: PresetName,
    connections: Vec<Connection>,
    /// Position of each connection in `connections`.
    index: HashMap<Connection, usize>,
}

impl Preset {
    /// Creates an empty preset.
    pub fn new(name: PresetName) -> Self {
        Self {
            name,
            connections: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Builder-style helper that adds a connection, ignoring duplicates.
    pub fn with_connection(mut self, source: impl Into<PortName>, destination: impl Into<PortName>) -> Self {
        let _ = self.try_insert(Connection::new(source, destination));
        self
    }

    /// Adds a connection.
    ///
    /// Returns the position of the existing equal connection if it is already
    /// present; the preset is unchanged in that case.
    pub fn try_insert(&mut self, connection: Connection) -> Result<usize, usize> {
        if let Some(&existing) = self.index.get(&connection) {
            return Err(existing);
        }
        let position = self.connections.len();
        self.index.insert(connection.clone(), position);
        self.connections.push(connection);
        Ok(position)
    }

    /// The preset's name.
    pub fn name(&self) -> PresetName {
        self.name
    }

    /// Connections in definition order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Iterates over connections in definition order.
    pub fn iter(&self) -> std::slice::Iter<'_, Connection> {
        self.connections.iter()
    }

    /// Returns true if the preset contains `connection` in either direction.
    pub fn contains(&self, connection: &Connection) -> bool {
        self.index.contains_key(connection)
    }

    /// Number of connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns true if the preset has no connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Returns true if both presets hold the same connection set, regardless
    /// of order, direction or name.
    pub fn same_connections(&self, other: &Preset) -> bool {
        self.len() == other.len() && self.iter().all(|c| other.contains(c))
    }
}

impl<'a> IntoIterator for &'a Preset {
    type Item = &'a Connection;
    type IntoIter = std::slice::Iter<'a, Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
