//! Port names and point-to-point connections.
//!
//! A [`Connection`] joins two ports of the external graph. Connections are
//! compared as unordered pairs: `a -> b` and `b -> a` name the same link, so
//! they hash and compare equal. The direction written in the definition file
//! is kept and used as the argument order for graph calls.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Returns true if `c` may appear in a port name.
///
/// Definition files accept ASCII letters, digits, `_` and `:`. Anything else
/// on a definition line makes it malformed.
#[inline]
pub const fn is_port_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

/// A port identifier in the graph's namespace, e.g. `system:capture_1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortName(String);

impl PortName {
    /// Creates a port name without validating its characters.
    ///
    /// Graph backends report names that may contain characters definition
    /// files cannot express (spaces, dots), so only the definition parser
    /// enforces [`is_port_char`]. Use [`PortName::parse`] for checked input.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Parses a port name, returning the first offending character on failure.
    pub fn parse(name: &str) -> Result<Self, char> {
        match name.chars().find(|&c| !is_port_char(c)) {
            Some(bad) => Err(bad),
            None => Ok(Self(name.to_owned())),
        }
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the client part of the name (text before the first `:`).
    pub fn client(&self) -> &str {
        self.0.split_once(':').map_or(self.0.as_str(), |(client, _)| client)
    }
}

impl fmt::Display for PortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PortName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PortName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PortName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A link between two ports, compared as an unordered pair.
#[derive(Debug, Clone)]
pub struct Connection {
    source: PortName,
    destination: PortName,
}

impl Connection {
    /// Creates a connection from `source` to `destination`.
    pub fn new(source: impl Into<PortName>, destination: impl Into<PortName>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// The port written first in the definition.
    pub fn source(&self) -> &PortName {
        &self.source
    }

    /// The port written second in the definition.
    pub fn destination(&self) -> &PortName {
        &self.destination
    }

    /// Returns the same link with its ports swapped.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.destination.clone(),
            destination: self.source.clone(),
        }
    }

    /// Returns true if this connection touches `port`.
    pub fn involves(&self, port: &str) -> bool {
        self.source.as_str() == port || self.destination.as_str() == port
    }

    /// Direction-independent key: the two names in sorted order.
    fn key(&self) -> (&str, &str) {
        let (a, b) = (self.source.as_str(), self.destination.as_str());
        if a <= b { (a, b) } else { (b, a) }
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Connection {}

impl Hash for Connection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}
