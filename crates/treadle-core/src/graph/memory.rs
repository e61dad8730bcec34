//! In-memory graph runtime.
//!
//! Used by tests and by `treadle run --dry-run`. It records every mutating
//! call so callers can count graph traffic, and it can be told to fail
//! upcoming calls to exercise reconciliation.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::{GraphError, GraphRuntime};

/// A mutating call made against a [`MemoryGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphCall {
    /// `connect(source, destination)`.
    Connect(String, String),
    /// `disconnect(source, destination)`.
    Disconnect(String, String),
}

/// A scripted failure for the next mutating call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Return the error and leave the graph unchanged.
    Fail(GraphError),
    /// Apply the change, then return the error anyway.
    Spurious(GraphError),
}

/// A port graph held in memory.
///
/// If any ports have been registered with [`MemoryGraph::with_port`], calls
/// naming unknown ports fail with [`GraphError::NoSuchPort`]; otherwise every
/// name is accepted.
#[derive(Debug, Clone, Default)]
pub struct MemoryGraph {
    /// Registered ports and their type strings.
    ports: BTreeMap<String, String>,
    /// Links as `(source, destination)` in the direction they were made.
    links: BTreeSet<(String, String)>,
    calls: Vec<GraphCall>,
    faults: VecDeque<Fault>,
}

impl MemoryGraph {
    /// Creates an empty graph that accepts any port name.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a port with a type string such as `32 bit float mono audio`.
    pub fn with_port(mut self, name: impl Into<String>, port_type: impl Into<String>) -> Self {
        self.ports.insert(name.into(), port_type.into());
        self
    }

    /// Queues a fault for the next `connect`/`disconnect` call.
    pub fn inject(&mut self, fault: Fault) {
        self.faults.push_back(fault);
    }

    /// Creates a link directly, bypassing call recording and faults.
    ///
    /// Models a connection made by something other than the engine.
    pub fn link(&mut self, source: &str, destination: &str) {
        if !self.is_connected(source, destination) {
            self.links.insert((source.to_owned(), destination.to_owned()));
        }
    }

    /// Removes a link directly, bypassing call recording and faults.
    pub fn unlink(&mut self, a: &str, b: &str) {
        self.remove_link(a, b);
    }

    /// Current links in sorted order.
    pub fn links(&self) -> Vec<(String, String)> {
        self.links.iter().cloned().collect()
    }

    /// Every mutating call made so far.
    pub fn calls(&self) -> &[GraphCall] {
        &self.calls
    }

    /// Number of `connect` calls made so far.
    pub fn connect_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, GraphCall::Connect(..))).count()
    }

    /// Number of `disconnect` calls made so far.
    pub fn disconnect_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, GraphCall::Disconnect(..))).count()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn check_port(&self, name: &str) -> Result<(), GraphError> {
        if self.ports.is_empty() || self.ports.contains_key(name) {
            Ok(())
        } else {
            Err(GraphError::NoSuchPort(name.to_owned()))
        }
    }

    fn remove_link(&mut self, a: &str, b: &str) -> bool {
        let forward = (a.to_owned(), b.to_owned());
        let backward = (b.to_owned(), a.to_owned());
        self.links.remove(&forward) | self.links.remove(&backward)
    }
}

impl GraphRuntime for MemoryGraph {
    fn list_ports(&self, owner_pattern: Option<&str>, type_pattern: Option<&str>) -> Vec<String> {
        self.ports
            .iter()
            .filter(|(name, _)| owner_pattern.is_none_or(|p| name.contains(p)))
            .filter(|(_, port_type)| type_pattern.is_none_or(|p| port_type.contains(p)))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn is_connected(&self, a: &str, b: &str) -> bool {
        self.links.iter().any(|(s, d)| (s == a && d == b) || (s == b && d == a))
    }

    fn connect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        self.calls
            .push(GraphCall::Connect(source.to_owned(), destination.to_owned()));
        self.check_port(source)?;
        self.check_port(destination)?;

        let fault = self.faults.pop_front();
        if let Some(Fault::Fail(err)) = fault {
            return Err(err);
        }
        if self.is_connected(source, destination) {
            return Err(GraphError::AlreadyConnected);
        }
        self.links.insert((source.to_owned(), destination.to_owned()));
        match fault {
            Some(Fault::Spurious(err)) => Err(err),
            _ => Ok(()),
        }
    }

    fn disconnect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        self.calls
            .push(GraphCall::Disconnect(source.to_owned(), destination.to_owned()));
        self.check_port(source)?;
        self.check_port(destination)?;

        let fault = self.faults.pop_front();
        if let Some(Fault::Fail(err)) = fault {
            return Err(err);
        }
        if !self.remove_link(source, destination) {
            return Err(GraphError::NotConnected);
        }
        match fault {
            Some(Fault::Spurious(err)) => Err(err),
            _ => Ok(()),
        }
    }
}
