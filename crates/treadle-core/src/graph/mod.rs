//! The audio graph as seen by the routing engine.
//!
//! # Design
//!
//! Treadle does not run audio. It rewires a graph owned by another process
//! (a JACK server on the pedal) through the four calls of [`GraphRuntime`].
//! The trait is the only place the engine touches the outside world, which
//! keeps every routing decision testable against [`MemoryGraph`].
//!
//! Backends report "already in the requested state" as
//! [`GraphError::AlreadyConnected`] / [`GraphError::NotConnected`]; the
//! transitioner treats those as success. Everything else is a real failure
//! unless re-querying live state shows the call took effect anyway.

mod memory;

pub use memory::{Fault, GraphCall, MemoryGraph};

use std::fmt;

use thiserror::Error;

/// Errors reported by a graph backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The two ports are already connected.
    #[error("ports are already connected")]
    AlreadyConnected,

    /// The two ports are not connected.
    #[error("ports are not connected")]
    NotConnected,

    /// A port does not exist in the graph.
    #[error("no such port: {0}")]
    NoSuchPort(String),

    /// Any other backend failure.
    #[error("graph backend error: {0}")]
    Backend(String),
}

impl GraphError {
    /// Returns true if this error means `op` found the graph already in the
    /// state it was asked to produce.
    pub fn is_success_equivalent_for(&self, op: GraphOp) -> bool {
        matches!(
            (op, self),
            (GraphOp::Connect, GraphError::AlreadyConnected) | (GraphOp::Disconnect, GraphError::NotConnected)
        )
    }
}

/// The two mutating graph operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphOp {
    /// Create a connection.
    Connect,
    /// Break a connection.
    Disconnect,
}

impl GraphOp {
    /// The `is_connected` answer this operation aims for.
    pub const fn desired_state(self) -> bool {
        matches!(self, GraphOp::Connect)
    }
}

impl fmt::Display for GraphOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphOp::Connect => f.write_str("connect"),
            GraphOp::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// A live, mutable port graph.
///
/// Port arguments are full port names (`client:port`). Implementations are
/// driven from a single control thread.
pub trait GraphRuntime {
    /// Lists port names, optionally filtered by owner and type patterns.
    ///
    /// Pattern semantics are backend-defined (JACK uses regular expressions;
    /// [`MemoryGraph`] uses substring matching).
    fn list_ports(&self, owner_pattern: Option<&str>, type_pattern: Option<&str>) -> Vec<String>;

    /// Returns true if `a` and `b` are connected, in either direction.
    fn is_connected(&self, a: &str, b: &str) -> bool;

    /// Connects `source` to `destination`.
    fn connect(&mut self, source: &str, destination: &str) -> Result<(), GraphError>;

    /// Disconnects `source` from `destination`.
    fn disconnect(&mut self, source: &str, destination: &str) -> Result<(), GraphError>;
}

impl<G: GraphRuntime + ?Sized> GraphRuntime for Box<G> {
    fn list_ports(&self, owner_pattern: Option<&str>, type_pattern: Option<&str>) -> Vec<String> {
        (**self).list_ports(owner_pattern, type_pattern)
    }

    fn is_connected(&self, a: &str, b: &str) -> bool {
        (**self).is_connected(a, b)
    }

    fn connect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        (**self).connect(source, destination)
    }

    fn disconnect(&mut self, source: &str, destination: &str) -> Result<(), GraphError> {
        (**self).disconnect(source, destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_equivalence() {
        assert!(GraphError::AlreadyConnected.is_success_equivalent_for(GraphOp::Connect));
        assert!(GraphError::NotConnected.is_success_equivalent_for(GraphOp::Disconnect));
        assert!(!GraphError::AlreadyConnected.is_success_equivalent_for(GraphOp::Disconnect));
        assert!(!GraphError::Backend("x".into()).is_success_equivalent_for(GraphOp::Connect));
    }

    #[test]
    fn test_boxed_runtime_forwards() {
        let mut graph: Box<dyn GraphRuntime> = Box::new(MemoryGraph::new());
        graph.connect("a:out", "b:in").unwrap();
        assert!(graph.is_connected("b:in", "a:out"));
        graph.disconnect("a:out", "b:in").unwrap();
        assert!(!graph.is_connected("a:out", "b:in"));
    }

    #[test]
    fn test_op_display() {
        assert_eq!(GraphOp::Connect.to_string(), "connect");
        assert_eq!(GraphOp::Disconnect.to_string(), "disconnect");
        assert!(GraphOp::Connect.desired_state());
        assert!(!GraphOp::Disconnect.desired_state());
    }
}
