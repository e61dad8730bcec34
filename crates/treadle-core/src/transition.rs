//! Applying a preset change to the live graph.
//!
//! A transition first makes every connection of the incoming preset that is
//! missing, then breaks every stale connection of the outgoing one. Signal
//! keeps flowing through shared connections the whole time, and the brief
//! overlap of old and new routes is preferred over a gap of silence.
//!
//! Each step checks live state first and skips connections that already
//! match. A failed graph call is re-checked against live state before it is
//! treated as fatal, so a backend that reports an error after doing the work
//! does not abort the switch.

use std::time::Instant;

use thiserror::Error;

use crate::connection::Connection;
use crate::diff::{ConnectionDiff, diff};
use crate::graph::{GraphError, GraphOp, GraphRuntime};
use crate::preset::Preset;

/// A graph call that failed and left the graph in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to {op} {connection}: {cause}")]
pub struct TransitionError {
    /// The operation that failed.
    pub op: GraphOp,
    /// The connection it was applied to.
    pub connection: Connection,
    /// What the backend reported.
    #[source]
    pub cause: GraphError,
}

/// Counts of what a transition did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionReport {
    /// Connections created.
    pub connected: usize,
    /// Connections broken.
    pub disconnected: usize,
    /// Steps skipped because live state already matched.
    pub skipped: usize,
    /// Failed calls that live state showed had taken effect.
    pub reconciled: usize,
}

impl TransitionReport {
    /// Total number of graph calls issued.
    pub fn calls(&self) -> usize {
        self.connected + self.disconnected
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Applied,
    Skipped,
    Reconciled,
}

/// Applies connection diffs to a graph.
pub struct RoutingTransitioner<'g, G: GraphRuntime + ?Sized> {
    graph: &'g mut G,
}

impl<'g, G: GraphRuntime + ?Sized> RoutingTransitioner<'g, G> {
    /// Creates a transitioner over `graph`.
    pub fn new(graph: &'g mut G) -> Self {
        Self { graph }
    }

    /// Moves the graph from `from` (or nothing) to `to`.
    pub fn transition(&mut self, from: Option<&Preset>, to: &Preset) -> Result<TransitionReport, TransitionError> {
        let started = Instant::now();
        let changes = diff(from, to);
        let report = self.apply(&changes)?;
        tracing::info!(
            from = %from.map_or_else(|| "-".to_owned(), |p| p.name().to_string()),
            to = %to.name(),
            connected = report.connected,
            disconnected = report.disconnected,
            skipped = report.skipped,
            shared = changes.shared(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "transition complete"
        );
        Ok(report)
    }

    /// Applies a diff: all additions, then all removals.
    ///
    /// Stops at the first connection that cannot be brought into the desired
    /// state; earlier steps stay applied.
    pub fn apply(&mut self, changes: &ConnectionDiff) -> Result<TransitionReport, TransitionError> {
        let mut report = TransitionReport::default();
        for connection in changes.to_add() {
            match self.ensure(GraphOp::Connect, connection)? {
                Step::Applied => report.connected += 1,
                Step::Skipped => report.skipped += 1,
                Step::Reconciled => {
                    report.connected += 1;
                    report.reconciled += 1;
                }
            }
        }
        for connection in changes.to_remove() {
            match self.ensure(GraphOp::Disconnect, connection)? {
                Step::Applied => report.disconnected += 1,
                Step::Skipped => report.skipped += 1,
                Step::Reconciled => {
                    report.disconnected += 1;
                    report.reconciled += 1;
                }
            }
        }
        Ok(report)
    }

    fn ensure(&mut self, op: GraphOp, connection: &Connection) -> Result<Step, TransitionError> {
        let source = connection.source().as_str();
        let destination = connection.destination().as_str();
        let desired = op.desired_state();

        if self.graph.is_connected(source, destination) == desired {
            tracing::debug!(%op, source, destination, "already in place, skipping");
            return Ok(Step::Skipped);
        }

        let result = match op {
            GraphOp::Connect => self.graph.connect(source, destination),
            GraphOp::Disconnect => self.graph.disconnect(source, destination),
        };

        match result {
            Ok(()) => {
                tracing::debug!(%op, source, destination, "graph call ok");
                Ok(Step::Applied)
            }
            Err(cause) if cause.is_success_equivalent_for(op) => {
                tracing::debug!(%op, source, destination, %cause, "graph already in requested state");
                Ok(Step::Applied)
            }
            Err(cause) => {
                if self.graph.is_connected(source, destination) == desired {
                    tracing::warn!(%op, source, destination, %cause, "graph call failed but live state matches");
                    Ok(Step::Reconciled)
                } else {
                    tracing::error!(%op, source, destination, %cause, "graph call failed");
                    Err(TransitionError {
                        op,
                        connection: connection.clone(),
                        cause,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Fault, GraphCall, MemoryGraph};
    use crate::preset::PresetName;

    fn preset_a() -> Preset {
        Preset::new(PresetName::A).with_connection("sys:out1", "fx:in")
    }

    fn preset_b() -> Preset {
        Preset::new(PresetName::B)
            .with_connection("sys:out1", "fx:in")
            .with_connection("fx:out", "sys:in1")
    }

    #[test]
    fn test_initial_transition_connects_everything() {
        let mut graph = MemoryGraph::new();
        let report = RoutingTransitioner::new(&mut graph).transition(None, &preset_b()).unwrap();
        assert_eq!(report.connected, 2);
        assert_eq!(report.disconnected, 0);
        assert_eq!(graph.links().len(), 2);
    }

    #[test]
    fn test_adds_happen_before_removes() {
        let from = Preset::new(PresetName::A).with_connection("old:out", "sys:in1");
        let to = Preset::new(PresetName::B).with_connection("new:out", "sys:in1");
        let mut graph = MemoryGraph::new();
        graph.link("old:out", "sys:in1");

        RoutingTransitioner::new(&mut graph).transition(Some(&from), &to).unwrap();
        assert_eq!(
            graph.calls(),
            &[
                GraphCall::Connect("new:out".into(), "sys:in1".into()),
                GraphCall::Disconnect("old:out".into(), "sys:in1".into()),
            ]
        );
    }

    #[test]
    fn test_skips_connections_already_live() {
        let mut graph = MemoryGraph::new();
        graph.link("fx:in", "sys:out1");
        let report = RoutingTransitioner::new(&mut graph).transition(None, &preset_a()).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.calls(), 0);
        assert!(graph.calls().is_empty());
    }

    #[test]
    fn test_skips_removals_already_gone() {
        let mut graph = MemoryGraph::new();
        graph.link("sys:out1", "fx:in");
        let report = RoutingTransitioner::new(&mut graph)
            .transition(Some(&preset_b()), &preset_a())
            .unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(graph.disconnect_calls(), 0);
    }

    #[test]
    fn test_reconciles_spurious_failure() {
        let mut graph = MemoryGraph::new();
        graph.inject(Fault::Spurious(GraphError::Backend("timeout".into())));
        let report = RoutingTransitioner::new(&mut graph).transition(None, &preset_a()).unwrap();
        assert_eq!(report.connected, 1);
        assert_eq!(report.reconciled, 1);
    }

    #[test]
    fn test_real_failure_aborts_with_context() {
        let mut graph = MemoryGraph::new();
        graph.inject(Fault::Fail(GraphError::Backend("server gone".into())));
        let err = RoutingTransitioner::new(&mut graph)
            .transition(None, &preset_a())
            .unwrap_err();
        assert_eq!(err.op, GraphOp::Connect);
        assert_eq!(err.connection, Connection::new("sys:out1", "fx:in"));
        assert_eq!(err.cause, GraphError::Backend("server gone".into()));
        assert_eq!(
            err.to_string(),
            "failed to connect sys:out1 -> fx:in: graph backend error: server gone"
        );
    }

    #[test]
    fn test_failed_disconnect_aborts() {
        let mut graph = MemoryGraph::new();
        graph.link("sys:out1", "fx:in");
        graph.link("fx:out", "sys:in1");
        graph.inject(Fault::Fail(GraphError::NoSuchPort("fx:out".into())));
        let err = RoutingTransitioner::new(&mut graph)
            .transition(Some(&preset_b()), &preset_a())
            .unwrap_err();
        assert_eq!(err.op, GraphOp::Disconnect);
        assert!(graph.is_connected("fx:out", "sys:in1"));
    }
}
