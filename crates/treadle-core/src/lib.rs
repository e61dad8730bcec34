//! Treadle Core - routing presets for a live audio graph
//!
//! This crate holds the routing-configuration engine behind the treadle
//! foot-switch daemon. A footswitch selects one of three presets ("pedals");
//! each preset is a set of point-to-point port connections, and selecting it
//! rewires the running graph to exactly that set with as few graph calls as
//! possible.
//!
//! ## Building blocks
//!
//! - [`PresetStore`]: parsed connection sets for every [`PresetName`], loaded
//!   from a [`DefinitionSource`] and replaced wholesale on reload
//! - [`ConnectionDiff`]: the connections a transition must add and remove
//! - [`GraphRuntime`]: the seam to the external graph (JACK in production,
//!   [`MemoryGraph`] in tests and dry runs)
//! - [`RoutingTransitioner`]: applies a diff idempotently, reconciling failed
//!   calls against live state
//! - [`RoutingEngine`]: owns the graph, the store and the active preset
//! - [`ReloadCoordinator`]: services asynchronous reload requests between
//!   transitions
//!
//! ## Example
//!
//! ```rust
//! use treadle_core::{MemoryGraph, MemorySource, PresetName, PresetStore, RoutingEngine};
//!
//! let source = MemorySource::new()
//!     .with_preset(PresetName::A, "system:capture_1 fx:in")
//!     .with_preset(PresetName::B, "system:capture_1 fx:in\nfx:out system:playback_1");
//! let store = PresetStore::load(&source).unwrap();
//!
//! let mut engine = RoutingEngine::new(MemoryGraph::new(), store);
//! engine.select(PresetName::A).unwrap();
//! let report = engine.select(PresetName::B).unwrap();
//!
//! assert_eq!(report.connected, 1);
//! assert_eq!(report.disconnected, 0);
//! assert_eq!(engine.active(), Some(PresetName::B));
//! ```

pub mod connection;
pub mod diff;
pub mod engine;
pub mod graph;
pub mod preset;
pub mod reload;
pub mod store;
pub mod transition;

pub use connection::{Connection, PortName, is_port_char};
pub use diff::{ConnectionDiff, diff};
pub use engine::{ReloadError, ReloadOutcome, ReloadPolicy, RoutingEngine};
pub use graph::{Fault, GraphCall, GraphError, GraphOp, GraphRuntime, MemoryGraph};
pub use preset::{Preset, PresetName, UnknownPreset};
pub use reload::{ReloadCoordinator, ReloadRequests, ReloadStatus};
pub use store::{
    DefinitionSource, DuplicatePolicy, LineDefect, LoadError, MemorySource, PresetStore, parse_line, parse_preset,
};
pub use transition::{RoutingTransitioner, TransitionError, TransitionReport};
