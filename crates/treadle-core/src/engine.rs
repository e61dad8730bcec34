//! The routing engine: graph, definitions and the active preset in one place.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::GraphRuntime;
use crate::preset::{Preset, PresetName};
use crate::store::{DefinitionSource, DuplicatePolicy, LoadError, PresetStore};
use crate::transition::{RoutingTransitioner, TransitionError, TransitionReport};

/// What a reload does to the graph when the active preset's definition changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReloadPolicy {
    /// Swap definitions only. The graph keeps the old routing until the
    /// next switch press, which diffs from what is actually live.
    #[default]
    Deferred,
    /// Rewire the active preset to its new definition as part of the reload.
    Immediate,
}

/// Errors from [`RoutingEngine::reload`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReloadError {
    /// The new definitions did not load; nothing changed.
    #[error("reload rejected: {0}")]
    Load(#[from] LoadError),

    /// Rewiring the active preset failed (immediate policy only).
    #[error("reload transition failed: {0}")]
    Transition(#[from] TransitionError),
}

/// Result of a successful reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadOutcome {
    /// Presets whose connection set changed.
    pub changed: Vec<PresetName>,
    /// Transition applied to the active preset, if the policy asked for one
    /// and its definition changed.
    pub resynced: Option<TransitionReport>,
}

/// Owns the graph, the preset definitions and the active preset.
///
/// `applied` is the exact definition the engine last pushed to the graph.
/// It is what the next transition diffs from, so a reload that changes the
/// active preset's file never makes the engine believe routes exist that
/// were never made.
pub struct RoutingEngine<G> {
    graph: G,
    store: PresetStore,
    active: Option<PresetName>,
    applied: Option<Preset>,
    reload_policy: ReloadPolicy,
    duplicate_policy: DuplicatePolicy,
}

impl<G: GraphRuntime> RoutingEngine<G> {
    /// Creates an engine with no preset active.
    pub fn new(graph: G, store: PresetStore) -> Self {
        Self {
            graph,
            store,
            active: None,
            applied: None,
            reload_policy: ReloadPolicy::default(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    /// Sets the reload policy.
    pub fn with_reload_policy(mut self, policy: ReloadPolicy) -> Self {
        self.reload_policy = policy;
        self
    }

    /// Sets the duplicate policy used by [`RoutingEngine::reload`].
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// The active preset, if any.
    pub fn active(&self) -> Option<PresetName> {
        self.active
    }

    /// Current definition of the active preset.
    pub fn active_preset(&self) -> Option<&Preset> {
        self.active.map(|name| self.store.get(name))
    }

    /// Definition last applied to the graph.
    ///
    /// Differs from [`RoutingEngine::active_preset`] after a deferred reload
    /// changed the active preset's file.
    pub fn applied_preset(&self) -> Option<&Preset> {
        self.applied.as_ref()
    }

    /// The loaded definitions.
    pub fn store(&self) -> &PresetStore {
        &self.store
    }

    /// The graph runtime.
    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Mutable access to the graph runtime.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    /// Consumes the engine, returning the graph.
    pub fn into_graph(self) -> G {
        self.graph
    }

    /// Switches the graph to preset `name`.
    ///
    /// On failure the active preset is unchanged and the graph may be part
    /// way between the two presets.
    pub fn select(&mut self, name: PresetName) -> Result<TransitionReport, TransitionError> {
        let target = self.store.get(name);
        let report = RoutingTransitioner::new(&mut self.graph).transition(self.applied.as_ref(), target)?;
        self.applied = Some(target.clone());
        self.active = Some(name);
        Ok(report)
    }

    /// Reloads every definition from `source`.
    ///
    /// The new store is built before anything is replaced; on a load error
    /// the store, the active preset and the graph are untouched.
    pub fn reload(&mut self, source: &impl DefinitionSource) -> Result<ReloadOutcome, ReloadError> {
        let started = Instant::now();
        let store = PresetStore::load_with(source, self.duplicate_policy)?;
        let changed = store.changed_since(&self.store);

        let mut resynced = None;
        if let (ReloadPolicy::Immediate, Some(name)) = (self.reload_policy, self.active) {
            let target = store.get(name);
            let stale = self.applied.as_ref().is_none_or(|applied| !applied.same_connections(target));
            if stale {
                let report = RoutingTransitioner::new(&mut self.graph).transition(self.applied.as_ref(), target)?;
                self.applied = Some(target.clone());
                resynced = Some(report);
            }
        }

        self.store = store;
        tracing::info!(
            changed = ?changed,
            active = ?self.active,
            resynced = resynced.is_some(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "presets reloaded"
        );
        Ok(ReloadOutcome { changed, resynced })
    }
}
