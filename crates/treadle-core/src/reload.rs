//! Asynchronous reload requests.
//!
//! Signal handlers and other threads only call [`ReloadRequests::request`].
//! The control thread polls the flag through [`ReloadCoordinator::poll`]
//! after every blocking wait, so a reload can never interleave with a
//! transition.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::{ReloadError, ReloadOutcome, RoutingEngine};
use crate::graph::GraphRuntime;
use crate::store::{DefinitionSource, LoadError};
use crate::transition::TransitionError;

/// A shared "reload pending" flag.
///
/// Clones share the same flag. Setting it is async-signal-safe.
#[derive(Debug, Clone, Default)]
pub struct ReloadRequests(Arc<AtomicBool>);

impl ReloadRequests {
    /// Creates a flag with no request pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a reload as pending. Repeated requests collapse into one.
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns true if a request is pending, without clearing it.
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Clears the flag, returning whether a request was pending.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }
}

/// What [`ReloadCoordinator::poll`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadStatus {
    /// No request was pending.
    Idle,
    /// Definitions were replaced.
    Reloaded(ReloadOutcome),
    /// The new definitions failed to load; the old ones stay in effect.
    Rejected(LoadError),
}

/// Services reload requests against a definition source.
pub struct ReloadCoordinator<S> {
    source: S,
    requests: ReloadRequests,
}

impl<S: DefinitionSource> ReloadCoordinator<S> {
    /// Creates a coordinator with its own request flag.
    pub fn new(source: S) -> Self {
        Self::with_requests(source, ReloadRequests::new())
    }

    /// Creates a coordinator around an existing request flag.
    pub fn with_requests(source: S, requests: ReloadRequests) -> Self {
        Self { source, requests }
    }

    /// A handle for requesting reloads from other threads.
    pub fn requests(&self) -> ReloadRequests {
        self.requests.clone()
    }

    /// The definition source reloads read from.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reloads now, regardless of the flag.
    pub fn reload<G: GraphRuntime>(&self, engine: &mut RoutingEngine<G>) -> Result<ReloadOutcome, ReloadError> {
        engine.reload(&self.source)
    }

    /// Services a pending request, if any.
    ///
    /// A definition that fails to load is logged and reported as
    /// [`ReloadStatus::Rejected`]. Only a failed transition under the
    /// immediate policy is returned as an error.
    pub fn poll<G: GraphRuntime>(&self, engine: &mut RoutingEngine<G>) -> Result<ReloadStatus, TransitionError> {
        if !self.requests.take() {
            return Ok(ReloadStatus::Idle);
        }
        tracing::info!("reload requested");
        match self.reload(engine) {
            Ok(outcome) => Ok(ReloadStatus::Reloaded(outcome)),
            Err(ReloadError::Load(err)) => {
                tracing::warn!(error = %err, "reload rejected, keeping current presets");
                Ok(ReloadStatus::Rejected(err))
            }
            Err(ReloadError::Transition(err)) => Err(err),
        }
    }
}
