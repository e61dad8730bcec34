//! The control loop.
//!
//! One thread owns the routing engine. It waits on the input with a bounded
//! timeout, turns held-key samples into preset selections, and services
//! reload requests after every wait. Signal handlers never touch the engine;
//! they set flags and wake the wait.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use treadle_core::{DefinitionSource, GraphRuntime, PresetName, ReloadCoordinator, ReloadStatus, RoutingEngine};
use treadle_platform::{DeviceError, InputSource, SwitchDebouncer};

/// Why the control loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonExit {
    /// Shutdown was requested.
    Shutdown,
    /// The input ran out (scripted input only).
    EndOfInput,
}

/// The control thread: engine, debouncer, input and reload servicing.
pub struct Daemon<G, I, S> {
    engine: RoutingEngine<G>,
    debouncer: SwitchDebouncer,
    input: I,
    coordinator: ReloadCoordinator<S>,
    heartbeat: Duration,
    running: Arc<AtomicBool>,
    state_file: Option<PathBuf>,
}

impl<G, I, S> Daemon<G, I, S>
where
    G: GraphRuntime,
    I: InputSource,
    S: DefinitionSource,
{
    pub fn new(
        engine: RoutingEngine<G>,
        debouncer: SwitchDebouncer,
        input: I,
        coordinator: ReloadCoordinator<S>,
    ) -> Self {
        Self {
            engine,
            debouncer,
            input,
            coordinator,
            heartbeat: Duration::from_secs(200),
            running: Arc::new(AtomicBool::new(true)),
            state_file: None,
        }
    }

    /// Longest wait for input before logging a heartbeat.
    pub fn with_heartbeat(mut self, heartbeat: Duration) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Flag that stops the loop when cleared.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Self {
        self.running = running;
        self
    }

    /// File rewritten with the active preset after every switch.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub fn engine(&self) -> &RoutingEngine<G> {
        &self.engine
    }

    pub fn into_engine(self) -> RoutingEngine<G> {
        self.engine
    }

    /// Runs until shutdown, end of input, or a fatal error.
    pub fn run(&mut self) -> anyhow::Result<DaemonExit> {
        tracing::info!(heartbeat_secs = self.heartbeat.as_secs(), "control loop started");
        loop {
            if let Some(exit) = self.step()? {
                tracing::info!(?exit, active = ?self.engine.active(), "control loop stopped");
                return Ok(exit);
            }
        }
    }

    /// One bounded wait and whatever work it produced.
    pub fn step(&mut self) -> anyhow::Result<Option<DaemonExit>> {
        if !self.running.load(Ordering::SeqCst) {
            return Ok(Some(DaemonExit::Shutdown));
        }

        match self.input.sample_key_bitmap(self.heartbeat) {
            Ok(Some(sample)) => {
                if let Some(preset) = self.debouncer.feed(&sample) {
                    self.switch_to(preset)?;
                }
            }
            Ok(None) => {
                if self.running.load(Ordering::SeqCst) && !self.coordinator.requests().is_pending() {
                    tracing::info!(active = ?self.engine.active(), "heartbeat");
                }
            }
            Err(DeviceError::EndOfInput) => {
                self.service_reload()?;
                return Ok(Some(DaemonExit::EndOfInput));
            }
            Err(e) => return Err(e).context("footswitch input failed"),
        }

        self.service_reload()?;
        Ok(None)
    }

    fn switch_to(&mut self, preset: PresetName) -> anyhow::Result<()> {
        let previous = self.engine.active();
        let report = self
            .engine
            .select(preset)
            .with_context(|| format!("switching to preset {preset} failed"))?;
        tracing::info!(from = ?previous, to = %preset, calls = report.calls(), "preset selected");

        if let Some(path) = &self.state_file {
            if let Err(e) = treadle_config::write_active_preset(path, preset) {
                tracing::warn!(error = %e, "could not record active preset");
            }
        }
        Ok(())
    }

    fn service_reload(&mut self) -> anyhow::Result<()> {
        match self
            .coordinator
            .poll(&mut self.engine)
            .context("rewiring the active preset after reload failed")?
        {
            ReloadStatus::Idle | ReloadStatus::Rejected(_) => {}
            ReloadStatus::Reloaded(outcome) => {
                tracing::debug!(changed = ?outcome.changed, "reload applied");
            }
        }
        Ok(())
    }
}
