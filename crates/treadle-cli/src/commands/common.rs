//! Configuration and graph access shared by every command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use treadle_config::{DaemonConfig, DirectorySource, Layout};
use treadle_core::{GraphRuntime, PresetStore};

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: $TREADLE_CONFIG, then the user config dir)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Installation root containing PEDALS/ (overrides the config file)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "treadle_core=trace" (overrides RUST_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Resolved configuration and on-disk layout.
pub struct Settings {
    pub config: DaemonConfig,
    pub layout: Layout,
}

impl Settings {
    /// Loads configuration and applies command-line overrides.
    pub fn load(global: &GlobalArgs) -> anyhow::Result<Self> {
        let (mut config, path) = DaemonConfig::discover(global.config.as_deref())?;
        if let Some(path) = &path {
            tracing::debug!(path = %path.display(), "using configuration file");
        }
        if let Some(root) = &global.root {
            config.root = Some(root.clone());
        }
        let layout = config.layout();
        Ok(Self { config, layout })
    }

    /// Definition files under `PEDALS/`.
    pub fn source(&self) -> DirectorySource {
        DirectorySource::from_layout(&self.layout)
    }

    /// Loads all three definitions with the configured duplicate policy.
    pub fn load_store(&self) -> anyhow::Result<PresetStore> {
        PresetStore::load_with(&self.source(), self.config.duplicates)
            .with_context(|| format!("cannot load presets from {}", self.layout.pedals_dir().display()))
    }
}

/// Connects to the live graph server.
#[cfg(feature = "jack")]
pub fn open_graph(client_name: &str) -> anyhow::Result<Box<dyn GraphRuntime>> {
    let graph = treadle_io::JackGraph::open(client_name)?;
    Ok(Box::new(graph))
}

/// Connects to the live graph server.
#[cfg(not(feature = "jack"))]
pub fn open_graph(client_name: &str) -> anyhow::Result<Box<dyn GraphRuntime>> {
    anyhow::bail!(
        "cannot connect '{client_name}' to a graph server: built without JACK support (rebuild with --features jack)"
    )
}
