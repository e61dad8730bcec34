//! Treadle configuration and on-disk state.
//!
//! - [`DaemonConfig`]: the `treadle.toml` settings file
//! - [`Layout`]: well-known files under the installation root
//! - [`DirectorySource`]: preset definitions read from `PEDALS/`
//! - [`BoardList`] / [`select_board`]: pedal boards from `PEDALS/.LIST`
//! - [`state`]: the active-preset and pid files shared with other processes
//!
//! # Example
//!
//! ```rust,no_run
//! use treadle_config::{DaemonConfig, DirectorySource};
//! use treadle_core::PresetStore;
//!
//! let (config, _) = DaemonConfig::discover(None)?;
//! let layout = config.layout();
//! let store = PresetStore::load_with(&DirectorySource::from_layout(&layout), config.duplicates)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod boards;
pub mod config;
pub mod error;
pub mod paths;
pub mod source;
pub mod state;

pub use boards::{Board, BoardList};
#[cfg(unix)]
pub use boards::select_board;
pub use config::{DaemonConfig, SwitchConfig};
pub use error::ConfigError;
pub use paths::{Layout, default_config_path, user_config_dir};
pub use source::DirectorySource;
pub use state::{PidFile, daemon_alive, read_active_preset, read_pid, request_reload, write_active_preset};
