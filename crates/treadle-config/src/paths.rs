//! Platform paths and the on-disk layout of a treadle installation.
//!
//! # Installation root
//!
//! ```text
//! <root>/
//! ├── .driver.pid      pid of the running daemon
//! └── PEDALS/
//!     ├── A, B, C      preset definitions (often symlinks into the pedal files)
//!     ├── .LIST        pedal boards
//!     ├── .PEDAL       active preset letter, written by the daemon
//!     └── <pedal>...   pedal files a board can point A, B, C at
//! ```
//!
//! # User configuration
//!
//! - Linux: `~/.config/treadle/treadle.toml`
//! - macOS: `~/Library/Application Support/treadle/treadle.toml`

use std::env;
use std::path::{Path, PathBuf};

use treadle_core::PresetName;

/// Application name used for directory paths.
const APP_NAME: &str = "treadle";

/// Configuration file name.
pub const CONFIG_FILE: &str = "treadle.toml";

/// Environment variable naming a configuration file.
pub const CONFIG_ENV: &str = "TREADLE_CONFIG";

/// Environment variable naming the installation root.
pub const ROOT_ENV: &str = "PATH_MI_ROOT";

/// Directory under the root holding definitions and state.
pub const PEDALS_DIR: &str = "PEDALS";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the default configuration file path.
pub fn default_config_path() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Returns the installation root named by `$PATH_MI_ROOT`, if set.
pub fn root_from_env() -> Option<PathBuf> {
    env::var_os(ROOT_ENV).filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Well-known files under an installation root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Creates a layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The installation root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/PEDALS`
    pub fn pedals_dir(&self) -> PathBuf {
        self.root.join(PEDALS_DIR)
    }

    /// Definition file of one preset.
    pub fn definition_path(&self, preset: PresetName) -> PathBuf {
        self.pedals_dir().join(preset.file_name())
    }

    /// A pedal file by name.
    pub fn pedal_path(&self, pedal: &str) -> PathBuf {
        self.pedals_dir().join(pedal)
    }

    /// The pedal board list.
    pub fn board_list_path(&self) -> PathBuf {
        self.pedals_dir().join(".LIST")
    }

    /// The active-preset file.
    pub fn active_preset_path(&self) -> PathBuf {
        self.pedals_dir().join(".PEDAL")
    }

    /// The daemon pid file.
    pub fn pid_path(&self) -> PathBuf {
        self.root.join(".driver.pid")
    }
}
