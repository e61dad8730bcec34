//! Daemon configuration file.
//!
//! # File Format
//!
//! ```toml
//! root = "/home/patch/mi"
//! input_device = "/dev/input/event0"
//! heartbeat_secs = 200
//! client_name = "treadle"
//! reload_policy = "deferred"   # or "immediate"
//! duplicates = "reject"        # or "collapse"
//!
//! [switches]
//! A = 0x1e
//! B = 0x30
//! C = 0x2e
//! ```
//!
//! Every field is optional. The file is found by [`DaemonConfig::locate`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use treadle_core::{DuplicatePolicy, PresetName, ReloadPolicy};
use treadle_platform::{KeyCode, SwitchMap, keys};

use crate::error::ConfigError;
use crate::paths::{self, CONFIG_ENV, Layout};

/// Key code of each footswitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Key selecting preset A.
    #[serde(rename = "A")]
    pub a: u16,
    /// Key selecting preset B.
    #[serde(rename = "B")]
    pub b: u16,
    /// Key selecting preset C.
    #[serde(rename = "C")]
    pub c: u16,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            a: keys::KEY_A.raw(),
            b: keys::KEY_B.raw(),
            c: keys::KEY_C.raw(),
        }
    }
}

impl SwitchConfig {
    /// Builds the key-to-preset table.
    pub fn to_switch_map(&self) -> SwitchMap {
        let mut map = SwitchMap::new();
        map.map(KeyCode::new(self.a), PresetName::A);
        map.map(KeyCode::new(self.b), PresetName::B);
        map.map(KeyCode::new(self.c), PresetName::C);
        map
    }
}

/// Settings for the routing daemon and its tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    /// Installation root containing `PEDALS/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Footswitch input device.
    pub input_device: PathBuf,
    /// Longest wait for input before logging a heartbeat.
    pub heartbeat_secs: u64,
    /// Client name registered with the graph server.
    pub client_name: String,
    /// What a reload does to the active preset's routing.
    pub reload_policy: ReloadPolicy,
    /// How repeated connections in a definition are treated.
    pub duplicates: DuplicatePolicy,
    /// Footswitch key codes.
    pub switches: SwitchConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            root: None,
            input_device: PathBuf::from("/dev/input/event0"),
            heartbeat_secs: 200,
            client_name: "treadle".to_string(),
            reload_policy: ReloadPolicy::default(),
            duplicates: DuplicatePolicy::default(),
            switches: SwitchConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes configuration to TOML text.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Loads configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Saves configuration to a file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
        fs::write(path, self.to_toml()?).map_err(|e| ConfigError::write_file(path, e))
    }

    /// Finds the configuration file to use.
    ///
    /// Precedence: `explicit`, then `$TREADLE_CONFIG`, then the user config
    /// directory if a file exists there. Returns `None` when defaults apply.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Some(PathBuf::from(path));
        }
        let default = paths::default_config_path();
        default.is_file().then_some(default)
    }

    /// Loads the located configuration, or defaults if there is none.
    ///
    /// A file named explicitly or through the environment must exist.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        match Self::locate(explicit) {
            Some(path) => {
                let config = Self::load(&path)?;
                tracing::debug!(path = %path.display(), "loaded configuration");
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// The installation root: configured, else `$PATH_MI_ROOT`, else `.`.
    pub fn resolve_root(&self) -> PathBuf {
        self.root
            .clone()
            .or_else(paths::root_from_env)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Well-known files under the resolved root.
    pub fn layout(&self) -> Layout {
        Layout::new(self.resolve_root())
    }

    /// Bounded-wait timeout for input. Never zero.
    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.input_device, Path::new("/dev/input/event0"));
        assert_eq!(config.heartbeat(), Duration::from_secs(200));
        assert_eq!(config.client_name, "treadle");
        assert_eq!(config.reload_policy, ReloadPolicy::Deferred);
        assert_eq!(config.duplicates, DuplicatePolicy::Reject);
        assert_eq!(config.switches.to_switch_map(), SwitchMap::standard());
    }

    #[test]
    fn test_empty_file_is_defaults() {
        assert_eq!(DaemonConfig::from_toml("").unwrap(), DaemonConfig::default());
    }

    #[test]
    fn test_parse_full_file() {
        let config = DaemonConfig::from_toml(
            r#"
            root = "/opt/mi"
            heartbeat_secs = 5
            reload_policy = "immediate"
            duplicates = "collapse"

            [switches]
            A = 0x100
            B = 0x101
            "#,
        )
        .unwrap();
        assert_eq!(config.resolve_root(), Path::new("/opt/mi"));
        assert_eq!(config.heartbeat(), Duration::from_secs(5));
        assert_eq!(config.reload_policy, ReloadPolicy::Immediate);
        assert_eq!(config.duplicates, DuplicatePolicy::Collapse);
        assert_eq!(config.switches.c, 0x2e);

        let map = config.switches.to_switch_map();
        assert_eq!(map.preset_for(KeyCode::new(0x101)), Some(PresetName::B));
        assert_eq!(map.preset_for(keys::KEY_A), None);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            DaemonConfig::from_toml("heartbeat = 3"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_bad_policy_rejected() {
        assert!(DaemonConfig::from_toml("reload_policy = \"sometimes\"").is_err());
    }

    #[test]
    fn test_zero_heartbeat_clamped() {
        let config = DaemonConfig {
            heartbeat_secs: 0,
            ..DaemonConfig::default()
        };
        assert_eq!(config.heartbeat(), Duration::from_secs(1));
    }

    #[test]
    fn test_explicit_path_wins() {
        let explicit = Path::new("/tmp/elsewhere.toml");
        assert_eq!(DaemonConfig::locate(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = DaemonConfig {
            root: Some(PathBuf::from("/srv/mi")),
            reload_policy: ReloadPolicy::Immediate,
            ..DaemonConfig::default()
        };
        let text = config.to_toml().unwrap();
        assert_eq!(DaemonConfig::from_toml(&text).unwrap(), config);
    }
}
