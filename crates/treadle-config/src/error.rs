//! Error types for configuration and state-file operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading configuration or daemon state.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a file
    #[error("failed to write file '{path}': {source}")]
    WriteFile {
        /// Path of the file that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create directory
    #[error("failed to create directory '{path}': {source}")]
    CreateDir {
        /// Path of the directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to take or release an advisory lock
    #[error("failed to lock '{path}': {source}")]
    Lock {
        /// Path of the locked file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A `.LIST` line that is not `<board>: <pedal>...`
    #[error("board list line {line}: expected '<board>: <pedal> <pedal> <pedal>', got '{content}'")]
    BoardSyntax {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A board with more pedals than there are switches
    #[error("board '{board}' lists {pedals} pedals, at most 3 are allowed")]
    BoardTooLarge {
        /// Board name.
        board: String,
        /// Number of pedals listed.
        pedals: usize,
    },

    /// No board with this name
    #[error("board not found: {0}")]
    BoardNotFound(String),

    /// A board names a pedal file that does not exist
    #[error("board '{board}' names missing pedal file '{path}'")]
    PedalNotFound {
        /// Board name.
        board: String,
        /// Expected location of the pedal file.
        path: PathBuf,
    },

    /// Unparseable contents in a state file
    #[error("unexpected contents in '{path}': '{content}'")]
    InvalidState {
        /// Path of the state file.
        path: PathBuf,
        /// What was found there.
        content: String,
    },

    /// Another daemon is alive and owns the pid file
    #[error("daemon already running (pid {pid}, recorded in '{path}')")]
    AlreadyRunning {
        /// Pid of the running daemon.
        pid: i32,
        /// Path of its pid file.
        path: PathBuf,
    },

    /// Failed to deliver a signal to the daemon
    #[error("failed to signal process {pid}: {source}")]
    Signal {
        /// Target process.
        pid: i32,
        /// Errno from `kill(2)`.
        #[source]
        source: nix::errno::Errno,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a write file error.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::WriteFile {
            path: path.into(),
            source,
        }
    }

    /// Create a create directory error.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Create a lock error.
    pub fn lock(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Lock {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this wraps an I/O "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            ConfigError::ReadFile { source, .. } | ConfigError::Lock { source, .. } => {
                source.kind() == std::io::ErrorKind::NotFound
            }
            _ => false,
        }
    }
}
