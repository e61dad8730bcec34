//! Preset definitions read from the pedals directory.

use std::fs;
use std::path::{Path, PathBuf};

use treadle_core::{DefinitionSource, LoadError, PresetName};

use crate::paths::Layout;

/// Reads `PEDALS/A`, `PEDALS/B` and `PEDALS/C`.
///
/// Definition files are usually symlinks into pedal files; they are followed
/// on every read, so re-pointing a link and reloading picks up the new pedal.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Reads definitions from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Reads definitions from the pedals directory of `layout`.
    pub fn from_layout(layout: &Layout) -> Self {
        Self::new(layout.pedals_dir())
    }

    /// The directory definitions are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one preset's definition.
    pub fn path_of(&self, preset: PresetName) -> PathBuf {
        self.dir.join(preset.file_name())
    }
}

impl DefinitionSource for DirectorySource {
    fn read_lines(&self, preset: PresetName) -> Result<Vec<String>, LoadError> {
        let path = self.path_of(preset);
        let text = fs::read_to_string(&path).map_err(|e| LoadError::Source {
            preset,
            reason: format!("{}: {e}", path.display()),
        })?;
        Ok(text.lines().map(str::to_owned).collect())
    }
}
