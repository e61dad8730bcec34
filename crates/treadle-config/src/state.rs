//! Daemon state files shared with other processes.
//!
//! - the active-preset file holds the letter of the preset the graph
//!   currently reflects, rewritten after every successful switch;
//! - the pid file holds the daemon's process id for the duration of a run.
//!
//! Both are accessed under `flock`-style advisory locks so readers never see
//! a half-written file.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use nix::errno::Errno;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use treadle_core::PresetName;

use crate::error::ConfigError;

fn write_locked(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| ConfigError::write_file(path, e))?;
    FileExt::lock_exclusive(&file).map_err(|e| ConfigError::lock(path, e))?;

    let written = file
        .set_len(0)
        .and_then(|()| file.seek(SeekFrom::Start(0)))
        .and_then(|_| file.write_all(contents.as_bytes()))
        .and_then(|()| file.flush());

    FileExt::unlock(&file).map_err(|e| ConfigError::lock(path, e))?;
    written.map_err(|e| ConfigError::write_file(path, e))
}

fn read_locked(path: &Path) -> Result<String, ConfigError> {
    let mut file = File::open(path).map_err(|e| ConfigError::read_file(path, e))?;
    FileExt::lock_shared(&file).map_err(|e| ConfigError::lock(path, e))?;

    let mut contents = String::new();
    let read = file.read_to_string(&mut contents);

    FileExt::unlock(&file).map_err(|e| ConfigError::lock(path, e))?;
    read.map_err(|e| ConfigError::read_file(path, e))?;
    Ok(contents)
}

/// Records `preset` as the active preset.
pub fn write_active_preset(path: impl AsRef<Path>, preset: PresetName) -> Result<(), ConfigError> {
    write_locked(path.as_ref(), &format!("{preset}\n"))
}

/// Reads the active preset. Returns `None` if no preset has been recorded.
pub fn read_active_preset(path: impl AsRef<Path>) -> Result<Option<PresetName>, ConfigError> {
    let path = path.as_ref();
    let contents = match read_locked(path) {
        Ok(contents) => contents,
        Err(e) if e.is_not_found() => return Ok(None),
        Err(e) => return Err(e),
    };
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse().map(Some).map_err(|_| ConfigError::InvalidState {
        path: path.to_path_buf(),
        content: trimmed.to_owned(),
    })
}

/// Reads the pid recorded in a pid file.
pub fn read_pid(path: impl AsRef<Path>) -> Result<i32, ConfigError> {
    let path = path.as_ref();
    let contents = read_locked(path)?;
    let first = contents.lines().next().unwrap_or("").trim();
    first
        .parse::<i32>()
        .ok()
        .filter(|pid| *pid > 0)
        .ok_or_else(|| ConfigError::InvalidState {
            path: path.to_path_buf(),
            content: first.to_owned(),
        })
}

/// Sends `SIGHUP` to the daemon recorded in `pid_path`, asking it to reload
/// its preset definitions. Returns the pid signalled.
pub fn request_reload(pid_path: impl AsRef<Path>) -> Result<i32, ConfigError> {
    let pid = read_pid(pid_path)?;
    signal::kill(Pid::from_raw(pid), Signal::SIGHUP).map_err(|source| ConfigError::Signal { pid, source })?;
    tracing::info!(pid, "sent reload signal");
    Ok(pid)
}

/// Returns true if a process with the pid in `pid_path` exists.
pub fn daemon_alive(pid_path: impl AsRef<Path>) -> Result<bool, ConfigError> {
    read_pid(pid_path).map(process_alive)
}

fn process_alive(pid: i32) -> bool {
    // Signal 0 performs the permission and existence checks only; EPERM
    // still means the process exists.
    matches!(signal::kill(Pid::from_raw(pid), None::<Signal>), Ok(()) | Err(Errno::EPERM))
}

/// The daemon's pid file. Removed when dropped.
#[derive(Debug)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// Writes the current process id to `path`.
    ///
    /// Fails with [`ConfigError::AlreadyRunning`] if the file names another
    /// live process. A stale or unreadable pid is overwritten.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let own = std::process::id() as i32;
        if let Ok(pid) = read_pid(&path) {
            if pid != own && process_alive(pid) {
                return Err(ConfigError::AlreadyRunning { pid, path });
            }
            tracing::debug!(pid, path = %path.display(), "replacing stale pid file");
        }
        write_locked(&path, &format!("{own}\n"))?;
        tracing::debug!(path = %path.display(), "wrote pid file");
        Ok(Self { path })
    }

    /// Location of the pid file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for PidFile {
    fn drop(&mut self) {
        // Leave the file alone if another process has taken it over.
        if read_pid(&self.path).ok() != Some(std::process::id() as i32) {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not remove pid file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_active_preset_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".PEDAL");
        assert_eq!(read_active_preset(&path).unwrap(), None);

        write_active_preset(&path, PresetName::C).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "C\n");
        assert_eq!(read_active_preset(&path).unwrap(), Some(PresetName::C));

        write_active_preset(&path, PresetName::A).unwrap();
        assert_eq!(read_active_preset(&path).unwrap(), Some(PresetName::A));
    }

    #[test]
    fn test_shorter_write_truncates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".PEDAL");
        fs::write(&path, "garbage that is long\n").unwrap();
        write_active_preset(&path, PresetName::B).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "B\n");
    }

    #[test]
    fn test_invalid_active_preset() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".PEDAL");
        fs::write(&path, "Z\n").unwrap();
        assert!(matches!(
            read_active_preset(&path),
            Err(ConfigError::InvalidState { ref content, .. }) if content == "Z"
        ));
    }

    #[test]
    fn test_pid_file_lifecycle() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".driver.pid");
        {
            let pid_file = PidFile::create(&path).unwrap();
            assert_eq!(pid_file.path(), path);
            assert_eq!(read_pid(&path).unwrap(), std::process::id() as i32);
            assert!(daemon_alive(&path).unwrap());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_pid_file_refuses_live_daemon() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".driver.pid");
        let other = std::os::unix::process::parent_id() as i32;
        fs::write(&path, format!("{other}\n")).unwrap();

        let err = PidFile::create(&path).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyRunning { pid, .. } if pid == other));
        assert_eq!(read_pid(&path).unwrap(), other);
    }

    #[test]
    fn test_pid_file_replaces_stale_pid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".driver.pid");
        fs::write(&path, format!("{}\n", i32::MAX)).unwrap();

        let pid_file = PidFile::create(&path).unwrap();
        assert_eq!(read_pid(&path).unwrap(), std::process::id() as i32);
        drop(pid_file);
        assert!(!path.exists());
    }

    #[test]
    fn test_pid_file_drop_keeps_foreign_pid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".driver.pid");
        let pid_file = PidFile::create(&path).unwrap();
        fs::write(&path, format!("{}\n", i32::MAX)).unwrap();

        drop(pid_file);
        assert_eq!(read_pid(&path).unwrap(), i32::MAX);
    }

    #[test]
    fn test_bad_pid_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".driver.pid");
        fs::write(&path, "not-a-pid\n").unwrap();
        assert!(matches!(read_pid(&path), Err(ConfigError::InvalidState { .. })));
        fs::write(&path, "0\n").unwrap();
        assert!(read_pid(&path).is_err());
    }

    #[test]
    fn test_reload_without_pid_file() {
        let temp = TempDir::new().unwrap();
        let err = request_reload(temp.path().join(".driver.pid")).unwrap_err();
        assert!(err.is_not_found());
    }
}
