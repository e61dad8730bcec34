//! Daemon status from its state files.

use clap::Args;
use serde::Serialize;
use treadle_config::{ConfigError, daemon_alive, read_active_preset, read_pid};
use treadle_core::PresetName;

use super::common::{GlobalArgs, Settings};

#[derive(Args)]
pub struct StatusArgs {
    /// Print machine-readable JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct Status {
    root: String,
    active: Option<PresetName>,
    pid: Option<i32>,
    running: bool,
}

pub fn run(args: StatusArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    let layout = &settings.layout;

    let active = read_active_preset(layout.active_preset_path())?;
    let pid = match read_pid(layout.pid_path()) {
        Ok(pid) => Some(pid),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e.into()),
    };
    let running = pid.is_some() && daemon_alive(layout.pid_path()).unwrap_or_else(|e: ConfigError| {
        tracing::debug!(error = %e, "could not check daemon liveness");
        false
    });

    let status = Status {
        root: layout.root().display().to_string(),
        active,
        pid,
        running,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("Root:    {}", status.root);
    match status.active {
        Some(preset) => println!("Active:  {preset}"),
        None => println!("Active:  (none)"),
    }
    match status.pid {
        Some(pid) if status.running => println!("Daemon:  running (pid {pid})"),
        Some(pid) => println!("Daemon:  not running (stale pid {pid})"),
        None => println!("Daemon:  not running"),
    }
    Ok(())
}
