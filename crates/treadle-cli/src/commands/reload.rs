//! Out-of-band reload trigger.

use anyhow::Context;
use clap::Args;
use treadle_config::request_reload;

use super::common::{GlobalArgs, Settings};

#[derive(Args)]
pub struct ReloadArgs {}

pub fn run(_args: ReloadArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    let pid_path = settings.layout.pid_path();
    let pid = request_reload(&pid_path)
        .with_context(|| format!("cannot signal the daemon recorded in {}", pid_path.display()))?;
    println!("Reload requested (pid {pid})");
    Ok(())
}
