//! Transition preview.

use clap::Args;
use treadle_core::{ConnectionDiff, PresetName};

use super::common::{GlobalArgs, Settings};

#[derive(Args)]
pub struct DiffArgs {
    /// Preset switched away from (A, B or C)
    from: PresetName,

    /// Preset switched to (A, B or C)
    to: PresetName,
}

pub fn run(args: DiffArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    let store = settings.load_store()?;
    let changes = ConnectionDiff::between(store.get(args.from), store.get(args.to));

    println!("{} -> {}", args.from, args.to);
    if changes.is_empty() {
        println!("  no changes ({} shared)", changes.shared());
        return Ok(());
    }
    for connection in changes.to_add() {
        println!("  + {connection}");
    }
    for connection in changes.to_remove() {
        println!("  - {connection}");
    }
    println!("  {} shared", changes.shared());
    Ok(())
}
