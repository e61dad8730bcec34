//! Definition validation.

use std::collections::BTreeSet;

use clap::Args;
use treadle_core::{DefinitionSource, GraphRuntime, Preset, PresetName, parse_preset};

use super::common::{GlobalArgs, Settings, open_graph};

#[derive(Args)]
pub struct CheckArgs {
    /// Also check that every port exists in the live graph
    #[arg(long)]
    live: bool,
}

pub fn run(args: CheckArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    let source = settings.source();
    println!("Checking presets in {}", settings.layout.pedals_dir().display());

    let mut presets = Vec::new();
    let mut failures = 0;
    for name in PresetName::ALL {
        let parsed = source
            .read_lines(name)
            .and_then(|lines| parse_preset(name, lines, settings.config.duplicates));
        match parsed {
            Ok(preset) => {
                println!("  {name}: {} connection(s)", preset.len());
                presets.push(preset);
            }
            Err(e) => {
                println!("  {name}: {e}");
                failures += 1;
            }
        }
    }

    if args.live {
        let graph = open_graph(&settings.config.client_name)?;
        let missing = missing_ports(&*graph, &presets);
        for port in &missing {
            println!("  warning: port not in graph: {port}");
            tracing::warn!(port = %port, "port not in graph");
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} preset definition(s) failed to load");
    }
    println!("All presets OK");
    Ok(())
}

/// Ports named by `presets` that the graph does not list.
fn missing_ports(graph: &dyn GraphRuntime, presets: &[Preset]) -> BTreeSet<String> {
    let live: BTreeSet<String> = graph.list_ports(None, None).into_iter().collect();
    presets
        .iter()
        .flat_map(Preset::iter)
        .flat_map(|c| [c.source().as_str(), c.destination().as_str()])
        .filter(|port| !live.contains(*port))
        .map(str::to_owned)
        .collect()
}
