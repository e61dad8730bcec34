//! Live graph port listing.

use clap::Args;

use super::common::{GlobalArgs, Settings, open_graph};

#[derive(Args)]
pub struct PortsArgs {
    /// Only ports whose name matches this pattern
    #[arg(long, value_name = "PATTERN")]
    owner: Option<String>,

    /// Only ports whose type matches this pattern
    #[arg(long = "type", value_name = "PATTERN")]
    port_type: Option<String>,
}

pub fn run(args: PortsArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    let graph = open_graph(&settings.config.client_name)?;
    let ports = graph.list_ports(args.owner.as_deref(), args.port_type.as_deref());
    if ports.is_empty() {
        println!("(no matching ports)");
    }
    for port in ports {
        println!("{port}");
    }
    Ok(())
}
