//! Treadle CLI - footswitch-driven routing presets for a JACK graph.

mod commands;
mod daemon;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::common::GlobalArgs;

#[derive(Parser)]
#[command(name = "treadle")]
#[command(author, version, about = "Footswitch routing preset daemon", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the routing daemon
    Run(commands::run::RunArgs),

    /// Validate preset definitions
    Check(commands::check::CheckArgs),

    /// Show what switching between two presets would change
    Diff(commands::diff::DiffArgs),

    /// Show the active preset and whether the daemon is running
    Status(commands::status::StatusArgs),

    /// List and select pedal boards
    Boards(commands::boards::BoardsArgs),

    /// Ask the running daemon to reload its definitions
    Reload(commands::reload::ReloadArgs),

    /// List ports in the live graph
    Ports(commands::ports::PortsArgs),
}

fn init_tracing(level: Option<&str>) {
    let filter = level
        .map(EnvFilter::new)
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing_log::LogTracer::init().ok();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.log_level.as_deref());

    let global = cli.global;
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, &global),
        Commands::Check(args) => commands::check::run(args, &global),
        Commands::Diff(args) => commands::diff::run(args, &global),
        Commands::Status(args) => commands::status::run(args, &global),
        Commands::Boards(args) => commands::boards::run(args, &global),
        Commands::Reload(args) => commands::reload::run(args, &global),
        Commands::Ports(args) => commands::ports::run(args, &global),
    };

    if let Err(e) = &result {
        let message = format!("{e:#}");
        tracing::error!(error = %message, "fatal");
    }
    result
}
