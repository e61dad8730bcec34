//! The routing daemon.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::Args;
use treadle_config::PidFile;
use treadle_core::{DuplicatePolicy, GraphRuntime, MemoryGraph, ReloadCoordinator, ReloadPolicy, RoutingEngine};
use treadle_io::{ChannelInput, SampleSender, channel_input};
use treadle_platform::SwitchDebouncer;

use super::common::{GlobalArgs, Settings, open_graph};
use crate::daemon::{Daemon, DaemonExit};

#[derive(Args)]
pub struct RunArgs {
    /// Route an in-memory graph instead of the live server
    #[arg(long)]
    dry_run: bool,

    /// Read key samples from a file ("-" for stdin) instead of the footswitch
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Footswitch input device (overrides the config file)
    #[arg(long, value_name = "PATH")]
    device: Option<PathBuf>,

    /// Seconds to wait for input before logging a heartbeat
    #[arg(long, value_name = "SECS")]
    heartbeat: Option<u64>,

    /// Rewire the active preset as soon as its definition is reloaded
    #[arg(long)]
    immediate_reload: bool,

    /// Keep the first of repeated connections instead of rejecting the file
    #[arg(long)]
    collapse_duplicates: bool,
}

pub fn run(args: RunArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load(global)?;
    if let Some(device) = &args.device {
        settings.config.input_device.clone_from(device);
    }
    if let Some(secs) = args.heartbeat {
        settings.config.heartbeat_secs = secs;
    }
    if args.immediate_reload {
        settings.config.reload_policy = ReloadPolicy::Immediate;
    }
    if args.collapse_duplicates {
        settings.config.duplicates = DuplicatePolicy::Collapse;
    }

    let store = settings.load_store()?;

    let (sender, input) = channel_input();
    let _reader = start_input(&args, &settings, sender)?;

    if args.dry_run {
        let engine = drive(RoutingEngine::new(MemoryGraph::new(), store), input, &settings)?;
        print_dry_run(&engine);
    } else {
        let graph = open_graph(&settings.config.client_name)?;
        drive(RoutingEngine::new(graph, store), input, &settings)?;
    }
    Ok(())
}

fn start_input(
    args: &RunArgs,
    settings: &Settings,
    sender: SampleSender,
) -> anyhow::Result<std::thread::JoinHandle<()>> {
    match &args.script {
        Some(path) if path.as_os_str() == "-" => spawn_script("stdin", BufReader::new(io::stdin()), sender),
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open script {}", path.display()))?;
            spawn_script(&path.display().to_string(), BufReader::new(file), sender)
        }
        None => open_device(settings, sender),
    }
}

fn spawn_script<R>(name: &str, reader: R, sender: SampleSender) -> anyhow::Result<std::thread::JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    tracing::info!(script = name, "reading key samples from script");
    Ok(treadle_io::spawn_script_reader(name, reader, sender)?)
}

#[cfg(feature = "evdev")]
fn open_device(settings: &Settings, sender: SampleSender) -> anyhow::Result<std::thread::JoinHandle<()>> {
    Ok(treadle_io::spawn_evdev_reader(&settings.config.input_device, sender)?)
}

#[cfg(not(feature = "evdev"))]
fn open_device(settings: &Settings, _sender: SampleSender) -> anyhow::Result<std::thread::JoinHandle<()>> {
    anyhow::bail!(
        "cannot open {}: built without evdev support (rebuild with --features evdev, or use --script)",
        settings.config.input_device.display()
    )
}

fn drive<G: GraphRuntime>(
    engine: RoutingEngine<G>,
    input: ChannelInput,
    settings: &Settings,
) -> anyhow::Result<RoutingEngine<G>> {
    let engine = engine
        .with_reload_policy(settings.config.reload_policy)
        .with_duplicate_policy(settings.config.duplicates);

    let coordinator = ReloadCoordinator::new(settings.source());
    let running = Arc::new(AtomicBool::new(true));
    let _signals = treadle_io::install_signal_listener(coordinator.requests(), Arc::clone(&running), input.waker())?;
    treadle_io::install_interrupt_handler(Arc::clone(&running), input.waker())?;

    // Written after the handlers: once the file exists, SIGHUP means reload.
    let _pid_file = PidFile::create(settings.layout.pid_path())?;

    let heartbeat = settings.config.heartbeat();
    let debouncer = SwitchDebouncer::new(settings.config.switches.to_switch_map());
    let mut daemon = Daemon::new(engine, debouncer, input, coordinator)
        .with_heartbeat(heartbeat)
        .with_running(running)
        .with_state_file(settings.layout.active_preset_path());

    match daemon.run()? {
        DaemonExit::Shutdown => tracing::info!("shutting down"),
        DaemonExit::EndOfInput => tracing::info!("input finished"),
    }
    Ok(daemon.into_engine())
}

fn print_dry_run(engine: &RoutingEngine<MemoryGraph>) {
    match engine.active() {
        Some(preset) => println!("Active preset: {preset}"),
        None => println!("Active preset: (none)"),
    }
    let links = engine.graph().links();
    println!("Connections ({}):", links.len());
    for (source, destination) in links {
        println!("  {source} -> {destination}");
    }
}
