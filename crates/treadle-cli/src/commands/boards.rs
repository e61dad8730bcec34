//! Pedal board commands.
//!
//! A board names up to three pedal files from `PEDALS/`. Selecting one
//! re-points the switch definitions at those files and asks a running
//! daemon to reload.

use anyhow::Context;
use clap::{Args, Subcommand};
use treadle_config::{BoardList, Layout, request_reload, select_board};

use super::common::{GlobalArgs, Settings};

#[derive(Args)]
pub struct BoardsArgs {
    #[command(subcommand)]
    command: BoardsCommand,
}

#[derive(Subcommand)]
enum BoardsCommand {
    /// List the boards in PEDALS/.LIST
    List,

    /// Load a board onto the footswitches
    Select {
        /// Board name
        name: String,

        /// Do not signal the daemon
        #[arg(long)]
        no_reload: bool,
    },
}

pub fn run(args: BoardsArgs, global: &GlobalArgs) -> anyhow::Result<()> {
    let settings = Settings::load(global)?;
    match args.command {
        BoardsCommand::List => list_boards(&settings.layout),
        BoardsCommand::Select { name, no_reload } => select(&settings.layout, &name, no_reload),
    }
}

fn load_boards(layout: &Layout) -> anyhow::Result<BoardList> {
    let path = layout.board_list_path();
    BoardList::load(&path).with_context(|| format!("cannot read board list {}", path.display()))
}

fn list_boards(layout: &Layout) -> anyhow::Result<()> {
    let boards = load_boards(layout)?;
    println!("Pedal Boards:");
    println!("=============");
    if boards.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for board in boards.iter() {
        let pedals = board
            .assignments()
            .map(|(preset, pedal)| format!("{preset}={pedal}"))
            .collect::<Vec<_>>()
            .join("  ");
        println!("  {:16} {}", board.name, pedals);
    }
    Ok(())
}

fn select(layout: &Layout, name: &str, no_reload: bool) -> anyhow::Result<()> {
    let boards = load_boards(layout)?;
    let board = boards
        .get(name)
        .ok_or_else(|| treadle_config::ConfigError::BoardNotFound(name.to_owned()))?;
    select_board(layout, board)?;
    println!("Selected board '{}'", board.name);

    if no_reload {
        return Ok(());
    }
    match request_reload(layout.pid_path()) {
        Ok(pid) => println!("Reload requested (pid {pid})"),
        Err(e) if e.is_not_found() => println!("Daemon not running; definitions apply at next start"),
        Err(e) => return Err(e).context("board selected but the daemon could not be signalled"),
    }
    Ok(())
}
