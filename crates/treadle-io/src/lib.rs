//! Concrete collaborators for the treadle daemon.
//!
//! This crate provides:
//!
//! - **Input plumbing**: [`channel_input`] pairs a [`SampleSender`] for reader
//!   threads with a [`ChannelInput`] the control thread waits on; a
//!   [`Waker`] interrupts the wait
//! - **Scripted input**: [`spawn_script_reader`] replays key samples from text
//! - **Signals**: `SIGHUP` reload requests, `SIGTERM`/`SIGINT` shutdown
//! - **JACK** (feature `jack`): [`JackGraph`], the production graph runtime
//! - **evdev** (feature `evdev`): [`spawn_evdev_reader`] for the footswitch
//!
//! ## Wiring
//!
//! ```text
//!  evdev / script thread ──samples──▶ ChannelInput ◀──wake── signal threads
//!                                         │                      │
//!                                         ▼                      ▼
//!                                  control thread ◀──flag── ReloadRequests
//! ```

mod channel;
mod script;
mod signals;

#[cfg(feature = "evdev")]
mod evdev_input;
#[cfg(feature = "jack")]
mod jack_graph;

pub use channel::{ChannelInput, SampleSender, Waker, channel_input};
pub use script::{InvalidKeyCode, parse_sample_line, spawn_script_reader};
pub use signals::{SignalListener, install_interrupt_handler, install_signal_listener};

#[cfg(feature = "evdev")]
pub use evdev_input::spawn_evdev_reader;
#[cfg(feature = "jack")]
pub use jack_graph::JackGraph;

/// Error types for signal and thread setup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Installing a signal listener or spawning a thread failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Installing the SIGINT handler failed.
    #[error("shutdown handler error: {0}")]
    Shutdown(#[from] ctrlc::Error),
}

/// Convenience result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
