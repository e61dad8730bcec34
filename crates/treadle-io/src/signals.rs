//! Process signal wiring for the daemon.
//!
//! - `SIGHUP` requests a preset reload.
//! - `SIGTERM` requests a clean shutdown.
//! - `SIGINT` (Ctrl+C) requests a clean shutdown through `ctrlc`.
//!
//! `SIGHUP` and `SIGTERM` share one listener thread and are dispatched by
//! signal number. `ctrlc` is built without its `termination` feature so it
//! only ever owns `SIGINT`.
//!
//! Handlers only set a flag and wake the control thread; all real work
//! happens on the control thread after its wait returns.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use signal_hook::consts::{SIGHUP, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use treadle_core::ReloadRequests;

use crate::Result;
use crate::channel::Waker;

/// A running `SIGHUP`/`SIGTERM` listener. Stopped by
/// [`SignalListener::close`] or drop.
pub struct SignalListener {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Stops listening and joins the listener thread.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Listens for `SIGHUP` (reload) and `SIGTERM` (shutdown).
pub fn install_signal_listener(
    requests: ReloadRequests,
    running: Arc<AtomicBool>,
    waker: Waker,
) -> Result<SignalListener> {
    let mut signals = Signals::new([SIGHUP, SIGTERM])?;
    let handle = signals.handle();
    let thread = thread::Builder::new()
        .name("treadle-signals".into())
        .spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGHUP => {
                        tracing::info!("SIGHUP received, reload requested");
                        requests.request();
                    }
                    SIGTERM => {
                        tracing::info!("SIGTERM received, shutting down");
                        running.store(false, Ordering::SeqCst);
                    }
                    other => tracing::debug!(signal = other, "ignoring signal"),
                }
                waker.wake();
            }
        })?;
    Ok(SignalListener {
        handle,
        thread: Some(thread),
    })
}

/// Clears `running` and wakes the control thread on SIGINT.
///
/// Can only be installed once per process.
pub fn install_interrupt_handler(running: Arc<AtomicBool>, waker: Waker) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        waker.wake();
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channel_input;
    use std::time::{Duration, Instant};
    use treadle_platform::InputSource;

    #[test]
    fn test_sighup_sets_reload_flag() {
        let (_tx, mut input) = channel_input();
        let requests = ReloadRequests::new();
        let running = Arc::new(AtomicBool::new(true));
        let listener = install_signal_listener(requests.clone(), Arc::clone(&running), input.waker()).unwrap();

        signal_hook::low_level::raise(SIGHUP).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !requests.is_pending() && Instant::now() < deadline {
            let _ = input.sample_key_bitmap(Duration::from_millis(50));
        }
        assert!(requests.take());
        assert!(running.load(Ordering::SeqCst));
        listener.close();
    }
}
