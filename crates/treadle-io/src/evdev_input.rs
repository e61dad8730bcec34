//! Linux evdev footswitch reader.
//!
//! The footswitch shows up as a keyboard. A reader thread blocks on the
//! device; after each batch of events it snapshots the held-key state
//! (`EVIOCGKEY`) and sends it as one sample.
//!
//! Enable with: `cargo build --features evdev`

use std::path::Path;
use std::thread::{self, JoinHandle};

use evdev::Device;
use treadle_platform::{DeviceError, KeyBitmap, KeyCode};

use crate::channel::SampleSender;

/// Opens `path` and starts a reader thread feeding `sender`.
///
/// Fails immediately if the device cannot be opened. Later read failures
/// are delivered through the channel and end the thread.
pub fn spawn_evdev_reader(path: impl AsRef<Path>, sender: SampleSender) -> Result<JoinHandle<()>, DeviceError> {
    let device_name = path.as_ref().display().to_string();
    let read_error = |reason: String| DeviceError::Read {
        device: device_name.clone(),
        reason,
    };

    let mut device = Device::open(path.as_ref()).map_err(|e| read_error(e.to_string()))?;
    tracing::info!(
        device = %device_name,
        name = device.name().unwrap_or("unnamed"),
        "opened footswitch"
    );

    let thread_name = device_name.clone();
    thread::Builder::new()
        .name("treadle-evdev".into())
        .spawn(move || {
            loop {
                if let Err(e) = device.fetch_events().map(Iterator::count) {
                    sender.fail(DeviceError::Read {
                        device: thread_name,
                        reason: e.to_string(),
                    });
                    return;
                }
                let held = match device.get_key_state() {
                    Ok(keys) => keys.iter().map(|key| KeyCode::new(key.code())).collect::<KeyBitmap>(),
                    Err(e) => {
                        sender.fail(DeviceError::Read {
                            device: thread_name,
                            reason: e.to_string(),
                        });
                        return;
                    }
                };
                if !sender.send(held) {
                    return;
                }
            }
        })
        .map_err(|e| read_error(e.to_string()))
}
