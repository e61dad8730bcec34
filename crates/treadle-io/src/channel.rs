//! Channel-backed footswitch input.
//!
//! Device readers run on their own threads and push samples into a
//! [`SampleSender`]. The control thread waits on the matching
//! [`ChannelInput`], which also listens to a [`Waker`] so signal handlers can
//! cut a wait short.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, select, unbounded};
use treadle_platform::{DeviceError, InputSource, KeyBitmap};

type Sample = Result<KeyBitmap, DeviceError>;

/// Producer half: used by reader threads.
#[derive(Debug, Clone)]
pub struct SampleSender(Sender<Sample>);

impl SampleSender {
    /// Delivers a sample. Returns false if the input has been dropped.
    pub fn send(&self, sample: KeyBitmap) -> bool {
        self.0.send(Ok(sample)).is_ok()
    }

    /// Delivers a device failure. Returns false if the input has been dropped.
    pub fn fail(&self, error: DeviceError) -> bool {
        self.0.send(Err(error)).is_ok()
    }
}

/// Interrupts a pending [`ChannelInput`] wait.
#[derive(Debug, Clone)]
pub struct Waker(Sender<()>);

impl Waker {
    /// Wakes the waiting control thread. Wakes that arrive while one is
    /// already pending collapse into it.
    pub fn wake(&self) {
        let _ = self.0.try_send(());
    }
}

/// Consumer half: an [`InputSource`] for the control thread.
///
/// Once every [`SampleSender`] is dropped and the queue is drained, waits
/// report [`DeviceError::EndOfInput`].
#[derive(Debug)]
pub struct ChannelInput {
    samples: Receiver<Sample>,
    wake_rx: Receiver<()>,
    wake_tx: Sender<()>,
}

/// Creates a connected sender/input pair.
pub fn channel_input() -> (SampleSender, ChannelInput) {
    let (tx, rx) = unbounded();
    let (wake_tx, wake_rx) = bounded(1);
    (
        SampleSender(tx),
        ChannelInput {
            samples: rx,
            wake_rx,
            wake_tx,
        },
    )
}

impl ChannelInput {
    /// A handle that interrupts waits on this input.
    pub fn waker(&self) -> Waker {
        Waker(self.wake_tx.clone())
    }
}

impl InputSource for ChannelInput {
    fn sample_key_bitmap(&mut self, timeout: Duration) -> Result<Option<KeyBitmap>, DeviceError> {
        select! {
            recv(self.samples) -> msg => match msg {
                Ok(sample) => sample.map(Some),
                Err(_) => Err(DeviceError::EndOfInput),
            },
            recv(self.wake_rx) -> _ => Ok(None),
            default(timeout) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Instant;
    use treadle_platform::keys;

    const WAIT: Duration = Duration::from_millis(20);

    #[test]
    fn test_delivers_samples_in_order() {
        let (tx, mut input) = channel_input();
        assert!(tx.send(KeyBitmap::from_codes([keys::KEY_A])));
        assert!(tx.send(KeyBitmap::from_codes([keys::KEY_B])));
        let first = input.sample_key_bitmap(WAIT).unwrap().unwrap();
        let second = input.sample_key_bitmap(WAIT).unwrap().unwrap();
        assert!(first.contains(keys::KEY_A));
        assert!(second.contains(keys::KEY_B));
    }

    #[test]
    fn test_timeout_returns_none() {
        let (_tx, mut input) = channel_input();
        assert_eq!(input.sample_key_bitmap(WAIT), Ok(None));
    }

    #[test]
    fn test_wake_interrupts_long_wait() {
        let (_tx, mut input) = channel_input();
        let waker = input.waker();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            waker.wake();
        });
        let started = Instant::now();
        assert_eq!(input.sample_key_bitmap(Duration::from_secs(30)), Ok(None));
        assert!(started.elapsed() < Duration::from_secs(10));
        handle.join().unwrap();
    }

    #[test]
    fn test_repeated_wakes_collapse() {
        let (_tx, mut input) = channel_input();
        let waker = input.waker();
        waker.wake();
        waker.wake();
        waker.wake();
        assert_eq!(input.sample_key_bitmap(WAIT), Ok(None));
        // The extra wakes were dropped, so this wait runs to its timeout.
        let started = Instant::now();
        assert_eq!(input.sample_key_bitmap(WAIT), Ok(None));
        assert!(started.elapsed() >= WAIT);
    }

    #[test]
    fn test_device_failure_is_forwarded() {
        let (tx, mut input) = channel_input();
        tx.fail(DeviceError::Disconnected("unplugged".into()));
        assert_eq!(
            input.sample_key_bitmap(WAIT),
            Err(DeviceError::Disconnected("unplugged".into()))
        );
    }

    #[test]
    fn test_dropped_sender_ends_input_after_drain() {
        let (tx, mut input) = channel_input();
        tx.send(KeyBitmap::new());
        drop(tx);
        assert_eq!(input.sample_key_bitmap(WAIT), Ok(Some(KeyBitmap::new())));
        assert_eq!(input.sample_key_bitmap(WAIT), Err(DeviceError::EndOfInput));
    }
}
