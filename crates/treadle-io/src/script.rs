//! Scripted footswitch input for rehearsals and tests.
//!
//! One sample per line, listing the key codes held at that instant:
//!
//! ```text
//! # press A, hold it, release, press B
//! 0x1e
//! 30
//!
//! 0x30
//! ```
//!
//! Codes are decimal or `0x` hex, at most `KEY_MAX` (0x2ff), separated by whitespace or commas. An
//! empty line is a sample with nothing held; lines starting with `#` are
//! skipped.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use treadle_platform::{DeviceError, KeyBitmap, KeyCode, keys};

use crate::channel::SampleSender;

/// A token in a script line that is not a key code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid key code '{0}'")]
pub struct InvalidKeyCode(pub String);

fn parse_code(token: &str) -> Result<KeyCode, InvalidKeyCode> {
    let parsed = match token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => token.parse::<u16>(),
    };
    parsed
        .ok()
        .filter(|&code| code <= keys::KEY_MAX.raw())
        .map(KeyCode::new)
        .ok_or_else(|| InvalidKeyCode(token.to_owned()))
}

/// Parses one script line. Returns `Ok(None)` for comment lines.
pub fn parse_sample_line(line: &str) -> Result<Option<KeyBitmap>, InvalidKeyCode> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') {
        return Ok(None);
    }
    trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(parse_code)
        .collect::<Result<KeyBitmap, _>>()
        .map(Some)
}

/// Reads a script on a background thread, feeding `sender`.
///
/// The sender is dropped when the script ends, so the input reports
/// end-of-input once the queued samples are consumed. A read or parse
/// failure is delivered as [`DeviceError::Read`] naming `name` and the line.
pub fn spawn_script_reader<R>(name: impl Into<String>, reader: R, sender: SampleSender) -> io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    let name = name.into();
    thread::Builder::new()
        .name("treadle-script".into())
        .spawn(move || {
            for (i, line) in reader.lines().enumerate() {
                let failure = |reason: String| DeviceError::Read {
                    device: name.clone(),
                    reason: format!("line {}: {reason}", i + 1),
                };
                let sample = match line {
                    Ok(line) => parse_sample_line(&line).map_err(|e| failure(e.to_string())),
                    Err(e) => Err(failure(e.to_string())),
                };
                let delivered = match sample {
                    Ok(Some(bitmap)) => sender.send(bitmap),
                    Ok(None) => true,
                    Err(error) => {
                        sender.fail(error);
                        false
                    }
                };
                if !delivered {
                    return;
                }
            }
            tracing::debug!(script = %name, "script finished");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channel_input;
    use std::io::Cursor;
    use std::time::Duration;
    use treadle_platform::InputSource;

    #[test]
    fn test_parse_decimal_and_hex() {
        let bitmap = parse_sample_line("30 0x30,0X2E").unwrap().unwrap();
        let codes: Vec<_> = bitmap.iter().collect();
        assert_eq!(codes, vec![keys::KEY_A, keys::KEY_C, keys::KEY_B]);
    }

    #[test]
    fn test_empty_line_is_release() {
        assert_eq!(parse_sample_line("   "), Ok(Some(KeyBitmap::new())));
    }

    #[test]
    fn test_comment_is_skipped() {
        assert_eq!(parse_sample_line("# hold A"), Ok(None));
    }

    #[test]
    fn test_bad_token() {
        assert_eq!(parse_sample_line("0x1e KEY_B"), Err(InvalidKeyCode("KEY_B".into())));
        assert!(parse_sample_line("70000").is_err());
    }

    #[test]
    fn test_code_above_key_max_rejected() {
        assert!(parse_sample_line("0x2ff").unwrap().unwrap().contains(keys::KEY_MAX));
        assert_eq!(parse_sample_line("0x1e 0x300"), Err(InvalidKeyCode("0x300".into())));
        assert_eq!(parse_sample_line("768"), Err(InvalidKeyCode("768".into())));
    }

    #[test]
    fn test_reader_feeds_channel_then_ends() {
        let (tx, mut input) = channel_input();
        let script = Cursor::new("0x1e\n# skip\n\n0x30\n");
        spawn_script_reader("test", script, tx).unwrap().join().unwrap();

        let wait = Duration::from_millis(50);
        assert!(input.sample_key_bitmap(wait).unwrap().unwrap().contains(keys::KEY_A));
        assert!(input.sample_key_bitmap(wait).unwrap().unwrap().is_empty());
        assert!(input.sample_key_bitmap(wait).unwrap().unwrap().contains(keys::KEY_B));
        assert_eq!(input.sample_key_bitmap(wait), Err(DeviceError::EndOfInput));
    }

    #[test]
    fn test_reader_reports_bad_line() {
        let (tx, mut input) = channel_input();
        spawn_script_reader("rehearsal.txt", Cursor::new("0x1e\nbogus\n0x30\n"), tx)
            .unwrap()
            .join()
            .unwrap();

        let wait = Duration::from_millis(50);
        assert!(input.sample_key_bitmap(wait).unwrap().is_some());
        assert_eq!(
            input.sample_key_bitmap(wait),
            Err(DeviceError::Read {
                device: "rehearsal.txt".into(),
                reason: "line 2: invalid key code 'bogus'".into(),
            })
        );
    }
}
