//! Pedal boards.
//!
//! A board assigns pedal files to the three switches. Boards are listed in
//! `PEDALS/.LIST`, one per line:
//!
//! ```text
//! # name: pedal-for-A pedal-for-B pedal-for-C
//! blues: Clean Overdrive Delay
//! noise: Fuzz Fuzz Bypass
//! ```
//!
//! Selecting a board re-points the `PEDALS/A`, `B`, `C` symlinks at its
//! pedal files. A running daemon picks the change up on its next reload.

use std::fs;
use std::path::Path;

use treadle_core::PresetName;

use crate::error::ConfigError;
use crate::paths::Layout;

/// A named assignment of pedal files to switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Board name.
    pub name: String,
    /// Pedal file names, in switch order. At most three.
    pub pedals: Vec<String>,
}

impl Board {
    /// The pedal file each switch will load, in switch order.
    pub fn assignments(&self) -> impl Iterator<Item = (PresetName, &str)> {
        PresetName::ALL.into_iter().zip(self.pedals.iter().map(String::as_str))
    }
}

/// The boards in a `.LIST` file, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardList {
    boards: Vec<Board>,
}

impl BoardList {
    /// Parses `.LIST` contents. Blank lines and `#` lines are skipped.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut boards = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let syntax = || ConfigError::BoardSyntax {
                line: i + 1,
                content: line.to_owned(),
            };
            let (name, rest) = trimmed.split_once(':').ok_or_else(syntax)?;
            let name = name.trim();
            let pedals: Vec<String> = rest.split_whitespace().map(str::to_owned).collect();
            if name.is_empty() || pedals.is_empty() {
                return Err(syntax());
            }
            if pedals.len() > PresetName::COUNT {
                return Err(ConfigError::BoardTooLarge {
                    board: name.to_owned(),
                    pedals: pedals.len(),
                });
            }
            boards.push(Board {
                name: name.to_owned(),
                pedals,
            });
        }
        Ok(Self { boards })
    }

    /// Reads and parses a `.LIST` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::parse(&text)
    }

    /// Finds a board by name. The first match wins.
    pub fn get(&self, name: &str) -> Option<&Board> {
        self.boards.iter().find(|b| b.name == name)
    }

    /// Iterates over boards in file order.
    pub fn iter(&self) -> std::slice::Iter<'_, Board> {
        self.boards.iter()
    }

    /// Number of boards.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Returns true if the list has no boards.
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

/// Points the definition links of `layout` at `board`'s pedal files.
///
/// Every pedal file is checked before any link changes. Each link is
/// replaced by renaming a fresh symlink over it, so a concurrent reader sees
/// either the old pedal or the new one. Switches beyond the board's pedal
/// count keep their current definition.
#[cfg(unix)]
pub fn select_board(layout: &Layout, board: &Board) -> Result<(), ConfigError> {
    for (_, pedal) in board.assignments() {
        let path = layout.pedal_path(pedal);
        if !path.is_file() {
            return Err(ConfigError::PedalNotFound {
                board: board.name.clone(),
                path,
            });
        }
    }

    for (preset, pedal) in board.assignments() {
        let link = layout.definition_path(preset);
        let staging = layout.pedals_dir().join(format!(".{}.link", preset.file_name()));
        let _ = fs::remove_file(&staging);
        std::os::unix::fs::symlink(pedal, &staging).map_err(|e| ConfigError::write_file(&staging, e))?;
        fs::rename(&staging, &link).map_err(|e| ConfigError::write_file(&link, e))?;
        tracing::info!(board = %board.name, %preset, pedal, "linked pedal");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let list = BoardList::parse("# boards\n\nblues: Clean Overdrive Delay\n  noise :Fuzz  \n").unwrap();
        assert_eq!(list.len(), 2);
        let blues = list.get("blues").unwrap();
        assert_eq!(blues.pedals, vec!["Clean", "Overdrive", "Delay"]);
        let noise = list.get("noise").unwrap();
        assert_eq!(noise.pedals, vec!["Fuzz"]);
        assert_eq!(
            noise.assignments().collect::<Vec<_>>(),
            vec![(PresetName::A, "Fuzz")]
        );
        assert!(list.get("jazz").is_none());
    }

    #[test]
    fn test_missing_colon_is_syntax_error() {
        let err = BoardList::parse("ok: A\nbroken line\n").unwrap_err();
        assert!(matches!(err, ConfigError::BoardSyntax { line: 2, .. }));
    }

    #[test]
    fn test_empty_board_is_syntax_error() {
        assert!(matches!(
            BoardList::parse("empty:\n"),
            Err(ConfigError::BoardSyntax { line: 1, .. })
        ));
        assert!(matches!(
            BoardList::parse(": Fuzz\n"),
            Err(ConfigError::BoardSyntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_too_many_pedals() {
        let err = BoardList::parse("big: a b c d\n").unwrap_err();
        assert!(matches!(err, ConfigError::BoardTooLarge { pedals: 4, .. }));
    }
}
