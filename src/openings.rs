//! Starting positions for engine matches: a built-in set of short opening
//! lines, or a FEN/EPD file with one position per line.

use std::path::Path;

use log::warn;

use crate::board::cozy::Position;
use crate::error::{EngineError, Result};

pub struct Opening {
    pub name: &'static str,
    pub moves: &'static [&'static str],
}

pub const BUILTIN: &[Opening] = &[
    Opening { name: "Italian Game", moves: &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5", "e1g1", "g8f6"] },
    Opening { name: "Ruy Lopez", moves: &["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5a4", "g8f6"] },
    Opening { name: "Queen's Gambit Declined", moves: &["d2d4", "d7d5", "c2c4", "e7e6", "b1c3", "g8f6", "c1g5", "f8e7"] },
    Opening { name: "Sicilian Dragon", moves: &["e2e4", "c7c5", "g1f3", "d7d6", "d2d4", "c5d4", "f3d4", "g8f6"] },
    Opening { name: "French Winawer", moves: &["e2e4", "e7e6", "d2d4", "d7d5", "b1c3", "f8b4", "e4e5", "c7c5"] },
    Opening { name: "King's Indian", moves: &["d2d4", "g8f6", "c2c4", "g7g6", "b1c3", "f8g7", "e2e4", "d7d6"] },
    Opening { name: "English", moves: &["c2c4", "e7e5", "b1c3", "g8f6", "g2g3", "d7d5", "c4d5", "f6d5"] },
    Opening { name: "Caro-Kann", moves: &["e2e4", "c7c6", "d2d4", "d7d5", "b1c3", "d5e4", "c3e4", "c8f5"] },
    Opening { name: "Nimzo-Indian", moves: &["d2d4", "g8f6", "c2c4", "e7e6", "b1c3", "f8b4", "e2e3", "e8g8"] },
    Opening { name: "Scandinavian", moves: &["e2e4", "d7d5", "e4d5", "d8d5", "b1c3", "d5a5", "d2d4", "g8f6"] },
    Opening { name: "Dutch", moves: &["d2d4", "f7f5", "g2g3", "g8f6", "f1g2", "e7e6", "g1f3", "f8e7"] },
    Opening { name: "London System", moves: &["d2d4", "d7d5", "g1f3", "g8f6", "c1f4", "c7c5", "e2e3", "b8c6"] },
];

impl Opening {
    pub fn position(&self) -> Result<Position> {
        let moves: Vec<String> = self.moves.iter().map(|m| m.to_string()).collect();
        Position::set_from_start_and_moves(&moves)
    }
}

pub fn builtin_positions() -> Result<Vec<Position>> {
    BUILTIN.iter().map(Opening::position).collect()
}

/// Parses FEN or EPD lines (EPD gets halfmove/fullmove counters appended).
/// Blank lines and `#` comments are skipped; unparseable lines are logged
/// and skipped.
pub fn parse_positions(text: &str) -> Vec<Position> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let raw = line.trim();
        if raw.is_empty() || raw.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = raw.split_whitespace().collect();
        let counters = parts.len() >= 6 && parts[4].parse::<u32>().is_ok() && parts[5].parse::<u32>().is_ok();
        let fen = if counters {
            parts[0..6].join(" ")
        } else if parts.len() >= 4 {
            format!("{} 0 1", parts[0..4].join(" "))
        } else {
            raw.to_string()
        };
        match Position::from_fen(&fen) {
            Ok(pos) => out.push(pos),
            Err(e) => warn!("skipping opening line {}: {}", lineno + 1, e),
        }
    }
    out
}

pub fn load_positions<P: AsRef<Path>>(path: P) -> Result<Vec<Position>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io { path: path.to_path_buf(), source })?;
    Ok(parse_positions(&text))
}
