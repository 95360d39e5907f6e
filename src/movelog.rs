use std::fmt;

use crate::types::{Move, Piece, Position};

/// A move together with the piece that made it, as it was before moving
/// (a promoting pawn is logged as a pawn).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogEntry {
    pub mv: Move,
    pub piece: Piece,
}

impl LogEntry {
    pub fn new(mv: Move, piece: Piece) -> Self {
        Self { mv, piece }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.piece.to_human(), self.mv)
    }
}

/// Append-only history of the moves played in a game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveLog {
    entries: Vec<LogEntry>,
}

impl MoveLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_move(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    /// Forget the whole history. Only for when the board is replaced wholesale.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn last_entry(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Has any move in this game started from `pos`. A piece that left its square
    /// and came back has still moved.
    pub fn has_moved_from(&self, pos: Position) -> bool {
        self.entries.iter().any(|entry| entry.mv.start() == pos)
    }

    /// Has any move in this game ended on `pos`, e.g. by capturing what stood there
    pub fn has_moved_to(&self, pos: Position) -> bool {
        self.entries.iter().any(|entry| entry.mv.end() == pos)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for MoveLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(f, "{}. {}", i + 1, entry)?;
        }
        Ok(())
    }
}
