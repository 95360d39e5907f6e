//! Error types for the rules engine
//!
//! `GameError` is what a rejected `Game::make_move` returns; the game is left
//! untouched whenever one is produced. `ParseError` covers the text formats the
//! engine accepts for interop (square names and FEN piece placement).

use thiserror::Error;

use crate::types::Move;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// The start square of the move is empty
    #[error("attempted move {0} moves a nonexistent piece")]
    NonexistentPiece(Move),

    /// The piece belongs to the side that is not on turn
    #[error("attempted move {0} moves out of turn")]
    OutOfTurn(Move),

    /// Bad geometry, leaves the own king in check, or breaks a castling / en passant rule
    #[error("attempted move {0} is invalid for the piece or endangers the king")]
    IllegalMove(Move),

    #[error("cannot move, the game is over")]
    GameOver,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid square `{0}`, expected a file a-h followed by a rank 1-8")]
    InvalidSquare(String),

    #[error("FEN placement must have 8 ranks separated by `/`, found {0}")]
    WrongRankCount(usize),

    #[error("FEN rank {rank} describes {files} files instead of 8")]
    WrongFileCount { rank: u8, files: u8 },

    #[error("unexpected character `{0}` in FEN placement")]
    UnexpectedChar(char),
}
