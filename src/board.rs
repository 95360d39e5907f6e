use std::fmt;

use once_cell::sync::Lazy;

use crate::error::ParseError;
use crate::types::*;

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

static STARTING_BOARD: Lazy<Board> = Lazy::new(|| {
    let mut board = Board::empty();
    board.reset_board();
    board
});

/// 8x8 grid of optional pieces.
///
/// This is deliberately dumb: adding and removing pieces performs no rule checking
/// at all, so the same primitives serve real moves and the throwaway copies the
/// legality filter plays on. `Clone` gives a fully independent board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    // squares[rank - 1][file - 1]
    squares: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    pub fn empty() -> Board {
        Board {
            squares: [[None; 8]; 8],
        }
    }

    /// The standard 32-piece initial position
    pub fn starting() -> Board {
        STARTING_BOARD.clone()
    }

    /// Parse the piece placement field of a FEN record. Any fields after the first
    /// (side to move, castling, ...) are ignored: the engine derives those from the
    /// game rather than trusting the record.
    pub fn from_fen(fen_string: &str) -> Result<Board, ParseError> {
        let placement = fen_string.split_whitespace().next().unwrap_or("");
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != BOARD_SIDE_LENGTH as usize {
            return Err(ParseError::WrongRankCount(ranks.len()));
        }

        let mut board = Board::empty();
        for (rank, rank_data) in (1..=BOARD_SIDE_LENGTH).rev().zip(ranks) {
            let mut file = 1;
            for piece_char in rank_data.chars() {
                if let Some(skip) = piece_char.to_digit(10).filter(|d| (1..=8).contains(d)) {
                    // file is at most 9 here, so this cannot overflow
                    file += skip as u8;
                    if file > BOARD_SIDE_LENGTH + 1 {
                        return Err(ParseError::WrongFileCount {
                            rank,
                            files: file - 1,
                        });
                    }
                } else {
                    let piece =
                        Piece::from_char(piece_char).ok_or(ParseError::UnexpectedChar(piece_char))?;
                    let pos = Position::try_new(rank, file)
                        .ok_or(ParseError::WrongFileCount { rank, files: file })?;
                    board.add_piece(pos, piece);
                    file += 1;
                }
            }
            if file != BOARD_SIDE_LENGTH + 1 {
                return Err(ParseError::WrongFileCount {
                    rank,
                    files: file - 1,
                });
            }
        }
        Ok(board)
    }

    /// Piece placement field of a FEN record for this board
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (1..=BOARD_SIDE_LENGTH).rev() {
            let mut empty = 0;
            for file in 1..=BOARD_SIDE_LENGTH {
                match self.get_piece(Position::new(rank, file)) {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 1 {
                fen.push('/');
            }
        }
        fen
    }

    /// Put `piece` on `pos`, replacing whatever was there
    pub fn add_piece(&mut self, pos: Position, piece: Piece) {
        self.squares[pos.rank() as usize - 1][pos.file() as usize - 1] = Some(piece);
    }

    /// Clear `pos`, returning the piece that stood there
    pub fn remove_piece(&mut self, pos: Position) -> Option<Piece> {
        self.squares[pos.rank() as usize - 1][pos.file() as usize - 1].take()
    }

    pub fn get_piece(&self, pos: Position) -> Option<Piece> {
        self.squares[pos.rank() as usize - 1][pos.file() as usize - 1]
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.get_piece(pos).is_some()
    }

    fn clear_board(&mut self) {
        self.squares = [[None; 8]; 8];
    }

    /// Set the board to the position every game of chess starts from
    pub fn reset_board(&mut self) {
        self.clear_board();
        for (file, piece_type) in (1..=BOARD_SIDE_LENGTH).zip(BACK_RANK) {
            for color in [Color::White, Color::Black] {
                self.add_piece(
                    Position::new(color.back_rank(), file),
                    Piece::new(color, piece_type),
                );
                self.add_piece(
                    Position::new(color.pawn_starting_rank(), file),
                    Piece::new(color, PieceType::Pawn),
                );
            }
        }
    }

    /// Occupied squares with their pieces, rank by rank from a1
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        Position::all().filter_map(|pos| self.get_piece(pos).map(|piece| (pos, piece)))
    }

    /// Every square holding a king of `color`. Normally exactly one, but boards
    /// loaded from outside may have none or several.
    pub fn king_positions(&self, color: Color) -> Vec<Position> {
        self.pieces()
            .filter(|(_, p)| p.color == color && p.piece_type == PieceType::King)
            .map(|(pos, _)| pos)
            .collect()
    }

    pub fn draw_board(&self) -> String {
        let mut string = String::new();

        for r in (1..=BOARD_SIDE_LENGTH).rev() {
            string.push_str(&r.to_string());
            for f in 1..=BOARD_SIDE_LENGTH {
                let symbol = match self.get_piece(Position::new(r, f)) {
                    Some(p) => p.to_symbol(),
                    None => ".",
                };
                string = format!("{} {}", string, symbol);
            }
            string.push('\n');
        }
        string.push_str("  a b c d e f g h\n");
        string
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.draw_board())
    }
}
