use std::fmt;
use std::str::FromStr;

use itertools::iproduct;

use crate::error::ParseError;

pub const BOARD_SIDE_LENGTH: u8 = 8;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// Parse the side-to-move letter used in FEN records.
    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' | 'W' => Some(Color::White),
            'b' | 'B' => Some(Color::Black),
            _ => None,
        }
    }

    fn from_case(c: char) -> Color {
        if c.is_uppercase() {
            Color::White
        } else {
            Color::Black
        }
    }

    pub fn other_color(&self) -> Color {
        if *self == Color::White {
            Color::Black
        } else {
            Color::White
        }
    }

    pub fn to_human(&self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }

    /// Rank on which this color's king and rooks start
    pub fn back_rank(&self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => BOARD_SIDE_LENGTH,
        }
    }

    /// Starting rank for pawns of this color
    pub fn pawn_starting_rank(&self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => BOARD_SIDE_LENGTH - 1,
        }
    }

    /// Rank on which pawns of this color promote
    pub fn promotion_rank(&self) -> u8 {
        self.other_color().back_rank()
    }

    /// Direction of pawn movement for this color
    pub fn pawn_direction(&self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_human())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl PieceType {
    pub fn from_char(c: char) -> Option<PieceType> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceType::Pawn),
            'r' => Some(PieceType::Rook),
            'n' => Some(PieceType::Knight),
            'b' => Some(PieceType::Bishop),
            'q' => Some(PieceType::Queen),
            'k' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn to_human(&self) -> &'static str {
        match self {
            Self::Pawn => "pawn",
            Self::Rook => "rook",
            Self::Knight => "knight",
            Self::Bishop => "bishop",
            Self::Queen => "queen",
            Self::King => "king",
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Self::Pawn => 'P',
            Self::Rook => 'R',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Queen => 'Q',
            Self::King => 'K',
        }
    }
}

/// Every pawn move onto the far rank expands into one move per entry here.
pub const PIECES_CAN_PROMOTE_TO: [PieceType; 4] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
];

/// A square on the board. Both coordinates are 1-based, (1, 1) is a1.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    rank: u8, // row, 1 is start
    file: u8, // col, 1 is start
}

impl Position {
    /// Panics if either coordinate is outside `1..=8`.
    pub fn new(rank: u8, file: u8) -> Position {
        Self::try_new(rank, file)
            .unwrap_or_else(|| panic!("Position ({rank}, {file}) is off the board."))
    }

    pub fn try_new(rank: u8, file: u8) -> Option<Position> {
        let on_board = |x: u8| (1..=BOARD_SIDE_LENGTH).contains(&x);
        if on_board(rank) && on_board(file) {
            Some(Position { rank, file })
        } else {
            None
        }
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    /// The square `rank_delta` ranks and `file_delta` files away, or `None` if that
    /// would leave the board.
    pub fn offset(&self, rank_delta: i8, file_delta: i8) -> Option<Position> {
        let rank = self.rank as i8 + rank_delta;
        let file = self.file as i8 + file_delta;
        if rank < 1 || file < 1 {
            return None;
        }
        Self::try_new(rank as u8, file as u8)
    }

    /// All 64 squares, rank by rank starting at a1.
    pub fn all() -> impl Iterator<Item = Position> {
        iproduct!(1..=BOARD_SIDE_LENGTH, 1..=BOARD_SIDE_LENGTH)
            .map(|(rank, file)| Position { rank, file })
    }

    pub fn from_algebraic(s: &str) -> Result<Position, ParseError> {
        let invalid = || ParseError::InvalidSquare(s.to_string());

        let mut char_iter = s.chars();
        let (Some(file_char), Some(rank_char), None) =
            (char_iter.next(), char_iter.next(), char_iter.next())
        else {
            return Err(invalid());
        };
        if !('a'..='h').contains(&file_char) || !('1'..='8').contains(&rank_char) {
            return Err(invalid());
        }

        let file = 1 + file_char as u8 - b'a';
        let rank = rank_char as u8 - b'0';

        Ok(Position { rank, file })
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", (self.file - 1 + b'a') as char, self.rank)
    }
}

impl FromStr for Position {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_algebraic(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_algebraic())
    }
}

/// A colored piece. Where it stands is owned by the board, not the piece.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub color: Color,
    pub piece_type: PieceType,
}

impl Piece {
    pub fn new(color: Color, piece_type: PieceType) -> Piece {
        Piece { color, piece_type }
    }

    /// FEN letter: uppercase for white, lowercase for black
    pub fn from_char(c: char) -> Option<Piece> {
        PieceType::from_char(c).map(|piece_type| Piece {
            color: Color::from_case(c),
            piece_type,
        })
    }

    pub fn to_char(&self) -> char {
        let c = self.piece_type.to_char();
        match self.color {
            Color::White => c,
            Color::Black => c.to_ascii_lowercase(),
        }
    }

    pub fn to_symbol(&self) -> &'static str {
        let is_white = self.color == Color::White;
        match self.piece_type {
            PieceType::Pawn => {
                if is_white {
                    "♙"
                } else {
                    "♟︎"
                }
            }
            PieceType::Rook => {
                if is_white {
                    "♖"
                } else {
                    "♜"
                }
            }
            PieceType::Knight => {
                if is_white {
                    "♘"
                } else {
                    "♞"
                }
            }
            PieceType::Bishop => {
                if is_white {
                    "♗"
                } else {
                    "♝"
                }
            }
            PieceType::Queen => {
                if is_white {
                    "♕"
                } else {
                    "♛"
                }
            }
            PieceType::King => {
                if is_white {
                    "♔"
                } else {
                    "♚"
                }
            }
        }
    }

    pub fn to_human(&self) -> String {
        format!("{} {}", self.color.to_human(), self.piece_type.to_human())
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    start: Position,
    end: Position,
    promotion: Option<PieceType>,
}

impl Move {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            promotion: None,
        }
    }

    pub fn with_promotion(start: Position, end: Position, promotion: PieceType) -> Self {
        Self {
            start,
            end,
            promotion: Some(promotion),
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn promotion(&self) -> Option<PieceType> {
        self.promotion
    }

    /// Two squares along a rank or a file. Only meaningful for pawns and kings: it
    /// marks a pawn's opening double step and a castling king.
    pub fn is_double_move(&self) -> bool {
        let rank_delta = self.start.rank.abs_diff(self.end.rank);
        let file_delta = self.start.file.abs_diff(self.end.file);
        (rank_delta == 0 && file_delta == 2) || (file_delta == 0 && rank_delta == 2)
    }

    /// Does the move change file (a pawn capture, including en passant)
    pub fn is_diagonal(&self) -> bool {
        self.start.file != self.end.file
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)?;
        if let Some(promotion) = self.promotion {
            write!(f, "={}", promotion.to_char())?;
        }
        Ok(())
    }
}
