//! Pseudo-legal move generation, one generator per movement pattern.
//!
//! We define a pseudo-legal move to be a move that obeys the piece move directions,
//! stays on the board and does not skip over pieces, but that may still leave the
//! mover's own king in check. Filtering those out is `Game`'s job.

use crate::board::Board;
use crate::types::*;

const ORTHOGONAL: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];
const KING_STEPS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Outcome of looking at a single destination square
enum PotentialMove {
    /// Empty square, the move is fine and a ray may continue past it
    Quiet,
    /// Enemy piece, the move is a capture and a ray stops here
    Capture,
    /// Friendly piece, no move and a ray stops here
    Blocked,
}

impl PotentialMove {
    fn is_valid(&self) -> bool {
        !matches!(self, PotentialMove::Blocked)
    }

    fn continue_search_in_direction(&self) -> bool {
        matches!(self, PotentialMove::Quiet)
    }
}

fn check_move_target(board: &Board, color: Color, candidate: Position) -> PotentialMove {
    match board.get_piece(candidate) {
        Some(other_piece) if other_piece.color == color => PotentialMove::Blocked,
        Some(_) => PotentialMove::Capture,
        None => PotentialMove::Quiet,
    }
}

impl Piece {
    /// Pseudo-legal moves for this piece standing on `position` of `board`.
    pub fn piece_moves(&self, board: &Board, position: Position) -> Vec<Move> {
        match self.piece_type {
            PieceType::Pawn => pawn_moves(board, self.color, position),
            PieceType::Rook => slide_moves(board, self.color, position, &ORTHOGONAL),
            PieceType::Bishop => slide_moves(board, self.color, position, &DIAGONAL),
            PieceType::Queen => {
                let mut moves = slide_moves(board, self.color, position, &DIAGONAL);
                moves.append(&mut slide_moves(board, self.color, position, &ORTHOGONAL));
                moves
            }
            PieceType::Knight => step_moves(board, self.color, position, &KNIGHT_JUMPS),
            PieceType::King => step_moves(board, self.color, position, &KING_STEPS),
        }
    }
}

/// Walk each ray one square at a time until the edge, a friendly piece (excluded)
/// or an enemy piece (included as a capture).
fn slide_moves(board: &Board, color: Color, from: Position, rays: &[(i8, i8)]) -> Vec<Move> {
    let mut moves = vec![];
    for &(rank_delta, file_delta) in rays {
        let mut current = from;
        while let Some(candidate) = current.offset(rank_delta, file_delta) {
            let potential_move = check_move_target(board, color, candidate);
            if potential_move.is_valid() {
                moves.push(Move::new(from, candidate));
            }
            if !potential_move.continue_search_in_direction() {
                break;
            }
            current = candidate;
        }
    }
    moves
}

/// Fixed offsets, each checked on its own: nothing blocks a knight or a king step.
fn step_moves(board: &Board, color: Color, from: Position, offsets: &[(i8, i8)]) -> Vec<Move> {
    offsets
        .iter()
        .filter_map(|&(rank_delta, file_delta)| from.offset(rank_delta, file_delta))
        .filter(|&candidate| check_move_target(board, color, candidate).is_valid())
        .map(|candidate| Move::new(from, candidate))
        .collect()
}

fn pawn_moves(board: &Board, color: Color, from: Position) -> Vec<Move> {
    let mut destinations: Vec<Position> = vec![];
    let direction = color.pawn_direction();

    // move one square forward, requires no piece there
    if let Some(one_step) = from.offset(direction, 0) {
        if !board.is_occupied(one_step) {
            destinations.push(one_step);

            // from the starting rank, both squares in front must be free
            if from.rank() == color.pawn_starting_rank() {
                if let Some(two_step) = from.offset(2 * direction, 0) {
                    if !board.is_occupied(two_step) {
                        destinations.push(two_step);
                    }
                }
            }
        }
    }

    // diagonals only ever capture here, en passant is added by the game
    for file_delta in [-1, 1] {
        if let Some(candidate) = from.offset(direction, file_delta) {
            if let PotentialMove::Capture = check_move_target(board, color, candidate) {
                destinations.push(candidate);
            }
        }
    }

    let mut moves = vec![];
    for to in destinations {
        if to.rank() == color.promotion_rank() {
            moves.extend(
                PIECES_CAN_PROMOTE_TO
                    .iter()
                    .map(|&promotion| Move::with_promotion(from, to, promotion)),
            );
        } else {
            moves.push(Move::new(from, to));
        }
    }
    moves
}
