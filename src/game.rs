use std::cmp::{max, min};

use tracing::{debug, trace};

use crate::board::Board;
use crate::error::GameError;
use crate::movelog::{LogEntry, MoveLog};
use crate::types::*;

/// File the king starts on, for both colors
const KING_START_FILE: u8 = 5;

/// How a finished game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Checkmate { winner: Color },
    Stalemate,
    /// Ended from outside, the board is whatever it was
    Resignation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// Contains the side to move
    Active(Color),
    Over(Outcome),
}

/// A game of chess: the board, its history, and whose turn it is.
///
/// `make_move` is the only way the position changes. Everything else is a query,
/// apart from the wholesale replacements external loaders need (`set_board`,
/// `set_team_turn`) and `resign`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Game {
    board: Board,
    log: MoveLog,
    team_turn: Color,
    outcome: Option<Outcome>,
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}

impl Game {
    /// Standard starting position, white to move
    pub fn new() -> Self {
        Game::with_board(Board::starting(), Color::White)
    }

    pub fn with_board(board: Board, team_turn: Color) -> Self {
        Self {
            board,
            log: MoveLog::new(),
            team_turn,
            outcome: None,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Replace the board and forget the move history. En passant windows are lost,
    /// and castling rights are judged from the new board alone.
    pub fn set_board(&mut self, board: Board) {
        self.board = board;
        self.log.reset();
    }

    pub fn move_log(&self) -> &MoveLog {
        &self.log
    }

    pub fn team_turn(&self) -> Color {
        self.team_turn
    }

    pub fn set_team_turn(&mut self, team: Color) {
        self.team_turn = team;
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn status(&self) -> GameStatus {
        match self.outcome {
            Some(outcome) => GameStatus::Over(outcome),
            None => GameStatus::Active(self.team_turn),
        }
    }

    /// End the game without touching the board. Has no effect on a game that is
    /// already over.
    pub fn resign(&mut self) {
        if self.outcome.is_none() {
            debug!(team = %self.team_turn, "game over by resignation");
            self.outcome = Some(Outcome::Resignation);
        }
    }

    /// Legal moves for the piece on `position`, or `None` if the square is empty.
    ///
    /// Turn order is not considered: the moves of the side not on turn are computed
    /// as if it were their move.
    pub fn valid_moves(&self, position: Position) -> Option<Vec<Move>> {
        let piece = self.board.get_piece(position)?;

        let mut candidates = piece.piece_moves(&self.board, position);
        candidates.extend(self.en_passant_move(position, piece));
        candidates.extend(self.castling_moves(position, piece));

        let last_entry = self.log.last_entry();
        let moves = candidates
            .into_iter()
            .filter(|&mv| {
                let mut test_board = self.board.clone();
                apply_unchecked(&mut test_board, last_entry, mv);
                if is_in_check_on(&test_board, piece.color) {
                    return false;
                }
                // the king may not pass through an attacked square. After the castle
                // the rook stands on exactly that square.
                !(is_castling_move(piece, mv)
                    && is_capturable(&test_board, piece.color, castling_rook_squares(mv).1))
            })
            .collect();
        Some(moves)
    }

    /// Every legal move for the side to move
    pub fn legal_moves(&self) -> Vec<Move> {
        let own_squares: Vec<Position> = self
            .board
            .pieces()
            .filter(|(_, p)| p.color == self.team_turn)
            .map(|(pos, _)| pos)
            .collect();
        own_squares
            .into_iter()
            .flat_map(|pos| self.valid_moves(pos).unwrap_or_default())
            .collect()
    }

    /// Play `mv` for the side to move. On success the turn has passed to the other
    /// side, and the game may have ended. On failure nothing has changed.
    pub fn make_move(&mut self, mv: Move) -> Result<GameStatus, GameError> {
        let result = self.check_move(mv);
        if let Err(err) = &result {
            trace!(%mv, %err, "rejected move");
        }
        result?;

        self.play_unchecked(mv);

        let next = self.team_turn;
        if self.has_no_valid_moves(next) {
            let outcome = if self.is_in_check(next) {
                Outcome::Checkmate {
                    winner: next.other_color(),
                }
            } else {
                Outcome::Stalemate
            };
            debug!(?outcome, "game over");
            self.outcome = Some(outcome);
        }
        Ok(self.status())
    }

    fn check_move(&self, mv: Move) -> Result<(), GameError> {
        if self.is_over() {
            return Err(GameError::GameOver);
        }
        let piece = self
            .board
            .get_piece(mv.start())
            .ok_or(GameError::NonexistentPiece(mv))?;
        if piece.color != self.team_turn {
            return Err(GameError::OutOfTurn(mv));
        }
        let legal = self.valid_moves(mv.start()).unwrap_or_default();
        if !legal.contains(&mv) {
            return Err(GameError::IllegalMove(mv));
        }
        Ok(())
    }

    /// Apply a move known to be legal, log it, and pass the turn. No terminal
    /// detection: callers that need it go through `make_move`.
    pub(crate) fn play_unchecked(&mut self, mv: Move) {
        let Some(piece) = self.board.get_piece(mv.start()) else {
            return;
        };
        apply_unchecked(&mut self.board, self.log.last_entry(), mv);
        self.log.add_move(LogEntry::new(mv, piece));
        debug!(%mv, piece = %piece.to_human(), "applied move");
        self.team_turn = self.team_turn.other_color();
    }

    /// The en passant capture available to the piece on `position`, if any.
    ///
    /// Only the last logged move matters: the enemy pawn must have just made its
    /// double step, landing next to ours on the same rank.
    fn en_passant_move(&self, position: Position, piece: Piece) -> Option<Move> {
        if piece.piece_type != PieceType::Pawn {
            return None;
        }
        let last = self.log.last_entry()?;
        let landing = last.mv.end();
        if last.piece.piece_type != PieceType::Pawn
            || last.piece.color == piece.color
            || !last.mv.is_double_move()
            || landing.rank() != position.rank()
            || landing.file().abs_diff(position.file()) != 1
        {
            return None;
        }
        let to = landing.offset(piece.color.pawn_direction(), 0)?;
        Some(Move::new(position, to))
    }

    /// Castling moves for a king that has never left its home square, is not in
    /// check, and has an unmoved rook of its color with an empty path to it. A
    /// rook corner that any move has landed on no longer holds the original rook.
    /// Whether the squares it crosses are attacked is left to the legality filter.
    fn castling_moves(&self, position: Position, piece: Piece) -> Vec<Move> {
        let rank = piece.color.back_rank();
        if piece.piece_type != PieceType::King
            || position != Position::new(rank, KING_START_FILE)
            || self.log.has_moved_from(position)
            || self.is_in_check(piece.color)
        {
            return vec![];
        }

        let own_rook = Piece::new(piece.color, PieceType::Rook);
        let mut moves = vec![];
        // (rook file, king destination file) for queenside and kingside
        for (rook_file, king_file) in [(1, 3), (BOARD_SIDE_LENGTH, 7)] {
            let rook_position = Position::new(rank, rook_file);
            let path_clear = (min(rook_file, KING_START_FILE) + 1..max(rook_file, KING_START_FILE))
                .all(|file| !self.board.is_occupied(Position::new(rank, file)));
            if path_clear
                && self.board.get_piece(rook_position) == Some(own_rook)
                && !self.log.has_moved_from(rook_position)
                && !self.log.has_moved_to(rook_position)
            {
                moves.push(Move::new(position, Position::new(rank, king_file)));
            }
        }
        moves
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check_on(&self.board, color)
    }

    pub fn is_in_checkmate(&self, color: Color) -> bool {
        self.is_in_check(color) && self.has_no_valid_moves(color)
    }

    /// Not in check, on turn, and nothing to play
    pub fn is_in_stalemate(&self, color: Color) -> bool {
        color == self.team_turn && !self.is_in_check(color) && self.has_no_valid_moves(color)
    }

    fn has_no_valid_moves(&self, color: Color) -> bool {
        self.board
            .pieces()
            .filter(|(_, p)| p.color == color)
            .all(|(pos, _)| self.valid_moves(pos).map_or(true, |moves| moves.is_empty()))
    }
}

fn is_castling_move(piece: Piece, mv: Move) -> bool {
    piece.piece_type == PieceType::King && mv.is_double_move()
}

fn is_en_passant_move(board: &Board, piece: Piece, mv: Move) -> bool {
    piece.piece_type == PieceType::Pawn && mv.is_diagonal() && !board.is_occupied(mv.end())
}

/// Where the rook comes from and goes to for a castling king move. The destination
/// is also the square the king passes through.
fn castling_rook_squares(mv: Move) -> (Position, Position) {
    let rank = mv.start().rank();
    if mv.end().file() < mv.start().file() {
        (Position::new(rank, 1), Position::new(rank, mv.end().file() + 1))
    } else {
        (
            Position::new(rank, BOARD_SIDE_LENGTH),
            Position::new(rank, mv.end().file() - 1),
        )
    }
}

/// Play `mv` on `board` with no rule checking, including the extra capture of en
/// passant and the rook hop of castling. `last_entry` is the move log's latest
/// entry, which locates the pawn an en passant capture removes.
fn apply_unchecked(board: &mut Board, last_entry: Option<&LogEntry>, mv: Move) {
    let Some(piece) = board.get_piece(mv.start()) else {
        return;
    };
    let en_passant = is_en_passant_move(board, piece, mv);

    board.remove_piece(mv.end());
    if en_passant {
        if let Some(last) = last_entry {
            board.remove_piece(last.mv.end());
        }
    }
    if is_castling_move(piece, mv) {
        let (rook_from, rook_to) = castling_rook_squares(mv);
        if let Some(rook) = board.remove_piece(rook_from) {
            board.add_piece(rook_to, rook);
        }
    }
    board.add_piece(
        mv.end(),
        Piece::new(piece.color, mv.promotion().unwrap_or(piece.piece_type)),
    );
    board.remove_piece(mv.start());
}

/// Could any piece not of `color` move onto `pos`
fn is_capturable(board: &Board, color: Color, pos: Position) -> bool {
    board
        .pieces()
        .filter(|(_, p)| p.color != color)
        .any(|(from, p)| p.piece_moves(board, from).iter().any(|m| m.end() == pos))
}

/// A side with no king is never in check. With several kings, one attacked king is
/// enough.
fn is_in_check_on(board: &Board, color: Color) -> bool {
    board
        .king_positions(color)
        .into_iter()
        .any(|king| is_capturable(board, color, king))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pos(s: &str) -> Position {
        Position::from_algebraic(s).unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(pos(from), pos(to))
    }

    fn game_from_fen(fen: &str, turn: Color) -> Game {
        Game::with_board(Board::from_fen(fen).unwrap(), turn)
    }

    fn play(game: &mut Game, moves: &[(&str, &str)]) {
        for (from, to) in moves {
            game.make_move(mv(from, to))
                .unwrap_or_else(|e| panic!("{from}{to} rejected: {e}"));
        }
    }

    #[test]
    fn new_game() {
        let game = Game::new();
        assert_eq!(game.team_turn(), Color::White);
        assert_eq!(game.board(), &Board::starting());
        assert!(game.move_log().is_empty());
        assert!(!game.is_over());
        assert_eq!(game.status(), GameStatus::Active(Color::White));
    }

    #[test]
    fn count_legal_moves_from_start_position() {
        let game = Game::new();
        assert_eq!(game.legal_moves().len(), 20); // 8*2 pawn moves, 2*2 knight moves
    }

    #[test]
    fn valid_moves_distinguishes_empty_square_from_no_moves() {
        let game = Game::new();
        assert_eq!(game.valid_moves(pos("e4")), None);
        // the rook is boxed in
        assert_eq!(game.valid_moves(pos("a1")), Some(vec![]));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        // . . . . ♚ . . .
        // . . . . ♜ . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . ♗ . . .
        // . . . . ♔ . . .
        let game = game_from_fen("4k3/4r3/8/8/8/8/4B3/4K3", Color::White);
        assert_eq!(game.valid_moves(pos("e2")), Some(vec![]));
    }

    #[test]
    fn only_one_legal_move() {
        // Here the queen is defended, the king has a single move
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . ♖ . . . . .
        // . . ♕ . . . . .
        // . ♚ . . . . . .
        let game = game_from_fen("8/8/8/8/8/2R5/2Q5/1k6", Color::Black);
        assert_eq!(game.legal_moves(), vec![mv("b1", "a1")]);
    }

    #[test]
    fn rejected_moves_change_nothing() {
        let mut game = Game::new();
        let before = game.clone();

        assert_eq!(
            game.make_move(mv("e4", "e5")),
            Err(GameError::NonexistentPiece(mv("e4", "e5")))
        );
        assert_eq!(
            game.make_move(mv("e7", "e5")),
            Err(GameError::OutOfTurn(mv("e7", "e5")))
        );
        assert_eq!(
            game.make_move(mv("e2", "e5")),
            Err(GameError::IllegalMove(mv("e2", "e5")))
        );
        assert_eq!(game, before);
    }

    #[test]
    fn turn_flips_once_per_accepted_move() {
        let mut game = Game::new();
        assert_eq!(
            game.make_move(mv("e2", "e4")),
            Ok(GameStatus::Active(Color::Black))
        );
        assert_eq!(game.team_turn(), Color::Black);
        assert!(game.make_move(mv("e2", "e4")).is_err());
        assert_eq!(game.team_turn(), Color::Black);
        play(&mut game, &[("e7", "e5")]);
        assert_eq!(game.team_turn(), Color::White);
        assert_eq!(game.move_log().len(), 2);
    }

    #[test]
    fn cannot_leave_king_in_check() {
        // black rook gives check along the e-file, the knight must deal with it
        let game = game_from_fen("4k3/8/4r3/8/8/2N5/8/4K3", Color::White);
        let knight_moves = game.valid_moves(pos("c3")).unwrap();
        assert!(knight_moves.iter().all(|m| m.end() == pos("e2") || m.end() == pos("e4")));
        assert_eq!(knight_moves.len(), 2);
    }

    #[test]
    fn checkmate_1() {
        // No moves: checkmate!
        // . . . . . . . .
        // . . ♔ . . . . .
        // . ♕ . . . . . .
        // . ♚ . . . . . .
        let game = game_from_fen("8/8/8/8/8/2K5/1Q6/1k6", Color::Black);
        assert!(game.is_in_check(Color::Black));
        assert!(game.is_in_checkmate(Color::Black));
        assert!(!game.is_in_stalemate(Color::Black));
        assert!(!game.is_in_checkmate(Color::White));
    }

    #[test]
    fn stalemate_1() {
        // Black is in stalemate, no legal moves
        // . . . . . . . ♔
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . . . . . . .
        // . . ♕ . . . . .
        // ♚ . . . . . . .
        let game = game_from_fen("7K/8/8/8/8/8/2Q5/k7", Color::Black);
        assert!(game.is_in_stalemate(Color::Black));
        assert!(!game.is_in_checkmate(Color::Black));
        // only the side to move can be stalemated
        let game = game_from_fen("7K/8/8/8/8/8/2Q5/k7", Color::White);
        assert!(!game.is_in_stalemate(Color::Black));
    }

    #[test]
    fn stalemate_with_pawn() {
        // . . . . . . ♚ .
        // . . . . . . . ♟︎
        // . . . . . . . ♔
        let game = game_from_fen("8/8/8/8/8/6k1/7p/7K", Color::White);
        assert!(game.is_in_stalemate(Color::White));
    }

    #[test]
    fn checkmate_with_pawn() {
        // . . . . . . ♚ .
        // . . . . . . ♟︎ ♟︎
        // . . . . . . . ♔
        let game = game_from_fen("8/8/8/8/8/6k1/6pp/7K", Color::White);
        assert!(game.is_in_checkmate(Color::White));
    }

    #[test]
    fn double_check_only_king_moves() {
        // . . . . . . . .
        // ♜ . . . . . . .
        // . . . . . . . .
        // . . ♗ . . . . . <- bishop can capture either rook, but not both
        // ♔ . . ♜ . . . .          so the king must move
        let game = game_from_fen("8/8/8/8/r7/8/2B5/K2r4", Color::White);
        assert_eq!(game.legal_moves(), vec![mv("a1", "b2")]);
    }

    #[test]
    fn fools_mate_ends_the_game() {
        let mut game = Game::new();
        play(&mut game, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4")]);
        let status = game.make_move(mv("d8", "h4"));
        assert_eq!(
            status,
            Ok(GameStatus::Over(Outcome::Checkmate {
                winner: Color::Black
            }))
        );
        assert!(game.is_over());
        assert!(game.is_in_checkmate(Color::White));
        assert_eq!(game.make_move(mv("e1", "f2")), Err(GameError::GameOver));
    }

    #[test]
    fn resign_ends_game_without_touching_board() {
        let mut game = Game::new();
        play(&mut game, &[("e2", "e4")]);
        let board = game.board().clone();
        game.resign();
        assert_eq!(game.outcome(), Some(Outcome::Resignation));
        assert_eq!(game.board(), &board);
        assert_eq!(game.team_turn(), Color::Black);
        assert_eq!(game.make_move(mv("e7", "e5")), Err(GameError::GameOver));
    }

    #[test]
    fn game_over_is_reported_before_other_errors() {
        let mut game = Game::new();
        game.resign();
        assert_eq!(game.make_move(mv("e4", "e5")), Err(GameError::GameOver));
        assert_eq!(game.make_move(mv("e7", "e5")), Err(GameError::GameOver));
    }

    #[test]
    fn promotion_must_name_a_piece() {
        let mut game = game_from_fen("7k/P7/8/8/8/8/8/K7", Color::White);
        assert_eq!(
            game.make_move(mv("a7", "a8")),
            Err(GameError::IllegalMove(mv("a7", "a8")))
        );
        let promote = Move::with_promotion(pos("a7"), pos("a8"), PieceType::Knight);
        assert!(game.make_move(promote).is_ok());
        assert_eq!(
            game.board().get_piece(pos("a8")),
            Some(Piece::new(Color::White, PieceType::Knight))
        );
        // the log keeps the piece as it was before moving
        assert_eq!(
            game.move_log().last_entry().unwrap().piece,
            Piece::new(Color::White, PieceType::Pawn)
        );
    }

    #[test]
    fn missing_king_is_never_in_check() {
        let game = game_from_fen("8/8/8/8/8/8/r7/R7", Color::White);
        assert!(!game.is_in_check(Color::White));
        // every pseudo-legal rook move is legal without a king to protect
        let rook = Piece::new(Color::White, PieceType::Rook);
        assert_eq!(
            game.valid_moves(pos("a1")).unwrap(),
            rook.piece_moves(game.board(), pos("a1"))
        );
        assert_eq!(game.valid_moves(pos("a1")).unwrap().len(), 8);
    }

    #[test]
    fn duplicated_king_in_check_if_any_copy_attacked() {
        // the a1 king is attacked, the h1 king is not
        let game = game_from_fen("k7/8/8/8/8/8/r7/K6K", Color::White);
        assert!(game.is_in_check(Color::White));
        // moving the safe king does not resolve the check
        assert!(game.valid_moves(pos("h1")).unwrap().is_empty());
    }

    #[test]
    fn set_board_resets_the_log() {
        let mut game = Game::new();
        play(&mut game, &[("e2", "e4"), ("e7", "e5")]);
        game.set_board(Board::from_fen("4k3/8/8/8/8/8/8/4K2R").unwrap());
        assert!(game.move_log().is_empty());
        assert_eq!(game.team_turn(), Color::White);
        // the king and rook stand on their home squares of the new board
        assert!(game.valid_moves(pos("e1")).unwrap().contains(&mv("e1", "g1")));
    }

    #[test]
    fn set_board_drops_en_passant() {
        let mut game = Game::new();
        play(
            &mut game,
            &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")],
        );
        assert!(game.valid_moves(pos("e5")).unwrap().contains(&mv("e5", "d6")));

        // same placement, but the double step is no longer on record
        let board = game.board().clone();
        game.set_board(board);
        let moves = game.valid_moves(pos("e5")).unwrap();
        assert!(!moves.contains(&mv("e5", "d6")));
        assert!(moves.contains(&mv("e5", "e6")));
    }

    #[test]
    fn set_team_turn() {
        let mut game = Game::new();
        game.set_team_turn(Color::Black);
        assert!(game.make_move(mv("e7", "e5")).is_ok());
        assert_eq!(game.team_turn(), Color::White);
    }
}
