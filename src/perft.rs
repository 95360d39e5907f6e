use rayon::prelude::*;

use crate::game::Game;
use crate::types::Move;

/// Count the leaf nodes of the legal move tree `depth` plies deep.
///
/// The last ply is bulk counted: the number of legal moves is the number of leaves,
/// so those positions are never played out.
pub fn perft(game: &Game, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = game.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }
    moves
        .into_iter()
        .map(|mv| {
            let mut next = game.clone();
            next.play_unchecked(mv);
            perft(&next, depth - 1)
        })
        .sum()
}

/// Node count below each root move, the root moves being searched in parallel.
pub fn perft_divide(game: &Game, depth: u8) -> Vec<(Move, u64)> {
    if depth == 0 {
        return vec![];
    }
    game.legal_moves()
        .into_par_iter()
        .map(|mv| {
            let mut next = game.clone();
            next.play_unchecked(mv);
            (mv, perft(&next, depth - 1))
        })
        .collect()
}

/// Perft from starting position
///
/// https://www.chessprogramming.org/Perft_Results
///
/// | Depth | Nodes          | Captures  | E.p.   | Castles | Promotions | Checks    | Checkmates |
/// | ----- | -------------- | --------- | ------ | ------- | ---------- | --------- | ---------- |
/// | 0     | 1              | 0         | 0      | 0       | 0          | 0         | 0          |
/// | 1     | 20             | 0         | 0      | 0       | 0          | 0         | 0          |
/// | 2     | 400            | 0         | 0      | 0       | 0          | 0         | 0          |
/// | 3     | 8,902          | 34        | 0      | 0       | 0          | 12        | 0          |
/// | 4     | 197,281        | 1576      | 0      | 0       | 0          | 469       | 8          |
/// | 5     | 4,865,609      | 82,719    | 258    | 0       | 0          | 27,351    | 347        |
/// | 6     | 119,060,324    | 2,812,008 | 5248   | 0       | 0          | 809,099   | 10,828     |
/// | 7     | 3,195,901,860  |           |        | 883,453 | 0          |           | 435,767    |
pub fn expected_start_nodes(depth: u8) -> Option<u64> {
    match depth {
        0 => Some(1),
        1 => Some(20),
        2 => Some(400),
        3 => Some(8902),
        4 => Some(197_281),
        5 => Some(4_865_609),
        6 => Some(119_060_324),
        7 => Some(3_195_901_860),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::types::Color;

    const MAX_DEPTH: u8 = 3;

    fn run_perft(fen: &str, turn: Color, expected: &[u64]) {
        let game = Game::with_board(Board::from_fen(fen).unwrap(), turn);
        for (depth, &nodes) in expected.iter().enumerate().skip(1) {
            assert_eq!(perft(&game, depth as u8), nodes, "{fen} at depth {depth}");
        }
    }

    #[test]
    fn perft_start() {
        let game = Game::new();
        for depth in 0..=MAX_DEPTH {
            assert_eq!(Some(perft(&game, depth)), expected_start_nodes(depth));
        }
    }

    /// "Kiwipete", full of castling, en passant and promotion tricks
    #[test]
    fn perft_kiwipete() {
        run_perft(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            Color::White,
            &[1, 48, 2039],
        );
    }

    /// Run the perft test on the "position 3" from
    /// https://www.chessprogramming.org/Perft_Results
    ///
    /// Depth | Nodes
    /// ----- | -----
    /// 1     | 14
    /// 2     | 191
    /// 3     | 2,812
    #[test]
    fn perft_pos_3() {
        run_perft(
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            Color::White,
            &[1, 14, 191, 2812],
        );
    }

    #[test]
    fn perft_pos_4() {
        run_perft(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            Color::White,
            &[1, 6, 264],
        );
    }

    #[test]
    fn perft_pos_5() {
        run_perft(
            "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
            Color::White,
            &[1, 44, 1486],
        );
    }

    #[test]
    fn divide_sums_to_perft() {
        let game = Game::new();
        let divided = perft_divide(&game, 3);
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), perft(&game, 3));
    }
}
