//! Perft - count the legal move tree of a position
//!
//! Usage: cargo run --release --bin perft -- --depth 4
//!        cargo run --release --bin perft -- --fen "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8" --depth 3 --divide

use std::time::Instant;

use chess_rules::board::{Board, STARTING_POSITION_FEN};
use chess_rules::game::Game;
use chess_rules::perft::{expected_start_nodes, perft, perft_divide};
use chess_rules::types::Color;
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "perft")]
#[command(about = "Count leaf nodes of the legal move tree")]
struct Args {
    /// Number of plies to search
    #[arg(short, long, default_value_t = 4)]
    depth: u8,

    /// Piece placement of the position, FEN style (extra FEN fields are ignored)
    #[arg(long, default_value = STARTING_POSITION_FEN)]
    fen: String,

    /// Side to move: `w` or `b`
    #[arg(long, default_value = "w", value_parser = parse_color)]
    turn: Color,

    /// Print the node count below every root move
    #[arg(long)]
    divide: bool,
}

fn parse_color(s: &str) -> std::result::Result<Color, String> {
    let mut chars = s.chars();
    match (chars.next().and_then(Color::from_char), chars.next()) {
        (Some(color), None) => Ok(color),
        _ => Err(format!("side to move must be `w` or `b`, got `{s}`")),
    }
}

fn check_args(args: &Args) -> Result<()> {
    if args.divide && args.depth == 0 {
        return Err(eyre!("--divide needs a depth of at least 1"));
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    check_args(&args)?;
    let board = Board::from_fen(&args.fen)?;
    let game = Game::with_board(board, args.turn);
    println!("{}", game.board());

    let now = Instant::now();
    let nodes = if args.divide {
        let divided = perft_divide(&game, args.depth);
        for (mv, count) in divided.iter().sorted_by_key(|(mv, _)| mv.to_string()) {
            println!("{mv}: {count}");
        }
        divided.iter().map(|(_, count)| count).sum::<u64>()
    } else {
        perft(&game, args.depth)
    };
    let elapsed = now.elapsed().as_secs_f32();

    info!(depth = args.depth, nodes, elapsed, "perft done");
    println!("depth {}: {} nodes in {:.3}s", args.depth, nodes, elapsed);

    if board_is_start(&game) && args.turn == Color::White {
        if let Some(expected) = expected_start_nodes(args.depth) {
            if expected != nodes {
                return Err(eyre!("expected {expected} nodes from the starting position, got {nodes}"));
            }
            println!("matches the published count");
        }
    }
    Ok(())
}

fn board_is_start(game: &Game) -> bool {
    *game.board() == Board::starting()
}
