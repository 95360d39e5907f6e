//! Random playouts - play games of uniformly random legal moves through
//! `Game::make_move` and report how they ended.
//!
//! Usage: cargo run --release --bin playout -- --games 50 --max-plies 300 --seed 7

use std::time::Instant;

use chess_rules::game::{Game, Outcome};
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "playout")]
#[command(about = "Play random legal games and tally the results")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value_t = 20)]
    games: usize,

    /// Stop a game that is still running after this many plies
    #[arg(long, default_value_t = 400)]
    max_plies: usize,

    /// Seed for reproducible runs, random if not given
    #[arg(long)]
    seed: Option<u64>,

    /// Print the final board of every game
    #[arg(long)]
    show_boards: bool,
}

fn outcome_label(outcome: Option<Outcome>) -> String {
    match outcome {
        Some(Outcome::Checkmate { winner }) => format!("checkmate, {winner} wins"),
        Some(Outcome::Stalemate) => "stalemate".to_string(),
        Some(Outcome::Resignation) => "resignation".to_string(),
        None => "unfinished".to_string(),
    }
}

fn play_random_game(rng: &mut StdRng, max_plies: usize) -> Result<Game> {
    let mut game = Game::new();
    for _ in 0..max_plies {
        if game.is_over() {
            break;
        }
        let moves = game.legal_moves();
        let mv = *moves
            .choose(rng)
            .ok_or_else(|| eyre!("no legal moves but the game is not over:\n{}", game.board()))?;
        let turn = game.team_turn();
        game.make_move(mv)?;
        if game.team_turn() == turn {
            return Err(eyre!("turn did not pass after {mv}"));
        }
    }
    Ok(game)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed, games = args.games, max_plies = args.max_plies, "starting playouts");
    let mut rng = StdRng::seed_from_u64(seed);

    let now = Instant::now();
    let mut results = Vec::with_capacity(args.games);
    for i in 0..args.games {
        let game = play_random_game(&mut rng, args.max_plies)?;
        let label = outcome_label(game.outcome());
        debug!(game = i + 1, plies = game.move_log().len(), result = %label, "game finished");
        if args.show_boards {
            println!("game {} ({} plies): {}\n{}", i + 1, game.move_log().len(), label, game.board());
        }
        results.push(label);
    }

    println!(
        "{} games in {:.2}s (seed {})",
        args.games,
        now.elapsed().as_secs_f32(),
        seed
    );
    for (label, count) in results.into_iter().counts().into_iter().sorted() {
        println!("{count:>5}  {label}");
    }
    Ok(())
}
