pub mod types;
pub mod error;
pub mod board;
pub mod movegen;
pub mod movelog;
pub mod game;
pub mod perft;
