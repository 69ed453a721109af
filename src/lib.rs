pub mod board;
pub mod config;
pub mod error;
pub mod matches;
pub mod openings;
pub mod perft;
pub mod search;
pub mod uci;

pub use error::{EngineError, Result};
