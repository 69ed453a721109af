//! Engine-vs-engine matches. Games run in parallel on a rayon pool; every
//! game owns its position and one searcher per side, so nothing is shared
//! between games except the progress bar.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use cozy_chess::Color;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::board::cozy::{GameStatus, Position};
use crate::board::SearchBoard;
use crate::config::EngineConfig;
use crate::error::Result;
use crate::openings;

#[derive(Clone, Debug)]
pub struct MatchParams {
    pub games: usize,
    /// Starting clock per side.
    pub clock_ms: u64,
    /// Hard cap on a single move's budget.
    pub max_move_ms: Option<u64>,
    pub max_plies: usize,
    /// Worker threads; 0 uses the global rayon pool.
    pub threads: usize,
    pub seed: u64,
    pub openings_path: Option<PathBuf>,
    pub show_progress: bool,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            games: 100,
            clock_ms: 10_000,
            max_move_ms: None,
            max_plies: 400,
            threads: 0,
            seed: 42,
            openings_path: None,
            show_progress: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Winner {
    EngineA,
    EngineB,
    Draw,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Termination {
    Checkmate,
    Timeout,
    Stalemate,
    Repetition,
    FiftyMoveRule,
    InsufficientMaterial,
    MaxPlies,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameRecord {
    pub index: usize,
    pub a_is_white: bool,
    pub start_fen: String,
    pub winner: Winner,
    pub termination: Termination,
    pub moves: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MatchSummary {
    pub engine_a: String,
    pub engine_b: String,
    pub games: usize,
    pub a_wins: usize,
    pub b_wins: usize,
    pub draws: usize,
}

impl MatchSummary {
    pub fn from_records(a: &EngineConfig, b: &EngineConfig, records: &[GameRecord]) -> Self {
        let mut s = Self { engine_a: a.name.clone(), engine_b: b.name.clone(), games: records.len(), ..Self::default() };
        for r in records {
            match r.winner {
                Winner::EngineA => s.a_wins += 1,
                Winner::EngineB => s.b_wins += 1,
                Winner::Draw => s.draws += 1,
            }
        }
        s
    }

    /// Points scored by engine A, a draw counting half.
    pub fn score_a(&self) -> f64 {
        self.a_wins as f64 + 0.5 * self.draws as f64
    }
}

/// Plays `params.games` games between `a` and `b` from shuffled openings
/// (a file if configured, otherwise the built-in lines). Each opening is
/// played twice with colors swapped.
pub fn play_match(a: &EngineConfig, b: &EngineConfig, params: &MatchParams) -> Result<(MatchSummary, Vec<GameRecord>)> {
    let mut positions = match params.openings_path {
        Some(ref path) => openings::load_positions(path)?,
        None => Vec::new(),
    };
    if positions.is_empty() {
        positions = openings::builtin_positions()?;
    }
    let mut rng = SmallRng::seed_from_u64(params.seed);
    positions.shuffle(&mut rng);
    play_games(&positions, a, b, params)
}

pub fn play_games(
    positions: &[Position],
    a: &EngineConfig,
    b: &EngineConfig,
    params: &MatchParams,
) -> Result<(MatchSummary, Vec<GameRecord>)> {
    let fallback = [Position::startpos()];
    let positions = if positions.is_empty() { &fallback[..] } else { positions };

    info!("starting {} games: {} vs {}", params.games, a.name, b.name);
    let pb = if params.show_progress { ProgressBar::new(params.games as u64) } else { ProgressBar::hidden() };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} games {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let run = || -> Vec<GameRecord> {
        (0..params.games)
            .into_par_iter()
            .map(|i| {
                let opening = &positions[(i / 2) % positions.len()];
                let record = play_game(i, opening, a, b, params);
                pb.inc(1);
                record
            })
            .collect()
    };
    let records = if params.threads > 0 {
        rayon::ThreadPoolBuilder::new().num_threads(params.threads).build()?.install(run)
    } else {
        run()
    };
    pb.finish_and_clear();

    let summary = MatchSummary::from_records(a, b, &records);
    info!(
        "{} wins: {}, {} wins: {}, draws: {}",
        summary.engine_a, summary.a_wins, summary.engine_b, summary.b_wins, summary.draws
    );
    Ok((summary, records))
}

fn move_budget(clock_ms: i64, cap_ms: Option<u64>) -> Duration {
    let share = (clock_ms.max(0) as u64 / 40).max(1);
    Duration::from_millis(cap_ms.map_or(share, |cap| share.min(cap.max(1))))
}

/// Plays one game. Engine A has White on odd indices.
pub fn play_game(index: usize, opening: &Position, a: &EngineConfig, b: &EngineConfig, params: &MatchParams) -> GameRecord {
    let a_is_white = index % 2 == 1;
    let (white_cfg, black_cfg) = if a_is_white { (a, b) } else { (b, a) };
    let mut white = white_cfg.build_searcher();
    let mut black = black_cfg.build_searcher();
    let mut clocks = [params.clock_ms as i64; 2];

    let mut pos = opening.clone();
    let start_fen = pos.fen();
    let mut moves = Vec::new();
    let color_to_winner = |c: Color| if (c == Color::White) == a_is_white { Winner::EngineA } else { Winner::EngineB };

    let (winner, termination) = loop {
        match pos.status() {
            GameStatus::Ongoing => {}
            GameStatus::Checkmate => break (color_to_winner(!pos.side_to_move()), Termination::Checkmate),
            GameStatus::Stalemate => break (Winner::Draw, Termination::Stalemate),
            GameStatus::Repetition => break (Winner::Draw, Termination::Repetition),
            GameStatus::FiftyMoveRule => break (Winner::Draw, Termination::FiftyMoveRule),
            GameStatus::InsufficientMaterial => break (Winner::Draw, Termination::InsufficientMaterial),
        }
        if moves.len() >= params.max_plies {
            break (Winner::Draw, Termination::MaxPlies);
        }

        let stm = pos.side_to_move();
        let (searcher, cfg, slot) = match stm {
            Color::White => (&mut white, white_cfg, 0),
            Color::Black => (&mut black, black_cfg, 1),
        };
        let cap = match (cfg.movetime_ms, params.max_move_ms) {
            (Some(x), Some(y)) => Some(x.min(y)),
            (x, y) => x.or(y),
        };
        let budget = move_budget(clocks[slot], cap);

        let t0 = Instant::now();
        let chosen = searcher.choose_move(&mut pos, budget);
        clocks[slot] -= t0.elapsed().as_millis() as i64;
        if clocks[slot] <= 0 {
            break (color_to_winner(!stm), Termination::Timeout);
        }
        match chosen {
            Ok(mv) => {
                moves.push(mv.to_string());
                pos.make_move(mv);
            }
            // status() already ruled out positions without moves
            Err(_) => break (Winner::Draw, Termination::Stalemate),
        }
    };

    debug!("game {} finished after {} plies: {:?} by {:?}", index, moves.len(), winner, termination);
    GameRecord { index, a_is_white, start_fen, winner, termination, moves }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_is_a_fortieth_of_the_clock() {
        assert_eq!(move_budget(4000, None), Duration::from_millis(100));
        assert_eq!(move_budget(4000, Some(30)), Duration::from_millis(30));
        assert_eq!(move_budget(-5, None), Duration::from_millis(1));
    }

    #[test]
    fn summary_counts_each_outcome() {
        let a = EngineConfig::default();
        let b = EngineConfig::baseline();
        let rec = |winner| GameRecord {
            index: 0,
            a_is_white: true,
            start_fen: String::new(),
            winner,
            termination: Termination::MaxPlies,
            moves: Vec::new(),
        };
        let records = vec![rec(Winner::EngineA), rec(Winner::Draw), rec(Winner::EngineA), rec(Winner::EngineB)];
        let s = MatchSummary::from_records(&a, &b, &records);
        assert_eq!((s.games, s.a_wins, s.b_wins, s.draws), (4, 2, 1, 1));
        assert_eq!(s.score_a(), 2.5);
        assert_eq!(s.engine_b, "baseline");
    }
}
