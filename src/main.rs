use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use packbot::board::cozy::Position;
use packbot::config::EngineConfig;
use packbot::matches::{play_match, MatchParams};
use packbot::perft::{divide, perft_parallel};
use packbot::search::alphabeta::SearchParams;
use packbot::uci::{format_score, UciEngine};

#[derive(Parser, Debug)]
#[command(author, version, about = "Alpha-beta chess engine with packed piece-square evaluation", long_about = None)]
struct Cli {
    /// Engine configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak UCI on stdin/stdout (default)
    Uci,
    /// Search one position and print the result
    Think {
        /// FEN string or "startpos"
        #[arg(long, default_value = "startpos")]
        fen: String,
        #[arg(long)]
        depth: Option<u32>,
        /// Movetime in milliseconds
        #[arg(long)]
        movetime: Option<u64>,
    },
    /// Play a match between two configurations
    Match {
        #[arg(long)]
        config_a: Option<PathBuf>,
        /// Defaults to the baseline engine (no TT, no quiescence)
        #[arg(long)]
        config_b: Option<PathBuf>,
        #[arg(long, default_value_t = 20)]
        games: usize,
        /// Starting clock per side in milliseconds
        #[arg(long, default_value_t = 10_000)]
        clock_ms: u64,
        #[arg(long)]
        max_move_ms: Option<u64>,
        #[arg(long, default_value_t = 400)]
        max_plies: usize,
        /// FEN/EPD file with one opening per line
        #[arg(long)]
        openings: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        threads: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Print the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Count leaf nodes of the legal move tree
    Perft {
        #[arg(value_name = "DEPTH")]
        depth: u32,
        #[arg(long, default_value = "startpos")]
        fen: String,
        /// Print counts per root move
        #[arg(long, default_value_t = false)]
        divide: bool,
    },
}

fn load_config(path: Option<&PathBuf>, fallback: EngineConfig) -> Result<EngineConfig> {
    match path {
        Some(p) => EngineConfig::load(p).with_context(|| format!("loading config {}", p.display())),
        None => Ok(fallback),
    }
}

fn parse_position(fen: &str) -> Result<Position> {
    if fen == "startpos" {
        Ok(Position::startpos())
    } else {
        Ok(Position::from_fen(fen)?)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), EngineConfig::default())?;

    match cli.command.unwrap_or(Command::Uci) {
        Command::Uci => {
            UciEngine::new(config).run_loop()?;
        }
        Command::Think { fen, depth, movetime } => {
            let mut pos = parse_position(&fen)?;
            let mut searcher = config.build_searcher();
            let params = SearchParams {
                depth: depth.unwrap_or(config.depth).max(1),
                movetime: movetime.map(Duration::from_millis).or(config.search_params().movetime),
                ..config.search_params()
            };
            let t0 = Instant::now();
            let res = searcher.search_with_params(&mut pos, params);
            let dt = t0.elapsed();
            println!(
                "bestmove {} score {} depth {} nodes {} time {:.3}s",
                res.bestmove.map(|m| m.to_string()).unwrap_or_else(|| "0000".to_string()),
                format_score(res.score_cp),
                res.depth,
                res.nodes,
                dt.as_secs_f64()
            );
        }
        Command::Match { config_a, config_b, games, clock_ms, max_move_ms, max_plies, openings, threads, seed, json } => {
            let a = load_config(config_a.as_ref(), config.clone())?;
            let b = load_config(config_b.as_ref(), EngineConfig::baseline())?;
            let params = MatchParams {
                games,
                clock_ms,
                max_move_ms,
                max_plies,
                threads,
                seed,
                openings_path: openings,
                show_progress: !json,
            };
            let (summary, _records) = play_match(&a, &b, &params)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "{} vs {}: +{} -{} ={} ({:.1}/{})",
                    summary.engine_a,
                    summary.engine_b,
                    summary.a_wins,
                    summary.b_wins,
                    summary.draws,
                    summary.score_a(),
                    summary.games
                );
            }
        }
        Command::Perft { depth, fen, divide: split } => {
            let mut pos = parse_position(&fen)?;
            let t0 = Instant::now();
            let nodes = if split {
                let parts = divide(&mut pos, depth);
                for (mv, n) in &parts {
                    println!("{}: {}", mv, n);
                }
                parts.iter().map(|(_, n)| n).sum()
            } else {
                perft_parallel(&pos, depth)
            };
            let secs = t0.elapsed().as_secs_f64();
            let nps = if secs > 0.0 { nodes as f64 / secs } else { 0.0 };
            println!("nodes: {} elapsed: {:.3}s nps: {:.0}", nodes, secs, nps);
        }
    }
    Ok(())
}
