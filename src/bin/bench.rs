use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use packbot::board::cozy::Position;
use packbot::config::EngineConfig;
use packbot::search::alphabeta::SearchParams;

const BENCH_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "6k1/5ppp/8/8/8/8/5PPP/3R2K1 w - - 0 1",
];

#[derive(Parser, Debug)]
#[command(name = "bench", version, about = "Benchmark search nodes and NPS over a fixed position set")]
struct Args {
    /// FEN string, "startpos", or "suite" for the built-in set
    #[arg(long, default_value = "suite")]
    fen: String,

    /// Movetime in milliseconds (ignored if depth is set)
    #[arg(long, default_value_t = 1000)]
    movetime: u64,

    /// Fixed search depth (overrides movetime when > 0)
    #[arg(long, default_value_t = 5)]
    depth: u32,

    /// Transposition table size in MB
    #[arg(long, default_value_t = 16)]
    hash_mb: usize,

    /// Disable the transposition table
    #[arg(long, default_value_t = false)]
    no_tt: bool,

    /// Disable quiescence search
    #[arg(long, default_value_t = false)]
    no_qsearch: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let fens: Vec<String> = match args.fen.as_str() {
        "suite" => BENCH_FENS.iter().map(|s| s.to_string()).collect(),
        "startpos" => vec![BENCH_FENS[0].to_string()],
        other => vec![other.to_string()],
    };

    let config = EngineConfig {
        name: "bench".to_string(),
        hash_mb: args.hash_mb,
        use_tt: !args.no_tt,
        use_quiescence: !args.no_qsearch,
        ..EngineConfig::default()
    };
    let mut params: SearchParams = config.search_params();
    if args.depth > 0 {
        params.depth = args.depth;
    } else {
        params.depth = 64;
        params.movetime = Some(Duration::from_millis(args.movetime));
    }

    let mut total_nodes = 0u64;
    let t_all = Instant::now();
    for fen in &fens {
        let mut pos = Position::from_fen(fen)?;
        let mut s = config.build_searcher();
        let t0 = Instant::now();
        let res = s.search_with_params(&mut pos, params);
        let dt = t0.elapsed().as_secs_f64();
        total_nodes += res.nodes;
        let nps = if dt > 0.0 { res.nodes as f64 / dt } else { 0.0 };
        println!(
            "bestmove={} score_cp={} depth={} nodes={} elapsed={:.3}s nps={:.1}",
            res.bestmove.map(|m| m.to_string()).unwrap_or_else(|| "(none)".to_string()),
            res.score_cp,
            res.depth,
            res.nodes,
            dt,
            nps
        );
    }
    let dt = t_all.elapsed().as_secs_f64();
    let nps = if dt > 0.0 { total_nodes as f64 / dt } else { 0.0 };
    println!("total nodes={} elapsed={:.3}s nps={:.1}", total_nodes, dt, nps);
    Ok(())
}
