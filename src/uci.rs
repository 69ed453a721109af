use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::board::cozy::Position;
use crate::board::SearchBoard;
use crate::config::EngineConfig;
use crate::search::alphabeta::{SearchParams, SearchResult, Searcher};
use crate::search::eval::{is_mate_score, MATE_SCORE};
use crate::search::ordering::order_moves;
use crate::search::tt::Tt;

/// Limits parsed from a `go` command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GoLimits {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub nodes: Option<u64>,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: u64,
    pub binc: u64,
    pub infinite: bool,
}

impl GoLimits {
    pub fn parse(args: &str) -> Self {
        let mut limits = Self::default();
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            let mut num = || tokens.next().and_then(|s| s.parse::<u64>().ok());
            match tok {
                "depth" => limits.depth = num().map(|d| d as u32),
                "movetime" => limits.movetime = num(),
                "nodes" => limits.nodes = num(),
                "wtime" => limits.wtime = num(),
                "btime" => limits.btime = num(),
                "winc" => limits.winc = num().unwrap_or(0),
                "binc" => limits.binc = num().unwrap_or(0),
                "infinite" => limits.infinite = true,
                _ => {}
            }
        }
        limits
    }

    /// Time for this move: an explicit movetime wins, otherwise a fortieth of
    /// the remaining clock plus half the increment, never more than half the clock.
    pub fn budget(&self, white_to_move: bool) -> Option<Duration> {
        if let Some(ms) = self.movetime {
            return Some(Duration::from_millis(ms.max(1)));
        }
        let (clock, inc) = if white_to_move { (self.wtime?, self.winc) } else { (self.btime?, self.binc) };
        let ms = (clock / 40 + inc / 2).min(clock / 2).max(1);
        Some(Duration::from_millis(ms))
    }
}

/// `score cp N` or `score mate N` (moves, negative when getting mated).
pub fn format_score(score: i32) -> String {
    if is_mate_score(score) {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {}", score)
    }
}

/// A `go infinite` search running on a worker thread. The searcher travels
/// with it and comes back when the thread is joined.
struct PendingSearch {
    handle: JoinHandle<(Searcher, SearchResult, u64)>,
    stop: Arc<AtomicBool>,
}

pub struct UciEngine {
    pos: Position,
    searcher: Searcher,
    config: EngineConfig,
    pending: Option<PendingSearch>,
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl UciEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { pos: Position::startpos(), searcher: config.build_searcher(), config, pending: None }
    }

    pub fn position(&self) -> &Position {
        &self.pos
    }

    fn cmd_uci<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name {}", self.config.name)?;
        writeln!(out, "id author packbot developers")?;
        writeln!(out, "option name Hash type spin default {} min 1 max 4096", self.config.hash_mb)?;
        writeln!(out, "option name Depth type spin default {} min 1 max 64", self.config.depth)?;
        writeln!(out, "option name UseTT type check default {}", self.config.use_tt)?;
        writeln!(out, "option name Quiescence type check default {}", self.config.use_quiescence)?;
        writeln!(out, "uciok")
    }

    fn cmd_setoption<W: Write>(&mut self, args: &str, out: &mut W) -> io::Result<()> {
        // setoption name <id> value <x>
        let rest = args.strip_prefix("name ").unwrap_or(args);
        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };
        match name.to_ascii_lowercase().as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(mb) => {
                    self.config.hash_mb = mb.max(1);
                    self.searcher.set_tt_capacity_mb(self.config.hash_mb);
                }
                Err(_) => writeln!(out, "info string bad Hash value '{}'", value)?,
            },
            "depth" => match value.parse::<u32>() {
                Ok(d) => self.config.depth = d.max(1),
                Err(_) => writeln!(out, "info string bad Depth value '{}'", value)?,
            },
            "usett" => self.config.use_tt = value == "true",
            "quiescence" => self.config.use_quiescence = value == "true",
            _ => writeln!(out, "info string unknown option '{}'", name)?,
        }
        self.searcher.set_params(self.config.search_params());
        Ok(())
    }

    fn cmd_position<W: Write>(&mut self, args: &str, out: &mut W) -> io::Result<()> {
        // position startpos [moves ...] | position fen <6 fields> [moves ...]
        let (head, moves) = match args.split_once(" moves") {
            Some((h, m)) => (h.trim(), m.split_whitespace().map(str::to_string).collect::<Vec<_>>()),
            None => (args.trim(), Vec::new()),
        };
        let parsed = if head == "startpos" {
            Position::set_from_start_and_moves(&moves)
        } else if let Some(fen) = head.strip_prefix("fen ") {
            Position::from_fen_and_moves(fen.trim(), &moves)
        } else {
            writeln!(out, "info string malformed position command")?;
            return Ok(());
        };
        match parsed {
            Ok(pos) => self.pos = pos,
            Err(e) => {
                warn!("rejected position command: {}", e);
                writeln!(out, "info string {}", e)?;
            }
        }
        Ok(())
    }

    fn cmd_go<W: Write>(&mut self, args: &str, out: &mut W) -> io::Result<()> {
        let limits = GoLimits::parse(args);
        let base = self.config.search_params();
        let white = self.pos.side_to_move() == cozy_chess::Color::White;
        let params = SearchParams {
            depth: limits.depth.unwrap_or(if limits.infinite { 64 } else { base.depth }).max(1),
            movetime: limits.budget(white).or(base.movetime),
            max_nodes: limits.nodes.or(base.max_nodes),
            ..base
        };
        debug!("go {:?}", params);

        if limits.infinite {
            self.spawn_search(params);
            return Ok(());
        }
        let t0 = Instant::now();
        let res = self.searcher.search_with_params(&mut self.pos, params);
        self.report(&res, t0.elapsed().as_millis() as u64, out)
    }

    fn spawn_search(&mut self, params: SearchParams) {
        let stop = Arc::new(AtomicBool::new(false));
        let placeholder = Searcher::new(self.config.search_params(), Tt::with_capacity_entries(1));
        let mut searcher = std::mem::replace(&mut self.searcher, placeholder);
        searcher.set_abort(Some(stop.clone()));
        let mut pos = self.pos.clone();
        let handle = thread::spawn(move || {
            let t0 = Instant::now();
            let res = searcher.search_with_params(&mut pos, params);
            searcher.set_abort(None);
            (searcher, res, t0.elapsed().as_millis() as u64)
        });
        self.pending = Some(PendingSearch { handle, stop });
    }

    /// Stops a running `go infinite` search and prints its result.
    fn finish_search<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        pending.stop.store(true, Ordering::Relaxed);
        match pending.handle.join() {
            Ok((searcher, res, elapsed)) => {
                self.searcher = searcher;
                self.report(&res, elapsed, out)
            }
            Err(_) => {
                warn!("search thread panicked; rebuilding searcher");
                self.searcher = self.config.build_searcher();
                self.report(&SearchResult::default(), 0, out)
            }
        }
    }

    fn report<W: Write>(&self, res: &SearchResult, elapsed: u64, out: &mut W) -> io::Result<()> {
        let best = self.resolve_bestmove(res);

        if let Some(mv) = best {
            let nps = res.nodes * 1000 / elapsed.max(1);
            writeln!(
                out,
                "info depth {} score {} nodes {} nps {} time {} pv {}",
                res.depth,
                format_score(res.score_cp),
                res.nodes,
                nps,
                elapsed,
                mv
            )?;
            writeln!(out, "bestmove {}", mv)
        } else {
            writeln!(out, "bestmove 0000")
        }
    }

    // A result that names no legal move falls back to the first ordered move.
    fn resolve_bestmove(&self, res: &SearchResult) -> Option<crate::board::Move> {
        let legal = self.pos.legal_moves();
        if legal.is_empty() {
            return None;
        }
        match res.bestmove.filter(|m| legal.contains(m)) {
            Some(mv) => Some(mv),
            None => order_moves(&self.pos, &legal, None).first().map(|sm| sm.mv),
        }
    }

    /// Handles one command line. Returns `false` on `quit`.
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<bool> {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        // Anything but a readiness check ends a pending infinite search first.
        if !matches!(cmd, "" | "isready") {
            self.finish_search(out)?;
        }
        match cmd {
            "" => {}
            "uci" => self.cmd_uci(out)?,
            "isready" => writeln!(out, "readyok")?,
            "ucinewgame" => {
                self.pos = Position::startpos();
                self.searcher.clear_tt();
            }
            "setoption" => self.cmd_setoption(rest, out)?,
            "position" => self.cmd_position(rest, out)?,
            "go" => self.cmd_go(rest, out)?,
            "d" => writeln!(out, "{}", self.pos.fen())?,
            // handled by finish_search above
            "stop" | "ponderhit" => {}
            "quit" => return Ok(false),
            other => debug!("ignoring unknown command '{}'", other),
        }
        out.flush()?;
        Ok(true)
    }

    pub fn run_loop(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut out = stdout.lock();
        for line in stdin.lock().lines() {
            if !self.handle_line(&line?, &mut out)? {
                return Ok(());
            }
        }
        self.finish_search(&mut out)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(engine: &mut UciEngine, cmds: &[&str]) -> String {
        let mut out = Vec::new();
        for c in cmds {
            engine.handle_line(c, &mut out).unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn handshake() {
        let mut e = UciEngine::default();
        let text = run(&mut e, &["uci", "isready"]);
        assert!(text.contains("id name packbot"));
        assert!(text.contains("uciok"));
        assert!(text.ends_with("readyok\n"));
    }

    #[test]
    fn fen_with_moves_applies_moves() {
        let mut e = UciEngine::default();
        run(&mut e, &["position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4 e8d7"]);
        assert_eq!(e.position().fen(), "8/3k4/8/8/4P3/8/8/4K3 w - - 1 2");
    }

    #[test]
    fn illegal_move_keeps_previous_position() {
        let mut e = UciEngine::default();
        let text = run(&mut e, &["position startpos moves e2e5"]);
        assert!(text.contains("illegal move"));
        assert_eq!(e.position().fen(), Position::startpos().fen());
    }

    #[test]
    fn go_depth_reports_bestmove() {
        let mut e = UciEngine::default();
        let text = run(&mut e, &["position fen 6k1/8/6K1/8/8/8/8/R7 w - - 0 1", "go depth 3"]);
        assert!(text.contains("score mate 1"), "{text}");
        assert!(text.ends_with("bestmove a1a8\n"), "{text}");
    }

    #[test]
    fn go_without_moves_prints_null_move() {
        let mut e = UciEngine::default();
        let text = run(&mut e, &["position fen 7k/6Q1/6K1/8/8/8/8/8 b - - 0 1", "go depth 2"]);
        assert_eq!(text, "bestmove 0000\n");
    }

    #[test]
    fn go_infinite_answers_on_stop() {
        let mut e = UciEngine::default();
        let text = run(&mut e, &["position startpos moves e2e4", "go infinite"]);
        assert!(!text.contains("bestmove"), "{text}");
        std::thread::sleep(Duration::from_millis(50));
        let text = run(&mut e, &["isready", "stop"]);
        assert!(text.starts_with("readyok\n"), "{text}");
        let last = text.lines().last().unwrap();
        let mv = last.strip_prefix("bestmove ").expect(last);
        assert!(e.position().legal_moves().iter().any(|m| m.to_string() == mv), "{mv}");
        // The searcher is back and usable for a normal search.
        let text = run(&mut e, &["go depth 2"]);
        assert!(text.contains("bestmove "), "{text}");
    }

    #[test]
    fn quit_finishes_infinite_search() {
        let mut e = UciEngine::default();
        let mut out = Vec::new();
        e.handle_line("go infinite", &mut out).unwrap();
        assert!(!e.handle_line("quit", &mut out).unwrap());
        assert!(String::from_utf8(out).unwrap().contains("bestmove "));
    }

    #[test]
    fn quit_stops_the_loop() {
        let mut e = UciEngine::default();
        let mut out = Vec::new();
        assert!(!e.handle_line("quit", &mut out).unwrap());
    }

    #[test]
    fn clock_budget() {
        let l = GoLimits::parse("wtime 40000 btime 20000 winc 1000 binc 0");
        assert_eq!(l.budget(true), Some(Duration::from_millis(1500)));
        assert_eq!(l.budget(false), Some(Duration::from_millis(500)));
        assert_eq!(GoLimits::parse("movetime 250").budget(false), Some(Duration::from_millis(250)));
        assert_eq!(GoLimits::parse("depth 4").budget(true), None);
    }

    #[test]
    fn mate_scores_print_in_moves() {
        assert_eq!(format_score(MATE_SCORE - 1), "mate 1");
        assert_eq!(format_score(MATE_SCORE - 3), "mate 2");
        assert_eq!(format_score(-(MATE_SCORE - 2)), "mate -1");
        assert_eq!(format_score(35), "cp 35");
    }
}
