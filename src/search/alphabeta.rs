use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::board::{Move, MoveList, SearchBoard};
use crate::error::{EngineError, Result};
use crate::search::eval::{eval_cp, is_mate_score, DRAW_SCORE, INFINITY, MATE_SCORE};
use crate::search::ordering::order_moves;
use crate::search::tt::{score_from_tt, score_to_tt, Bound, Tt};

pub const DEFAULT_DEPTH: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub depth: u32,
    pub movetime: Option<Duration>,
    pub max_nodes: Option<u64>,
    pub use_tt: bool,
    pub use_quiescence: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self { depth: DEFAULT_DEPTH, movetime: None, max_nodes: None, use_tt: true, use_quiescence: true }
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub bestmove: Option<Move>,
    pub score_cp: i32,
    pub nodes: u64,
    /// Last fully completed iteration.
    pub depth: u32,
}

/// State owned by one search invocation: the root best-move register,
/// node accounting and the stop conditions.
struct SearchContext {
    root_ply: u32,
    best_move: Option<Move>,
    nodes: u64,
    node_limit: u64,
    deadline: Option<Instant>,
    interruptible: bool,
    aborted: bool,
    stop: Option<Arc<AtomicBool>>,
    use_tt: bool,
    use_quiescence: bool,
}

impl SearchContext {
    fn new(root_ply: u32, params: &SearchParams) -> Self {
        Self {
            root_ply,
            best_move: None,
            nodes: 0,
            node_limit: u64::MAX,
            deadline: None,
            interruptible: false,
            aborted: false,
            stop: None,
            use_tt: params.use_tt,
            use_quiescence: params.use_quiescence,
        }
    }

    fn should_stop(&mut self) -> bool {
        if !self.interruptible || self.aborted {
            return self.aborted;
        }
        let stop_requested = self.stop.as_ref().is_some_and(|f| f.load(Ordering::Relaxed));
        if self.nodes >= self.node_limit || stop_requested {
            self.aborted = true;
        } else if self.nodes & 1023 == 0 {
            if let Some(dl) = self.deadline {
                self.aborted = Instant::now() >= dl;
            }
        }
        self.aborted
    }
}

/// Negamax alpha-beta searcher. Owns its transposition table; one searcher
/// per game, never shared between threads.
#[derive(Default)]
pub struct Searcher {
    tt: Tt,
    params: SearchParams,
    abort: Option<Arc<AtomicBool>>,
}

impl Searcher {
    pub fn new(params: SearchParams, tt: Tt) -> Self {
        Self { tt, params, abort: None }
    }

    pub fn with_params(params: SearchParams) -> Self {
        Self { tt: Tt::default(), params, abort: None }
    }

    pub fn params(&self) -> SearchParams {
        self.params
    }

    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    /// Flag polled during search; once set, the current iteration is
    /// abandoned (depth 1 still completes).
    pub fn set_abort(&mut self, flag: Option<Arc<AtomicBool>>) {
        self.abort = flag;
    }

    fn abort_requested(&self) -> bool {
        self.abort.as_ref().is_some_and(|f| f.load(Ordering::Relaxed))
    }

    pub fn set_tt_capacity_mb(&mut self, mb: usize) {
        self.tt = Tt::with_capacity_mb(mb);
    }

    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    pub fn tt(&self) -> &Tt {
        &self.tt
    }

    pub fn tt_probe<B: SearchBoard>(&self, board: &B) -> Option<(u32, Bound)> {
        self.tt.probe(board.hash()).map(|e| (e.depth, e.bound))
    }

    /// Picks a legal move within `budget`, searching up to the configured depth.
    pub fn choose_move<B: SearchBoard>(&mut self, board: &mut B, budget: Duration) -> Result<Move> {
        let mut legal = MoveList::new();
        board.generate_moves(false, &mut legal);
        if legal.is_empty() {
            return Err(EngineError::NoLegalMoves(board.hash()));
        }
        let params = SearchParams { movetime: Some(budget), ..self.params };
        let res = self.search_with_params(board, params);
        match res.bestmove.filter(|m| legal.contains(m)) {
            Some(mv) => Ok(mv),
            None => {
                warn!("search produced no root move (hash {:#018x}); using first ordered move", board.hash());
                Ok(order_moves(board, &legal, None)[0].mv)
            }
        }
    }

    /// Fixed-depth search without time or node limits.
    pub fn search_depth<B: SearchBoard>(&mut self, board: &mut B, depth: u32) -> SearchResult {
        let params = SearchParams { depth, movetime: None, max_nodes: None, ..self.params };
        self.search_with_params(board, params)
    }

    /// Iterative deepening from depth 1. The first iteration always
    /// completes; later ones stop cooperatively on the node or time budget and
    /// an interrupted iteration is discarded.
    pub fn search_with_params<B: SearchBoard>(&mut self, board: &mut B, params: SearchParams) -> SearchResult {
        let deadline = params.movetime.map(|d| Instant::now() + d);
        let node_budget = params.max_nodes.unwrap_or(u64::MAX);
        let root_eval = eval_cp(board);
        let mut result = SearchResult::default();
        let mut total_nodes = 0u64;

        for depth in 1..=params.depth.max(1) {
            let mut ctx = SearchContext::new(board.ply_count(), &params);
            ctx.node_limit = node_budget.saturating_sub(total_nodes);
            ctx.deadline = deadline;
            ctx.interruptible = depth > 1;
            ctx.stop = self.abort.clone();

            let score = self.negamax(&mut ctx, board, depth as i32, -INFINITY, INFINITY, root_eval);
            total_nodes += ctx.nodes;
            if ctx.aborted {
                debug!("depth {} interrupted after {} nodes", depth, ctx.nodes);
                break;
            }
            result = SearchResult {
                bestmove: ctx.best_move.or(result.bestmove),
                score_cp: score,
                nodes: total_nodes,
                depth,
            };
            debug!(
                "depth {} score {} nodes {} best {}",
                depth,
                score,
                total_nodes,
                result.bestmove.map(|m| m.to_string()).unwrap_or_else(|| "(none)".to_string())
            );

            if is_mate_score(score) || total_nodes >= node_budget || self.abort_requested() {
                break;
            }
            if let Some(dl) = deadline {
                if Instant::now() >= dl {
                    break;
                }
            }
        }
        result.nodes = total_nodes;
        result
    }

    /// Full-window score of every legal root move at `depth`, best first.
    pub fn score_moves<B: SearchBoard>(&mut self, board: &mut B, depth: u32) -> Vec<(Move, i32)> {
        let mut legal = MoveList::new();
        board.generate_moves(false, &mut legal);
        let root_eval = eval_cp(board);
        let root_ply = board.ply_count();
        let ordered = order_moves(board, &legal, None);

        let mut scores = Vec::with_capacity(ordered.len());
        for sm in &ordered {
            let mut ctx = SearchContext::new(root_ply, &self.params);
            board.make_move(sm.mv);
            let score = -self.negamax(&mut ctx, board, depth as i32 - 1, -INFINITY, INFINITY, -(root_eval + sm.delta));
            board.undo_move(sm.mv);
            scores.push((sm.mv, score));
        }
        scores.sort_by_key(|&(_, s)| -s);
        scores
    }

    /// Quiescence-only score of `board` from the side to move's perspective.
    pub fn qsearch_eval_cp<B: SearchBoard>(&mut self, board: &mut B) -> i32 {
        let mut ctx = SearchContext::new(board.ply_count(), &self.params);
        ctx.use_quiescence = true;
        let stand = eval_cp(board);
        self.negamax(&mut ctx, board, 0, -INFINITY, INFINITY, stand)
    }

    fn negamax<B: SearchBoard>(
        &mut self,
        ctx: &mut SearchContext,
        board: &mut B,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        partial: i32,
    ) -> i32 {
        ctx.nodes += 1;
        if ctx.should_stop() {
            return 0;
        }
        debug_assert_eq!(partial, eval_cp(board), "incremental evaluation drifted");

        let ply = board.ply_count().saturating_sub(ctx.root_ply) as i32;
        let is_root = ply == 0;

        // The root is always a position that needs a move.
        if !is_root && board.is_draw() {
            return DRAW_SCORE;
        }
        if board.is_checkmate() {
            return -MATE_SCORE + ply;
        }

        let key = board.hash();
        let mut tt_move = None;
        if ctx.use_tt {
            if let Some(entry) = self.tt.probe(key) {
                tt_move = entry.best;
                if is_root && entry.best.is_some() {
                    ctx.best_move = entry.best;
                }
                if entry.depth as i32 >= depth {
                    let score = score_from_tt(entry.score, ply);
                    let cutoff = match entry.bound {
                        Bound::Exact => Some(score),
                        Bound::Lower if score >= beta => Some(beta),
                        Bound::Upper if score <= alpha => Some(alpha),
                        _ => None,
                    };
                    if let Some(value) = cutoff {
                        return value;
                    }
                }
            }
        }

        let quiescent = depth <= 0;
        if quiescent {
            if !ctx.use_quiescence {
                return partial;
            }
            // Stand pat
            if partial >= beta {
                return beta;
            }
            if partial > alpha {
                alpha = partial;
            }
        }

        let mut moves = MoveList::new();
        board.generate_moves(quiescent, &mut moves);
        if moves.is_empty() && !quiescent {
            // Only reachable at the root, where the draw check is skipped.
            return DRAW_SCORE;
        }
        let ordered = order_moves(board, &moves, tt_move);

        let orig_alpha = alpha;
        let mut best_move = None;
        let mut best_score = -INFINITY;
        for sm in &ordered {
            board.make_move(sm.mv);
            let score = -self.negamax(ctx, board, depth - 1, -beta, -alpha, -(partial + sm.delta));
            board.undo_move(sm.mv);
            if ctx.aborted {
                return 0;
            }

            if score > best_score {
                best_score = score;
                best_move = Some(sm.mv);
            }
            if score > alpha {
                alpha = score;
                if is_root {
                    ctx.best_move = Some(sm.mv);
                }
            }
            if alpha >= beta {
                alpha = beta;
                break;
            }
        }

        if quiescent {
            return alpha;
        }

        let bound = if alpha <= orig_alpha {
            Bound::Upper
        } else if alpha >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        if ctx.use_tt {
            self.tt.store(key, best_move, depth as u32, score_to_tt(alpha, ply), bound);
        }
        if is_root && ctx.best_move.is_none() {
            ctx.best_move = best_move;
        }
        alpha
    }
}
