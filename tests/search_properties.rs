use packbot::board::cozy::Position;
use packbot::board::{MoveList, SearchBoard};
use packbot::search::alphabeta::{SearchParams, SearchResult, Searcher};
use packbot::search::eval::{eval_cp, move_delta, DRAW_SCORE, INFINITY, MATE_SCORE};

const POSITIONS: &[&str] = &[
    "4k3/8/8/3q4/n2R4/8/8/4K3 w - - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

const SPECIAL_MOVES: &[&str] = &[
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1",
    "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
    "8/8/8/8/1k6/8/p1K5/1N6 b - - 0 1",
];

// Plain negamax without pruning, following the same node rules as the engine.
fn reference(board: &mut Position, depth: i32, ply: i32, quiescence: bool) -> i32 {
    if ply > 0 && board.is_draw() {
        return DRAW_SCORE;
    }
    if board.is_checkmate() {
        return -MATE_SCORE + ply;
    }
    let quiescent = depth <= 0;
    if quiescent && !quiescence {
        return eval_cp(board);
    }
    let mut moves = MoveList::new();
    board.generate_moves(quiescent, &mut moves);
    if moves.is_empty() && !quiescent {
        return DRAW_SCORE;
    }
    let mut best = if quiescent { eval_cp(board) } else { -INFINITY };
    for &mv in &moves {
        board.make_move(mv);
        let score = -reference(board, depth - 1, ply + 1, quiescence);
        board.undo_move(mv);
        best = best.max(score);
    }
    best
}

fn engine_search(fen: &str, depth: u32, quiescence: bool) -> SearchResult {
    let mut pos = Position::from_fen(fen).unwrap();
    let params = SearchParams { use_tt: false, use_quiescence: quiescence, ..SearchParams::default() };
    Searcher::with_params(params).search_depth(&mut pos, depth)
}

fn engine_score(fen: &str, depth: u32, quiescence: bool) -> i32 {
    engine_search(fen, depth, quiescence).score_cp
}

#[test]
fn alpha_beta_matches_full_minimax() {
    for fen in POSITIONS {
        let depth = if fen.starts_with("r1bq") { 2 } else { 3 };
        for quiescence in [false, true] {
            let mut pos = Position::from_fen(fen).unwrap();
            let expected = reference(&mut pos, depth, 0, quiescence);
            let res = engine_search(fen, depth as u32, quiescence);
            assert_eq!(res.score_cp, expected, "{fen} depth {depth} q {quiescence}");
            // Ties may pick a different move than generation order would, but
            // the chosen move must reach the minimax value.
            let mv = res.bestmove.expect("root move");
            pos.make_move(mv);
            let via_move = -reference(&mut pos, depth - 1, 1, quiescence);
            pos.undo_move(mv);
            assert_eq!(via_move, expected, "{fen}: {mv} does not reach the minimax value");
        }
    }
}

#[test]
fn incremental_delta_matches_full_evaluation() {
    for fen in POSITIONS.iter().chain(SPECIAL_MOVES) {
        let mut pos = Position::from_fen(fen).unwrap();
        let parent = eval_cp(&pos);
        for mv in pos.legal_moves() {
            let delta = move_delta(&pos, mv);
            pos.make_move(mv);
            assert_eq!(eval_cp(&pos), -(parent + delta), "{fen} after {mv}");
            pos.undo_move(mv);
        }
    }
}

#[test]
fn mirrored_positions_score_the_same() {
    for fen in POSITIONS {
        let pos = Position::from_fen(fen).unwrap();
        let mirrored = pos.mirrored().unwrap();
        assert_eq!(eval_cp(&pos), eval_cp(&mirrored), "{fen}");
        let depth = if fen.starts_with("r1bq") { 2 } else { 3 };
        assert_eq!(
            engine_score(fen, depth, true),
            engine_score(&mirrored.fen(), depth, true),
            "{fen} vs {}",
            mirrored.fen()
        );
    }
}

#[test]
fn repetition_inside_the_tree_scores_as_draw() {
    // Queen up for White; shuffling the queen back repeats the position.
    let moves: Vec<String> = ["g1h1", "a8b8", "h1g1", "b8a8"].iter().map(|s| s.to_string()).collect();
    let mut pos = Position::from_fen_and_moves("k7/8/8/8/8/8/8/K5Q1 w - - 0 1", &moves).unwrap();
    let mut searcher = Searcher::default();
    let scores = searcher.score_moves(&mut pos, 2);
    let repeat = scores.iter().find(|(m, _)| m.to_string() == "g1h1").unwrap().1;
    assert_eq!(repeat, DRAW_SCORE);
    assert!(scores[0].1 > 500, "best move should keep the extra queen: {:?}", scores[0]);
}
