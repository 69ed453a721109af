use cozy_chess::Color;
use packbot::board::cozy::Position;
use packbot::board::SearchBoard;
use packbot::uci::UciEngine;

#[test]
fn apply_startpos_moves_sequence() {
    let moves = vec!["e2e4".to_string(), "e7e5".to_string(), "g1f3".to_string()];
    let pos = Position::set_from_start_and_moves(&moves).expect("legal move sequence");
    assert_eq!(pos.side_to_move(), Color::Black, "expected black to move after 3 plies");
}

#[test]
fn castling_accepts_both_notations() {
    let line = ["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"];
    for castle in ["e1g1", "e1h1"] {
        let mut moves: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        moves.push(castle.to_string());
        let pos = Position::set_from_start_and_moves(&moves).expect("castling is legal");
        assert!(pos.fen().contains("RNBQ1RK1 b kq -"), "{castle}: {}", pos.fen());
    }
}

#[test]
fn uci_session_plays_a_move_from_moves_list() {
    let mut engine = UciEngine::default();
    let mut out = Vec::new();
    for cmd in ["ucinewgame", "position startpos moves e2e4 e7e5", "go depth 2"] {
        assert!(engine.handle_line(cmd, &mut out).unwrap());
    }
    let text = String::from_utf8(out).unwrap();
    let best = text.lines().last().and_then(|l| l.strip_prefix("bestmove ")).expect("bestmove line");
    assert!(engine.position().find_move(best).is_some(), "bestmove {best} is not legal");
}

#[test]
fn setoption_changes_depth() {
    let mut engine = UciEngine::default();
    let mut out = Vec::new();
    engine.handle_line("setoption name Depth value 1", &mut out).unwrap();
    engine.handle_line("go", &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("info depth 1 "), "{text}");
}
