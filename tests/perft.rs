use packbot::board::cozy::Position;
use packbot::perft::{perft, perft_parallel};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const ENDGAME: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const PROMOTIONS: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

#[test]
fn perft_startpos_small_depths() {
    let mut b = Position::startpos();
    assert_eq!(perft(&mut b, 1), 20);
    assert_eq!(perft(&mut b, 2), 400);
    assert_eq!(perft(&mut b, 3), 8902);
    assert_eq!(perft(&mut b, 4), 197281);
}

#[test]
fn perft_castling_and_en_passant() {
    let mut b = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft(&mut b, 1), 48);
    assert_eq!(perft(&mut b, 2), 2039);
    assert_eq!(perft(&mut b, 3), 97862);
}

#[test]
fn perft_endgame_and_promotions() {
    let mut e = Position::from_fen(ENDGAME).unwrap();
    assert_eq!(perft(&mut e, 4), 43238);
    let mut p = Position::from_fen(PROMOTIONS).unwrap();
    assert_eq!(perft(&mut p, 1), 44);
    assert_eq!(perft(&mut p, 2), 1486);
    assert_eq!(perft(&mut p, 3), 62379);
}

#[test]
fn parallel_matches_serial() {
    let b = Position::from_fen(KIWIPETE).unwrap();
    assert_eq!(perft_parallel(&b, 3), 97862);
}

#[test]
fn perft_leaves_position_untouched() {
    let mut b = Position::from_fen(KIWIPETE).unwrap();
    let before = b.fen();
    perft(&mut b, 3);
    assert_eq!(b.fen(), before);
}
