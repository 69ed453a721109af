use packbot::board::cozy::Position;
use packbot::search::eval::{eval_cp, eval_cp_for};
use packbot::search::tables::{pack, square_value, unpack, PACKED};
use cozy_chess::{Color, Piece, Square};

#[test]
fn knight_center_better_than_rim() {
    // White: Kh1, Nd4; Black: Ka8. White to move.
    let center = Position::from_fen("k7/8/8/8/3N4/8/8/7K w - - 0 1").unwrap();
    let rim = Position::from_fen("k7/8/8/8/8/8/8/N6K w - - 0 1").unwrap();
    let c = eval_cp(&center);
    let r = eval_cp(&rim);
    assert!(c > r, "center eval {c} should be greater than rim {r}");
}

#[test]
fn pawn_advanced_better_than_back() {
    let advanced = Position::from_fen("k7/8/8/8/4P3/8/8/7K w - - 0 1").unwrap();
    let back = Position::from_fen("k7/8/8/8/8/8/4P3/7K w - - 0 1").unwrap();
    let a = eval_cp(&advanced);
    let b = eval_cp(&back);
    assert!(a > b, "advanced pawn eval {a} should exceed back pawn {b}");
}

#[test]
fn castled_king_is_preferred() {
    assert!(square_value(Color::White, Piece::King, Square::G1) > square_value(Color::White, Piece::King, Square::E2));
    assert!(square_value(Color::Black, Piece::King, Square::G8) > square_value(Color::Black, Piece::King, Square::E7));
}

#[test]
fn evaluation_is_zero_sum() {
    let pos = Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4").unwrap();
    assert_eq!(eval_cp_for(&pos, Color::White), -eval_cp_for(&pos, Color::Black));
    assert_eq!(eval_cp(&pos), eval_cp_for(&pos, Color::White));
}

#[test]
fn packed_tables_round_trip() {
    assert_eq!(pack(&unpack(&PACKED)), PACKED);
}
