//! Game phase detection.
//!
//! Classification thresholds vary by phase: the opening gets leniency
//! for theory flexibility, and the mistake band only applies in the
//! middlegame. Phase is a pure function of the ply index and the board
//! before the move; no state carries across games.

use chess::{Board, Piece};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// The three classification contexts of a game.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[display("opening")]
    Opening,
    #[display("middlegame")]
    Middlegame,
    #[display("endgame")]
    Endgame,
}

/// Number of non-king, non-pawn pieces on the board, both sides.
#[must_use]
pub fn piece_material(board: &Board) -> u32 {
    [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight]
        .into_iter()
        .map(|piece| board.pieces(piece).popcnt())
        .sum()
}

/// Classifies the phase of the position before a move.
///
/// Opening: within the configured ply cutoff and no capture has
/// happened yet (every one of the 32 starting pieces is still on the
/// board). Endgame: piece material below the configured threshold.
/// Middlegame otherwise.
#[must_use]
pub fn classify_phase(board_before: &Board, ply: u32, config: &AnalysisConfig) -> GamePhase {
    let no_material_lost = board_before.combined().popcnt() == 32;
    if ply <= config.opening_max_ply && no_material_lost {
        return GamePhase::Opening;
    }
    if piece_material(board_before) < config.endgame_piece_threshold {
        return GamePhase::Endgame;
    }
    GamePhase::Middlegame
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    // Rook endgame: two rooks and kings.
    const ROOK_ENDING: &str = "6k1/8/8/8/8/8/r7/R5K1 w - - 0 1";
    // Full middlegame material, one pawn traded.
    const PAWN_TRADED: &str =
        "rnbqkbnr/ppp2ppp/8/3p4/3P4/8/PPP2PPP/RNBQKBNR w KQkq - 0 4";

    fn board(fen: &str) -> Board {
        Board::from_str(fen).unwrap()
    }

    #[test]
    fn early_ply_with_full_material_is_opening() {
        let config = AnalysisConfig::default();
        assert_eq!(classify_phase(&board(START), 1, &config), GamePhase::Opening);
        assert_eq!(
            classify_phase(&board(START), 16, &config),
            GamePhase::Opening
        );
    }

    #[test]
    fn past_the_cutoff_is_no_longer_opening() {
        let config = AnalysisConfig::default();
        assert_eq!(
            classify_phase(&board(START), 17, &config),
            GamePhase::Middlegame
        );
    }

    #[test]
    fn early_capture_ends_the_opening() {
        let config = AnalysisConfig::default();
        assert_eq!(
            classify_phase(&board(PAWN_TRADED), 7, &config),
            GamePhase::Middlegame
        );
    }

    #[test]
    fn low_material_is_endgame() {
        let config = AnalysisConfig::default();
        assert_eq!(piece_material(&board(ROOK_ENDING)), 2);
        assert_eq!(
            classify_phase(&board(ROOK_ENDING), 60, &config),
            GamePhase::Endgame
        );
    }

    #[test]
    fn pawns_do_not_count_as_piece_material() {
        // Kings and pawns only: zero piece material.
        let pawn_ending = board("4k3/pppp4/8/8/8/8/PPPP4/4K3 w - - 0 1");
        assert_eq!(piece_material(&pawn_ending), 0);
    }

    #[test]
    fn threshold_is_configurable() {
        let config = AnalysisConfig {
            endgame_piece_threshold: 2,
            ..AnalysisConfig::default()
        };
        // Two pieces no longer fall below the threshold.
        assert_eq!(
            classify_phase(&board(ROOK_ENDING), 60, &config),
            GamePhase::Middlegame
        );
    }
}
