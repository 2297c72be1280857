//! Analysis tunables.
//!
//! Every threshold the classification rules consult lives here as one
//! named field, overridable from a JSON file without code changes.
//! Unset fields fall back to their defaults, so a config file only
//! needs to name what it changes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for a full game analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Calibration constant `c` of the win-probability sigmoid
    /// `1 / (1 + e^(-c * cp))`.
    pub win_prob_calibration: f64,
    /// Search depth for the main before/after evaluations.
    pub search_depth: u32,
    /// Per-call engine deadline in milliseconds.
    pub engine_timeout_ms: u64,
    /// Last ply still considered opening (8 full moves per side).
    pub opening_max_ply: u32,
    /// A position with fewer than this many non-king, non-pawn pieces
    /// is an endgame.
    pub endgame_piece_threshold: u32,
    /// Scale factor (> 1) applied to regret/centipawn bounds while in
    /// the opening. Never applied to the reversal or tactical triggers.
    pub opening_leniency: f64,
    /// Regret at or above this is a blunder.
    pub blunder_regret: f64,
    /// Lower regret bound of the middlegame mistake band.
    pub mistake_regret: f64,
    /// Lower regret bound of the inaccuracy band.
    pub inaccuracy_regret: f64,
    /// Raw centipawn loss strictly above this is a blunder.
    pub blunder_cp_loss: i32,
    /// "Clearly winning" centipawn mark for the reversal trigger.
    pub reversal_winning_cp: i32,
    /// "Clearly losing" centipawn mark for the reversal trigger.
    pub reversal_losing_cp: i32,
    /// Search depth of the shallow tactical-punishment lookahead.
    pub tactical_lookahead_plies: u32,
    /// Evaluation swing (in centipawns) that marks a move as
    /// tactically punished.
    pub tactical_swing_cp: i32,
    /// Pushups owed per blunder.
    pub pushups_per_blunder: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            win_prob_calibration: 0.003,
            search_depth: 18,
            engine_timeout_ms: 15_000,
            opening_max_ply: 16,
            endgame_piece_threshold: 7,
            opening_leniency: 2.0,
            blunder_regret: 0.20,
            mistake_regret: 0.08,
            inaccuracy_regret: 0.02,
            blunder_cp_loss: 400,
            reversal_winning_cp: 200,
            reversal_losing_cp: -100,
            tactical_lookahead_plies: 2,
            tactical_swing_cp: 400,
            pushups_per_blunder: 10,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn engine_timeout(&self) -> Duration {
        Duration::from_millis(self.engine_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_override_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "blunder_regret": 0.25, "search_depth": 12 }"#).unwrap();
        assert_eq!(config.blunder_regret, 0.25);
        assert_eq!(config.search_depth, 12);
        assert_eq!(config.pushups_per_blunder, 10);
        assert_eq!(config.opening_leniency, 2.0);
    }
}
