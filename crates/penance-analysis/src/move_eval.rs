//! Analysis data model: ingested games, per-ply evaluations, and the
//! per-game result.
//!
//! # Data structure
//!
//! ```text
//! GameRecord                     (from the ingestion collaborator)
//! ├─ game_id
//! └─ plies: Vec<PlyRecord>
//!     └─ (ply, side, fen_before, played_move, fen_after)
//!
//! GameAnalysisResult             (to the persistence collaborator)
//! ├─ moves: Vec<MoveEvaluation>  (immutable once computed)
//! ├─ counts: ClassificationCounts
//! ├─ pushups_earned              (derived, never set directly)
//! └─ partial + unanalyzed plies
//! ```
//!
//! `MoveEvaluation` records are created during the analysis pass and
//! never mutated afterward; re-analysis produces new records.

use chess::Color;
use chrono::{DateTime, Utc};
use penance_engine::{Fingerprint, Score};
use serde::{Deserialize, Serialize};

use crate::{classify::MoveLabel, config::AnalysisConfig, phase::GamePhase, tactical::TacticalPunishment};

/// The side that made a move.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[display("white")]
    White,
    #[display("black")]
    Black,
}

impl From<Color> for Side {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Side::White,
            Color::Black => Side::Black,
        }
    }
}

/// One half-move of an ingested game. Legality is the ingestion
/// collaborator's promise; a malformed position fails only this ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlyRecord {
    /// 1-based ply index.
    pub ply: u32,
    pub side: Side,
    pub fen_before: String,
    /// The move actually played, UCI coordinate notation.
    pub played_move: String,
    pub fen_after: String,
}

/// An ordered sequence of plies making up one completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub plies: Vec<PlyRecord>,
}

/// Why a ply was excluded from classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The engine call for this ply exceeded its deadline.
    #[display("engine timeout")]
    EngineTimeout,
    /// The ingested position or move could not be parsed.
    #[display("malformed input")]
    MalformedInput,
}

/// A ply that analysis had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnanalyzedPly {
    pub ply: u32,
    pub reason: SkipReason,
}

/// Everything computed about one analyzed ply. Immutable once built.
///
/// Both raw evaluations are expressed from the mover's perspective,
/// so `regret = win_prob_before - win_prob_after` is non-negative by
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveEvaluation {
    pub ply: u32,
    pub side: Side,
    pub position_before: Fingerprint,
    pub position_after: Fingerprint,
    pub played_move: String,
    /// The engine's preferred move at the position before.
    pub best_move: Option<String>,
    pub eval_before: Score,
    pub eval_after: Score,
    pub win_prob_before: f64,
    pub win_prob_after: f64,
    pub regret: f64,
    pub phase: GamePhase,
    pub tactical: TacticalPunishment,
    pub label: MoveLabel,
}

/// Outcome of processing one ply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlyOutcome {
    Evaluated(Box<MoveEvaluation>),
    Skipped(UnanalyzedPly),
}

/// Per-label tallies for one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub best: u32,
    pub good: u32,
    pub inaccuracy: u32,
    pub mistake: u32,
    pub blunder: u32,
}

impl ClassificationCounts {
    pub fn record(&mut self, label: MoveLabel) {
        match label {
            MoveLabel::Best => self.best += 1,
            MoveLabel::Good => self.good += 1,
            MoveLabel::Inaccuracy => self.inaccuracy += 1,
            MoveLabel::Mistake => self.mistake += 1,
            MoveLabel::Blunder => self.blunder += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.best + self.good + self.inaccuracy + self.mistake + self.blunder
    }
}

/// The finished analysis of one game.
///
/// Built only once every ply has been processed (or explicitly
/// skipped); callers never observe a game in an intermediate state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameAnalysisResult {
    pub game_id: String,
    pub analyzed_at: DateTime<Utc>,
    /// Search depth the main evaluations used.
    pub depth: u32,
    pub moves: Vec<MoveEvaluation>,
    pub counts: ClassificationCounts,
    /// Derived: `counts.blunder × pushups_per_blunder`. Only blunders
    /// contribute; mistakes and inaccuracies are informational.
    pub pushups_earned: u32,
    /// True when any ply had to be skipped.
    pub partial: bool,
    pub unanalyzed: Vec<UnanalyzedPly>,
}

impl GameAnalysisResult {
    /// Assembles the result from per-ply outcomes, in ply order.
    #[must_use]
    pub fn from_outcomes(
        game_id: String,
        outcomes: Vec<PlyOutcome>,
        config: &AnalysisConfig,
    ) -> Self {
        let mut moves = Vec::new();
        let mut unanalyzed = Vec::new();
        let mut counts = ClassificationCounts::default();
        for outcome in outcomes {
            match outcome {
                PlyOutcome::Evaluated(eval) => {
                    counts.record(eval.label);
                    moves.push(*eval);
                }
                PlyOutcome::Skipped(skip) => unanalyzed.push(skip),
            }
        }
        let pushups_earned = counts.blunder * config.pushups_per_blunder;
        Self {
            game_id,
            analyzed_at: Utc::now(),
            depth: config.search_depth,
            moves,
            counts,
            pushups_earned,
            partial: !unanalyzed.is_empty(),
            unanalyzed,
        }
    }
}
