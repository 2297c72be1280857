//! Raw evaluation values as reported by the engine.
//!
//! A [`Score`] is always relative to the side to move, as in the UCI
//! protocol. The analysis layer flips it to the mover's perspective
//! where needed via [`Score::flipped`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Centipawn magnitude assigned to a forced mate.
///
/// Mate distances shave 10cp per move so that a nearer mate always
/// compares higher than a more distant one.
pub const MATE_CP: i32 = 10_000;

/// A single position evaluation: either a centipawn value or a forced
/// mate distance, both signed from the side to move's perspective.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::IsVariant,
)]
#[serde(rename_all = "snake_case")]
pub enum Score {
    /// Positional evaluation in centipawns (100 = one pawn).
    Centipawns(i32),
    /// Forced mate in N moves. Positive: the side to move mates.
    /// Zero or negative: the side to move gets mated.
    MateIn(i32),
}

impl Score {
    /// Projects the score onto a single signed centipawn axis.
    ///
    /// Mates saturate into the `±`[`MATE_CP`] band; centipawn magnitude
    /// is undefined at mate, so the band is only meaningful for
    /// ordering and loss arithmetic, never for the sigmoid converter.
    ///
    /// # Examples
    ///
    /// ```
    /// # use penance_engine::score::Score;
    /// assert_eq!(Score::Centipawns(-250).signed_cp(), -250);
    /// assert_eq!(Score::MateIn(2).signed_cp(), 9_980);
    /// assert_eq!(Score::MateIn(-2).signed_cp(), -9_980);
    /// ```
    #[must_use]
    pub fn signed_cp(self) -> i32 {
        match self {
            Score::Centipawns(cp) => cp,
            Score::MateIn(n) if n > 0 => MATE_CP - n * 10,
            Score::MateIn(n) => -MATE_CP - n * 10,
        }
    }

    /// The same evaluation seen from the other side of the board.
    ///
    /// `MateIn(0)` (the side to move is already mated) has no signed
    /// mirror image, so it flips to the saturated centipawn win for
    /// the other side.
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::MateIn(0) => Score::Centipawns(MATE_CP),
            Score::MateIn(n) => Score::MateIn(-n),
        }
    }
}

/// Conventional chess notation: `+2.50`, `-0.30`, `#3`, `-#2`.
impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Score::Centipawns(cp) => {
                let sign = if cp >= 0 { "+" } else { "-" };
                write!(f, "{sign}{:.2}", f64::from(cp.abs()) / 100.0)
            }
            Score::MateIn(n) if n > 0 => write!(f, "#{n}"),
            Score::MateIn(n) => write!(f, "-#{}", n.abs()),
        }
    }
}

/// Result of one engine call: the position's score and the engine's
/// preferred move (UCI coordinate notation, e.g. `e2e4`).
///
/// `best_move` is `None` only for terminal positions where the engine
/// has no move to suggest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineEval {
    pub score: Score,
    pub best_move: Option<String>,
    /// Principal variation from the search, best move first. May be
    /// empty; consumers treat it as advisory (used for punishment
    /// lines in reports).
    #[serde(default)]
    pub pv: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearer_mate_compares_higher() {
        assert!(Score::MateIn(1).signed_cp() > Score::MateIn(5).signed_cp());
        assert!(Score::MateIn(-5).signed_cp() > Score::MateIn(-1).signed_cp());
        assert!(Score::MateIn(5).signed_cp() > Score::Centipawns(9_000).signed_cp());
    }

    #[test]
    fn flip_is_involutive() {
        for score in [Score::Centipawns(123), Score::MateIn(3), Score::MateIn(-4)] {
            assert_eq!(score.flipped().flipped(), score);
        }
    }

    #[test]
    fn mate_zero_counts_against_the_side_to_move() {
        assert_eq!(Score::MateIn(0).signed_cp(), -MATE_CP);
        // ... and flips to a delivered mate for the other side.
        assert_eq!(Score::MateIn(0).flipped(), Score::Centipawns(MATE_CP));
    }

    #[test]
    fn display_formatting() {
        assert_eq!(Score::Centipawns(250).to_string(), "+2.50");
        assert_eq!(Score::Centipawns(-30).to_string(), "-0.30");
        assert_eq!(Score::MateIn(3).to_string(), "#3");
        assert_eq!(Score::MateIn(-2).to_string(), "-#2");
    }

    #[test]
    fn serde_round_trip() {
        let eval = EngineEval {
            score: Score::MateIn(-2),
            best_move: Some("e2e4".to_string()),
            pv: vec!["e2e4".to_string(), "e7e5".to_string()],
        };
        let json = serde_json::to_string(&eval).unwrap();
        assert_eq!(serde_json::from_str::<EngineEval>(&json).unwrap(), eval);
    }
}
