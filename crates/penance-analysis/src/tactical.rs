//! Tactical punishment detection.
//!
//! A single-depth regret figure can understate shallow tactics: deep
//! positional compensation masks a hanging piece or a short mate. This
//! detector looks at the position after the move through a shallow
//! fixed lookahead and flags "obvious" punishment independently of the
//! aggregate regret. Once set, the flag is never downgraded by any
//! other rule.

use arrayvec::ArrayVec;
use penance_engine::{EngineEval, Score};
use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;

/// Upper bound on the reported punishment line, in plies.
pub const PUNISHMENT_LINE_MAX: usize = 4;

/// Outcome of the shallow lookahead from the position after the move.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TacticalPunishment {
    /// Whether the move is considered tactically punished.
    pub punished: bool,
    /// Forced mate distance for the opponent, when that is the trigger.
    pub mate_in: Option<u32>,
    /// Centipawn swing versus the position before the move, when it
    /// exceeded the configured threshold.
    pub swing_cp: Option<i32>,
    /// Opponent's punishment sequence (UCI moves), for reporting.
    pub line: ArrayVec<String, PUNISHMENT_LINE_MAX>,
}

/// Inspects the opponent's best continuation after the move.
///
/// `shallow_after` is the engine's evaluation of the position after
/// the move at the tactical lookahead depth, expressed for the side to
/// move there (the opponent). `eval_before_cp` is the mover's
/// projected centipawn evaluation before the move at the main depth.
#[must_use]
pub fn detect_punishment(
    shallow_after: &EngineEval,
    eval_before_cp: i32,
    config: &AnalysisConfig,
) -> TacticalPunishment {
    let mover_score = shallow_after.score.flipped();

    let mate_in = match shallow_after.score {
        Score::MateIn(n) if n > 0 => Some(n.unsigned_abs()),
        _ => None,
    };

    let swing = eval_before_cp.saturating_sub(mover_score.signed_cp());
    let swing_cp = (mate_in.is_none() && swing > config.tactical_swing_cp).then_some(swing);

    let punished = mate_in.is_some() || swing_cp.is_some();
    let line = if punished {
        shallow_after
            .pv
            .iter()
            .take(PUNISHMENT_LINE_MAX)
            .cloned()
            .collect()
    } else {
        ArrayVec::new()
    };

    TacticalPunishment {
        punished,
        mate_in,
        swing_cp,
        line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shallow(score: Score, pv: &[&str]) -> EngineEval {
        EngineEval {
            score,
            best_move: pv.first().map(|m| (*m).to_string()),
            pv: pv.iter().map(|m| (*m).to_string()).collect(),
        }
    }

    #[test]
    fn forced_mate_for_the_opponent_is_punished() {
        let config = AnalysisConfig::default();
        let eval = shallow(Score::MateIn(2), &["d8h4", "g2g3", "h4g3"]);
        // Winning by +300 beforehand does not save the move.
        let punishment = detect_punishment(&eval, 300, &config);
        assert!(punishment.punished);
        assert_eq!(punishment.mate_in, Some(2));
        assert_eq!(punishment.line.as_slice(), ["d8h4", "g2g3", "h4g3"]);
    }

    #[test]
    fn large_swing_is_punished() {
        let config = AnalysisConfig::default();
        // Opponent stands +350 after the move; mover was +100 before.
        let eval = shallow(Score::Centipawns(350), &["f3e5"]);
        let punishment = detect_punishment(&eval, 100, &config);
        assert!(punishment.punished);
        assert_eq!(punishment.swing_cp, Some(450));
        assert_eq!(punishment.mate_in, None);
    }

    #[test]
    fn swing_at_the_threshold_is_not_punished() {
        let config = AnalysisConfig::default();
        let eval = shallow(Score::Centipawns(300), &["f3e5"]);
        // Swing is exactly 400: threshold must be exceeded, not met.
        let punishment = detect_punishment(&eval, -100, &config);
        assert!(!punishment.punished);
        assert!(punishment.line.is_empty());
    }

    #[test]
    fn quiet_continuation_is_not_punished() {
        let config = AnalysisConfig::default();
        let eval = shallow(Score::Centipawns(-20), &["g8f6"]);
        let punishment = detect_punishment(&eval, 15, &config);
        assert_eq!(punishment, TacticalPunishment::default());
    }

    #[test]
    fn mate_for_the_mover_is_not_punishment() {
        let config = AnalysisConfig::default();
        // Opponent is getting mated: score from their side is mate-against.
        let eval = shallow(Score::MateIn(-3), &["g8h8"]);
        let punishment = detect_punishment(&eval, 500, &config);
        assert!(!punishment.punished);
    }
}
