//! Severity classification: an ordered first-match rule cascade.
//!
//! The rules are an explicit list of predicate/label pairs evaluated
//! top-down rather than nested conditionals, so each rule can be
//! enumerated and exercised on its own.
//!
//! # Cascade
//!
//! 1. **Blunder**: regret at or above the blunder bound, raw
//!    centipawn loss above the blunder bound, a reversal from clearly
//!    winning to clearly losing, or the tactical punishment flag.
//! 2. **Mistake**: middlegame only, regret inside the mistake band.
//! 3. **Inaccuracy**: regret inside the inaccuracy band.
//! 4. **Good**, refined to **Best** when the played move is the
//!    engine's own choice.
//!
//! While the phase is the opening, the regret and centipawn bounds are
//! scaled up by the leniency factor before comparison. The reversal
//! and tactical triggers are exempt: hanging material is penalized at
//! any phase.
//!
//! Regret in the mistake band outside the middlegame deliberately
//! falls through to rule 3's range test (and therefore classifies
//! Good); a policy choice, not an oversight.

use penance_engine::Score;
use serde::{Deserialize, Serialize};

use crate::{config::AnalysisConfig, phase::GamePhase, win_prob::win_probability};

/// Severity label for one move.
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
pub enum MoveLabel {
    #[display("best")]
    Best,
    #[display("good")]
    Good,
    #[display("inaccuracy")]
    Inaccuracy,
    #[display("mistake")]
    Mistake,
    #[display("blunder")]
    Blunder,
}

/// Everything the cascade consults about one move. A pure data bag:
/// classification is a total function of this input and the config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationInput {
    pub regret: f64,
    /// Raw centipawn loss, mover's perspective, mates saturated.
    pub cp_loss: i32,
    pub win_prob_before: f64,
    pub win_prob_after: f64,
    pub phase: GamePhase,
    pub tactically_punished: bool,
    pub played_is_best: bool,
}

/// One entry of the cascade.
pub struct ClassificationRule {
    pub name: &'static str,
    pub label: MoveLabel,
    pub applies: fn(&ClassificationInput, &AnalysisConfig) -> bool,
}

/// The cascade, in evaluation order.
pub const RULES: [ClassificationRule; 3] = [
    ClassificationRule {
        name: "blunder",
        label: MoveLabel::Blunder,
        applies: is_blunder,
    },
    ClassificationRule {
        name: "mistake",
        label: MoveLabel::Mistake,
        applies: is_mistake,
    },
    ClassificationRule {
        name: "inaccuracy",
        label: MoveLabel::Inaccuracy,
        applies: is_inaccuracy,
    },
];

/// First matching rule wins; no match falls through to Good/Best.
#[must_use]
pub fn classify(input: &ClassificationInput, config: &AnalysisConfig) -> MoveLabel {
    for rule in &RULES {
        if (rule.applies)(input, config) {
            return rule.label;
        }
    }
    if input.played_is_best {
        MoveLabel::Best
    } else {
        MoveLabel::Good
    }
}

/// Opening leniency: > 1 in the opening, neutral elsewhere.
fn leniency(phase: GamePhase, config: &AnalysisConfig) -> f64 {
    if phase.is_opening() {
        config.opening_leniency
    } else {
        1.0
    }
}

fn is_blunder(input: &ClassificationInput, config: &AnalysisConfig) -> bool {
    let scale = leniency(input.phase, config);

    let massive_regret = input.regret >= config.blunder_regret * scale;
    let eval_collapse = f64::from(input.cp_loss) > f64::from(config.blunder_cp_loss) * scale;

    // Reversal and tactical triggers are never scaled by leniency.
    let winning_mark = win_probability(
        Score::Centipawns(config.reversal_winning_cp),
        config.win_prob_calibration,
    );
    let losing_mark = win_probability(
        Score::Centipawns(config.reversal_losing_cp),
        config.win_prob_calibration,
    );
    let reversal = input.win_prob_before >= winning_mark && input.win_prob_after <= losing_mark;

    massive_regret || eval_collapse || reversal || input.tactically_punished
}

fn is_mistake(input: &ClassificationInput, config: &AnalysisConfig) -> bool {
    let scale = leniency(input.phase, config);
    input.phase.is_middlegame()
        && input.regret >= config.mistake_regret * scale
        && input.regret < config.blunder_regret * scale
}

fn is_inaccuracy(input: &ClassificationInput, config: &AnalysisConfig) -> bool {
    let scale = leniency(input.phase, config);
    input.regret >= config.inaccuracy_regret * scale
        && input.regret < config.mistake_regret * scale
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: f64 = 0.003;

    fn quiet(phase: GamePhase) -> ClassificationInput {
        ClassificationInput {
            regret: 0.0,
            cp_loss: 0,
            win_prob_before: 0.5,
            win_prob_after: 0.5,
            phase,
            tactically_punished: false,
            played_is_best: false,
        }
    }

    fn wp(cp: i32) -> f64 {
        win_probability(Score::Centipawns(cp), C)
    }

    #[test]
    fn each_blunder_disjunct_fires_on_its_own() {
        let config = AnalysisConfig::default();

        // Massive regret alone.
        let massive = ClassificationInput {
            regret: 0.20,
            ..quiet(GamePhase::Middlegame)
        };
        assert_eq!(classify(&massive, &config), MoveLabel::Blunder);

        // Centipawn collapse alone (regret kept tiny).
        let collapse = ClassificationInput {
            cp_loss: 401,
            regret: 0.01,
            ..quiet(GamePhase::Endgame)
        };
        assert_eq!(classify(&collapse, &config), MoveLabel::Blunder);

        // Reversal alone: in the opening the scaled regret bound is
        // 0.40, so a 0.25 regret reversal isolates the trigger.
        let reversal = ClassificationInput {
            regret: 0.25,
            win_prob_before: wp(250),
            win_prob_after: wp(-150),
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&reversal, &config), MoveLabel::Blunder);

        // Tactical flag alone.
        let tactical = ClassificationInput {
            tactically_punished: true,
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&tactical, &config), MoveLabel::Blunder);
    }

    #[test]
    fn no_disjunct_means_no_blunder() {
        let config = AnalysisConfig::default();
        let input = ClassificationInput {
            regret: 0.19,
            cp_loss: 400, // at the bound, not above it
            win_prob_before: wp(250),
            win_prob_after: wp(-99), // not clearly losing
            ..quiet(GamePhase::Middlegame)
        };
        assert_ne!(classify(&input, &config), MoveLabel::Blunder);
    }

    #[test]
    fn reversal_from_winning_to_losing_at_the_cp_loss_boundary() {
        // +250 to -150 at ply 20: raw loss is exactly 400 (not above
        // the bound), but the reversal trigger classifies it a blunder.
        let config = AnalysisConfig::default();
        let input = ClassificationInput {
            regret: regret_between(250, -150),
            cp_loss: 400,
            win_prob_before: wp(250),
            win_prob_after: wp(-150),
            ..quiet(GamePhase::Middlegame)
        };
        assert_eq!(classify(&input, &config), MoveLabel::Blunder);
    }

    fn regret_between(before_cp: i32, after_cp: i32) -> f64 {
        wp(before_cp) - wp(after_cp)
    }

    #[test]
    fn mistake_band_applies_in_the_middlegame_only() {
        let config = AnalysisConfig::default();

        let middlegame = ClassificationInput {
            regret: 0.09,
            ..quiet(GamePhase::Middlegame)
        };
        assert_eq!(classify(&middlegame, &config), MoveLabel::Mistake);

        // Same regret in the endgame falls through rule 2, misses rule
        // 3's range, and lands on Good. Deliberate policy.
        let endgame = ClassificationInput {
            regret: 0.09,
            ..quiet(GamePhase::Endgame)
        };
        assert_eq!(classify(&endgame, &config), MoveLabel::Good);
    }

    #[test]
    fn opening_leniency_rescales_the_regret_bands() {
        let config = AnalysisConfig::default();

        // Regret 0.09 at ply 10: the scaled mistake bound is 0.16 and
        // the scaled inaccuracy band is [0.04, 0.16), so this is an
        // inaccuracy, not a mistake.
        let opening = ClassificationInput {
            regret: 0.09,
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&opening, &config), MoveLabel::Inaccuracy);

        // Below the scaled inaccuracy floor: plain opening imprecision.
        let slight = ClassificationInput {
            regret: 0.03,
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&slight, &config), MoveLabel::Good);
    }

    #[test]
    fn leniency_never_suppresses_tactical_or_reversal_triggers() {
        let config = AnalysisConfig::default();

        let hung_piece = ClassificationInput {
            regret: 0.05,
            tactically_punished: true,
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&hung_piece, &config), MoveLabel::Blunder);

        let reversal = ClassificationInput {
            regret: 0.23, // under the scaled 0.40 regret bound
            win_prob_before: wp(220),
            win_prob_after: wp(-160),
            ..quiet(GamePhase::Opening)
        };
        assert_eq!(classify(&reversal, &config), MoveLabel::Blunder);
    }

    #[test]
    fn inaccuracy_band() {
        let config = AnalysisConfig::default();
        for (regret, expected) in [
            (0.019, MoveLabel::Good),
            (0.02, MoveLabel::Inaccuracy),
            (0.079, MoveLabel::Inaccuracy),
            (0.08, MoveLabel::Mistake),
        ] {
            let input = ClassificationInput {
                regret,
                ..quiet(GamePhase::Middlegame)
            };
            assert_eq!(classify(&input, &config), expected, "regret {regret}");
        }
    }

    #[test]
    fn best_refines_good() {
        let config = AnalysisConfig::default();
        let best = ClassificationInput {
            played_is_best: true,
            ..quiet(GamePhase::Middlegame)
        };
        assert_eq!(classify(&best, &config), MoveLabel::Best);
        assert_eq!(classify(&quiet(GamePhase::Middlegame), &config), MoveLabel::Good);
    }

    #[test]
    fn cascade_order_is_stable() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names, ["blunder", "mistake", "inaccuracy"]);
    }

    #[test]
    fn classification_is_deterministic() {
        let config = AnalysisConfig::default();
        let input = ClassificationInput {
            regret: 0.1234,
            cp_loss: 87,
            win_prob_before: 0.61,
            win_prob_after: 0.49,
            ..quiet(GamePhase::Middlegame)
        };
        let first = classify(&input, &config);
        for _ in 0..100 {
            assert_eq!(classify(&input, &config), first);
        }
    }
}
