//! Regret: the win-probability cost of the played move.
//!
//! Both probabilities are taken from the mover's perspective at the
//! same search depth, so a move can only lose or hold probability;
//! regret is clamped at zero. Playing the engine's best move is regret
//! zero by definition, decided by exact move identity rather than any
//! numeric tolerance.

/// Exact identity check between the played move and the engine's
/// preferred move at the position before it (UCI coordinate notation).
///
/// This is deliberately a string comparison: two evaluations of the
/// same position at the same depth name the same best move, and no
/// floating-point round-off may reclassify a best move as a loss.
#[must_use]
pub fn played_matches_best(played: &str, engine_best: Option<&str>) -> bool {
    engine_best.is_some_and(|best| best.eq_ignore_ascii_case(played.trim()))
}

/// Win-probability drop caused by the played move, `≥ 0` always and
/// exactly `0.0` when the played move is the engine's best.
///
/// # Examples
///
/// ```
/// # use penance_analysis::regret::regret;
/// assert!((regret(false, 0.68, 0.39) - 0.29).abs() < 1e-9);
/// assert_eq!(regret(true, 0.68, 0.39), 0.0);
/// // Evaluation noise in the mover's favor never yields negative regret.
/// assert_eq!(regret(false, 0.50, 0.53), 0.0);
/// ```
#[must_use]
pub fn regret(played_is_best: bool, win_prob_before: f64, win_prob_after: f64) -> f64 {
    if played_is_best {
        return 0.0;
    }
    (win_prob_before - win_prob_after).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_move_is_exact_zero() {
        // Even when the probabilities disagree, identity wins.
        assert_eq!(regret(true, 0.9, 0.1), 0.0);
    }

    #[test]
    fn never_negative() {
        assert_eq!(regret(false, 0.2, 0.8), 0.0);
    }

    #[test]
    fn identity_check_is_textual() {
        assert!(played_matches_best("e2e4", Some("e2e4")));
        assert!(played_matches_best("E2E4", Some("e2e4")));
        assert!(!played_matches_best("e2e4", Some("d2d4")));
        assert!(!played_matches_best("e2e4", None));
    }
}
