//! Win-probability conversion.
//!
//! Raw engine evaluations live on an unbounded scale (centipawns, or
//! forced-mate distances where centipawn magnitude is undefined).
//! Classification needs a bounded, comparable space, so scores are
//! squashed through a logistic curve into `[0, 1]`, the Lichess
//! win-probability model with a tunable calibration constant.

use penance_engine::Score;

/// Win probability of the side the score is expressed for.
///
/// `1 / (1 + e^(-c * cp))` for centipawn scores. Forced mates bypass
/// the formula and saturate: probability 1.0 when the side mates, 0.0
/// when it gets mated. Output is always clamped to `[0, 1]`.
///
/// # Examples
///
/// ```
/// # use penance_analysis::win_prob::win_probability;
/// # use penance_engine::Score;
/// let even = win_probability(Score::Centipawns(0), 0.003);
/// assert!((even - 0.5).abs() < 1e-9);
/// assert_eq!(win_probability(Score::MateIn(4), 0.003), 1.0);
/// assert_eq!(win_probability(Score::MateIn(-4), 0.003), 0.0);
/// ```
#[must_use]
pub fn win_probability(score: Score, calibration: f64) -> f64 {
    match score {
        Score::MateIn(n) if n > 0 => 1.0,
        Score::MateIn(_) => 0.0,
        Score::Centipawns(cp) => {
            let p = 1.0 / (1.0 + (-calibration * f64::from(cp)).exp());
            p.clamp(0.0, 1.0)
        }
    }
}
