//! The per-game analysis pass.
//!
//! [`GameAnalyzer`] owns a pool of evaluator instances (engine capacity
//! is the limiting shared resource, so the pool bound *is* the worker
//! bound) plus the shared evaluation cache. Per-ply work is independent
//! of every other ply's computed result, so plies are fanned out across
//! the pool with `thread::scope`, one evaluator per worker.
//!
//! Failure policy per the error design: an unreachable engine aborts
//! the whole game; a timed-out call or malformed ingested position
//! skips only its ply and marks the result partial.

use std::{str::FromStr, sync::Arc, thread};

use chess::Board;
use penance_engine::{
    EngineError, EngineEval, EvalCache, EvalKey, Fingerprint, PositionEvaluator,
};
use tracing::{info, warn};

use crate::{
    classify::{ClassificationInput, classify},
    config::AnalysisConfig,
    move_eval::{
        GameAnalysisResult, GameRecord, MoveEvaluation, PlyOutcome, PlyRecord, Side, SkipReason,
        UnanalyzedPly,
    },
    phase::classify_phase,
    regret::{played_matches_best, regret},
    tactical::{TacticalPunishment, detect_punishment},
    win_prob::win_probability,
};

/// Errors that abort a whole analysis pass.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AnalysisError {
    #[display("analyzer needs at least one evaluator instance")]
    NoEvaluators,
    #[display("analysis aborted: {_0}")]
    EngineUnavailable(EngineError),
}

/// Analyzes whole games against a pool of engine instances.
pub struct GameAnalyzer {
    workers: Vec<Box<dyn PositionEvaluator>>,
    cache: Arc<EvalCache>,
    config: AnalysisConfig,
}

impl GameAnalyzer {
    /// Builds an analyzer over the given evaluator pool.
    ///
    /// The pool must not be empty. The cache may be shared with other
    /// analyzers (and outlive this one) to reuse evaluations across
    /// games.
    pub fn new(
        workers: Vec<Box<dyn PositionEvaluator>>,
        cache: Arc<EvalCache>,
        config: AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        if workers.is_empty() {
            return Err(AnalysisError::NoEvaluators);
        }
        Ok(Self {
            workers,
            cache,
            config,
        })
    }

    /// Runs the full pass over one game.
    ///
    /// Returns a complete [`GameAnalysisResult`], possibly marked
    /// partial; callers never observe an intermediate state. The
    /// output is deterministic and independent of the worker count.
    pub fn analyze(&mut self, game: &GameRecord) -> Result<GameAnalysisResult, AnalysisError> {
        info!(
            game_id = %game.game_id,
            plies = game.plies.len(),
            workers = self.workers.len(),
            depth = self.config.search_depth,
            "analyzing game"
        );

        let Self {
            workers,
            cache,
            config,
        } = self;
        let cache: &Arc<EvalCache> = cache;
        let config: &AnalysisConfig = config;

        let outcomes = if game.plies.is_empty() {
            Vec::new()
        } else {
            let chunk_size = game.plies.len().div_ceil(workers.len());
            let per_worker: Result<Vec<Vec<PlyOutcome>>, EngineError> = thread::scope(|s| {
                let handles: Vec<_> = workers
                    .iter_mut()
                    .zip(game.plies.chunks(chunk_size))
                    .map(|(worker, chunk)| {
                        let cache = Arc::clone(cache);
                        s.spawn(move || {
                            chunk
                                .iter()
                                .map(|ply| analyze_ply(worker.as_mut(), &cache, config, ply))
                                .collect::<Result<Vec<_>, _>>()
                        })
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("analysis worker panicked"))
                    .collect()
            });
            per_worker
                .map_err(AnalysisError::EngineUnavailable)?
                .into_iter()
                .flatten()
                .collect()
        };

        cache.log_stats();
        let result = GameAnalysisResult::from_outcomes(game.game_id.clone(), outcomes, config);
        info!(
            game_id = %result.game_id,
            blunders = result.counts.blunder,
            mistakes = result.counts.mistake,
            inaccuracies = result.counts.inaccuracy,
            pushups = result.pushups_earned,
            partial = result.partial,
            "analysis complete"
        );
        Ok(result)
    }
}

fn skipped(ply: &PlyRecord, reason: SkipReason) -> PlyOutcome {
    warn!(ply = ply.ply, %reason, "ply excluded from classification");
    PlyOutcome::Skipped(UnanalyzedPly {
        ply: ply.ply,
        reason,
    })
}

/// Processes one ply end to end: evaluate, convert, contextualize,
/// classify. Only `EngineUnavailable` escapes as `Err`; every other
/// failure is folded into a skipped outcome.
fn analyze_ply(
    worker: &mut dyn PositionEvaluator,
    cache: &EvalCache,
    config: &AnalysisConfig,
    ply: &PlyRecord,
) -> Result<PlyOutcome, EngineError> {
    let Ok(board_before) = Board::from_str(&ply.fen_before) else {
        return Ok(skipped(ply, SkipReason::MalformedInput));
    };
    let Ok(board_after) = Board::from_str(&ply.fen_after) else {
        return Ok(skipped(ply, SkipReason::MalformedInput));
    };
    if Side::from(board_before.side_to_move()) != ply.side {
        return Ok(skipped(ply, SkipReason::MalformedInput));
    }

    let fingerprint_before = Fingerprint::from_board(&board_before);
    let fingerprint_after = Fingerprint::from_board(&board_after);

    let before = match evaluate_cached(
        worker,
        cache,
        &board_before,
        fingerprint_before.clone(),
        config.search_depth,
        config,
    ) {
        Ok(eval) => eval,
        Err(EngineError::Timeout { .. }) => return Ok(skipped(ply, SkipReason::EngineTimeout)),
        Err(err) => return Err(err),
    };
    let after = match evaluate_cached(
        worker,
        cache,
        &board_after,
        fingerprint_after.clone(),
        config.search_depth,
        config,
    ) {
        Ok(eval) => eval,
        Err(EngineError::Timeout { .. }) => return Ok(skipped(ply, SkipReason::EngineTimeout)),
        Err(err) => return Err(err),
    };

    let played_is_best = played_matches_best(&ply.played_move, before.best_move.as_deref());

    // Before the move the mover is the side to move; after it the
    // engine reports for the opponent, so flip back.
    let eval_before = before.score;
    let eval_after = after.score.flipped();

    let win_prob_before = win_probability(eval_before, config.win_prob_calibration);
    let win_prob_after = win_probability(eval_after, config.win_prob_calibration);
    let regret_value = regret(played_is_best, win_prob_before, win_prob_after);
    let phase = classify_phase(&board_before, ply.ply, config);

    // The engine's own best move is not punishable; skipping the
    // lookahead also saves an engine call per best move.
    let tactical = if played_is_best {
        TacticalPunishment::default()
    } else {
        let shallow = match evaluate_cached(
            worker,
            cache,
            &board_after,
            fingerprint_after.clone(),
            config.tactical_lookahead_plies,
            config,
        ) {
            Ok(eval) => eval,
            Err(EngineError::Timeout { .. }) => {
                return Ok(skipped(ply, SkipReason::EngineTimeout));
            }
            Err(err) => return Err(err),
        };
        detect_punishment(&shallow, eval_before.signed_cp(), config)
    };

    let cp_loss = eval_before.signed_cp().saturating_sub(eval_after.signed_cp());
    let input = ClassificationInput {
        regret: regret_value,
        cp_loss,
        win_prob_before,
        win_prob_after,
        phase,
        tactically_punished: tactical.punished,
        played_is_best,
    };
    let label = classify(&input, config);

    Ok(PlyOutcome::Evaluated(Box::new(MoveEvaluation {
        ply: ply.ply,
        side: ply.side,
        position_before: fingerprint_before,
        position_after: fingerprint_after,
        played_move: ply.played_move.clone(),
        best_move: before.best_move,
        eval_before,
        eval_after,
        win_prob_before,
        win_prob_after,
        regret: regret_value,
        phase,
        tactical,
        label,
    })))
}

fn evaluate_cached(
    worker: &mut dyn PositionEvaluator,
    cache: &EvalCache,
    board: &Board,
    position: Fingerprint,
    depth: u32,
    config: &AnalysisConfig,
) -> Result<EngineEval, EngineError> {
    let key = EvalKey { position, depth };
    if let Some(hit) = cache.lookup(&key) {
        return Ok(hit);
    }
    let eval = worker.evaluate(&board.to_string(), depth, config.engine_timeout())?;
    cache.store(key, eval.clone());
    Ok(eval)
}
