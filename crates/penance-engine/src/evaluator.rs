//! The evaluator capability the analysis core depends on.
//!
//! Engine processes are external, stateful and slow-starting, so the
//! core never constructs one itself. It receives boxed
//! [`PositionEvaluator`] instances from the caller, which makes the
//! whole pipeline testable against deterministic stubs.

use std::time::Duration;

use crate::score::EngineEval;

/// Errors from a single evaluator call.
///
/// The adapter never retries internally; retry and abort policy belongs
/// to the caller. [`Unavailable`](EngineError::Unavailable) means no
/// position can be trusted and the whole analysis pass must abort,
/// while [`Timeout`](EngineError::Timeout) only invalidates the one
/// call that exceeded its deadline.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display("engine unavailable: {reason}")]
    Unavailable {
        #[error(not(source))]
        reason: String,
    },
    #[display("engine call exceeded its {}ms deadline", timeout.as_millis())]
    Timeout {
        #[error(not(source))]
        timeout: Duration,
    },
}

impl EngineError {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        EngineError::Unavailable {
            reason: reason.into(),
        }
    }
}

/// Synchronous "evaluate this position" capability.
///
/// `evaluate` blocks until the engine reports a result or the
/// caller-supplied deadline expires. Implementations hold exclusive
/// engine state (`&mut self`); concurrency is achieved by running one
/// evaluator instance per worker, not by sharing one.
pub trait PositionEvaluator: Send {
    /// Evaluates the position given as a FEN string at the requested
    /// search depth.
    fn evaluate(
        &mut self,
        fen: &str,
        depth: u32,
        timeout: Duration,
    ) -> Result<EngineEval, EngineError>;
}
