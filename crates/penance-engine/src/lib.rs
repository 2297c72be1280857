//! External chess engine boundary: evaluation types, the evaluator
//! capability trait, a UCI child-process adapter, and the shared
//! evaluation cache.
//!
//! The analysis core never talks to an engine process directly. It
//! depends on the [`PositionEvaluator`] trait, which is implemented by
//! [`UciEngine`] in production and by deterministic stubs in tests.

pub use self::{cache::*, evaluator::*, position::*, score::*, uci::*};

pub mod cache;
pub mod evaluator;
pub mod position;
pub mod score;
pub mod uci;
