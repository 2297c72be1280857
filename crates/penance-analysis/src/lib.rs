//! Move evaluation and blunder classification for finished chess games.
//!
//! This crate turns raw positional evaluations from an external engine
//! into a human-centric severity judgment per move, and aggregates the
//! judgment into a pushup debt figure.
//!
//! # Pipeline
//!
//! Each ply of an ingested game runs through the same stages:
//!
//! 1. **Evaluate** ([`pipeline::GameAnalyzer`]): positions before and
//!    after the move are scored by the injected engine capability,
//!    memoized through the shared evaluation cache
//! 2. **Convert** ([`win_prob`]): raw centipawn/mate scores become a
//!    normalized win probability in `[0, 1]`
//! 3. **Contextualize** ([`phase`], [`regret`], [`tactical`]): game
//!    phase, probability cost of the played move, and an independent
//!    "obvious tactical punishment" flag
//! 4. **Classify** ([`classify`]): an ordered first-match rule cascade
//!    assigns best/good/inaccuracy/mistake/blunder
//!
//! Per-ply work is independent, so the analyzer fans plies out over a
//! bounded worker pool, one engine instance per worker.
//!
//! # Determinism
//!
//! Every stage after the engine call is a pure function of its inputs;
//! re-running analysis on the same move sequence with the same engine
//! output yields bit-identical classifications regardless of worker
//! count or cache state.
//!
//! # Partial results
//!
//! A single timed-out engine call or a malformed ingested position
//! fails only its own ply: the ply is excluded from counts and listed
//! in [`move_eval::GameAnalysisResult::unanalyzed`], with the result
//! marked partial. An unreachable engine aborts the whole pass instead,
//! since no position can be trusted.

pub mod classify;
pub mod config;
pub mod move_eval;
pub mod phase;
pub mod pipeline;
pub mod regret;
pub mod tactical;
pub mod win_prob;
