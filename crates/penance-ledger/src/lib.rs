//! The pushup ledger: per-user accounting of earned and forgiven debt.
//!
//! [`PushupLedger`] is a pure value. Operations consume the ledger and
//! return the updated one; persistence and single-writer discipline
//! per user are the caller's duty.

pub use self::ledger::*;

pub mod ledger;
