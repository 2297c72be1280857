//! Ledger value type and its two operations.
//!
//! # Invariants
//!
//! - `total_pushups` and `forgiven_pushups` only ever grow.
//! - Every operation keeps `forgiven_pushups <= total_pushups`. A
//!   hand-edited ledger file can still claim otherwise, so
//!   [`PushupLedger::pushups_due`] clamps at zero instead of trusting
//!   the loaded figures.
//! - A game id contributes at most once; a repeat [`apply`] is an
//!   error rather than a silent double-count.
//!
//! [`apply`]: PushupLedger::apply

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Errors from ledger operations.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LedgerError {
    /// The game's pushups are already in the ledger.
    #[display("game {game_id} has already been applied to this ledger")]
    AlreadyApplied {
        #[error(not(source))]
        game_id: String,
    },
}

/// One user's pushup account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushupLedger {
    pub user: String,
    /// Lifetime pushups earned across all applied games.
    pub total_pushups: u32,
    /// Lifetime pushups waived. Never exceeds `total_pushups`.
    pub forgiven_pushups: u32,
    /// Game ids whose pushups are already counted.
    pub applied_games: BTreeSet<String>,
}

impl PushupLedger {
    /// A fresh ledger with no debt.
    #[must_use]
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            total_pushups: 0,
            forgiven_pushups: 0,
            applied_games: BTreeSet::new(),
        }
    }

    /// Pushups still owed. Never negative, even when a loaded ledger
    /// claims more forgiven than earned.
    #[must_use]
    pub fn pushups_due(&self) -> u32 {
        self.total_pushups.saturating_sub(self.forgiven_pushups)
    }

    /// Adds one analyzed game's pushups to the ledger.
    ///
    /// Each game id is counted at most once; re-applying the same game
    /// (for example after a re-analysis) is rejected.
    pub fn apply(
        mut self,
        game_id: impl Into<String>,
        pushups_earned: u32,
    ) -> Result<Self, LedgerError> {
        let game_id = game_id.into();
        if !self.applied_games.insert(game_id.clone()) {
            return Err(LedgerError::AlreadyApplied { game_id });
        }
        self.total_pushups += pushups_earned;
        info!(
            user = %self.user,
            game_id,
            pushups_earned,
            due = self.pushups_due(),
            "applied game to ledger"
        );
        Ok(self)
    }

    /// Waives up to `amount` pushups.
    ///
    /// Forgiveness clamps at the outstanding debt: the ledger never
    /// goes negative and never turns into credit.
    #[must_use]
    pub fn forgive(mut self, amount: u32) -> Self {
        let waived = amount.min(self.pushups_due());
        self.forgiven_pushups += waived;
        info!(
            user = %self.user,
            requested = amount,
            waived,
            due = self.pushups_due(),
            "forgave pushups"
        );
        self
    }
}
