//! Canonical position identity for cache keys.

use std::str::FromStr;

use chess::Board;
use serde::{Deserialize, Serialize};

/// Canonical fingerprint of a chess position.
///
/// Covers piece placement, side to move, castling rights and the
/// en-passant square (the first four FEN fields). Move counters are
/// deliberately excluded so the same position reached by different move
/// orders always produces the same fingerprint.
///
/// # Examples
///
/// ```
/// # use std::str::FromStr;
/// # use penance_engine::position::Fingerprint;
/// let a = Fingerprint::from_str(
///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
/// )
/// .unwrap();
/// let b = Fingerprint::from_str(
///     "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 5 40",
/// )
/// .unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint of an already-validated board.
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        Self(truncate_to_identity_fields(&board.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Parses and validates a FEN string, then canonicalizes it through the
/// board representation so cosmetic FEN differences cannot split cache
/// entries.
impl FromStr for Fingerprint {
    type Err = chess::Error;

    fn from_str(fen: &str) -> Result<Self, Self::Err> {
        let board = Board::from_str(fen)?;
        Ok(Self::from_board(&board))
    }
}

fn truncate_to_identity_fields(fen: &str) -> String {
    fen.split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}
