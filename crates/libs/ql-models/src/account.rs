//! Minimal account identity consumed by the launcher.

use serde::{Deserialize, Serialize};

/// Classification of a job's selected account name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Historical simulation against recorded data.
    Backtest,
    /// Live data with simulated order fills.
    Paper,
    /// A named brokerage account.
    Broker,
}

impl AccountKind {
    /// Classify an account name; anything that is not a built-in is `Broker`.
    pub fn from_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("backtest") {
            AccountKind::Backtest
        } else if name.eq_ignore_ascii_case("paper") {
            AccountKind::Paper
        } else {
            AccountKind::Broker
        }
    }
}

/// A selectable brokerage account.
///
/// Brokerage-specific credentials and connection details live in the adapter
/// layer that owns the account; the launcher only needs its identity to
/// validate that one was selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QlAccount {
    /// Account name as shown to the user.
    pub name: String,
    /// Provider the account belongs to.
    pub provider: String,
}
