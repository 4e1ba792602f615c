//! Job model observed by callers across a run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::language::Language;
use crate::status::QlJobStatus;

/// One logical request to run the engine once.
///
/// The caller owns the model for the whole run. The launcher mutates
/// `active`, `status`, `result` and `logs` and leaves the rest untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QlJob {
    /// Display name.
    pub name: String,
    /// Algorithm type name inside the engine, and the stem of the result
    /// and log artifact filenames the engine writes.
    pub algorithm_name: String,
    /// Path of the compiled algorithm library or script.
    pub algorithm_location: String,
    pub algorithm_language: Language,
    /// Selected account name: `Backtest`, `Paper` or a brokerage account.
    pub account: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_capital: f64,
    pub market: Option<String>,
    pub security: String,
    pub resolution: String,
    /// Symbol ids traded by the algorithm.
    pub symbols: Vec<String>,
    /// Free-form algorithm parameters forwarded to the engine.
    pub parameters: BTreeMap<String, String>,
    /// True only while the engine process is running.
    pub active: bool,
    pub status: QlJobStatus,
    /// Raw result artifact, when the engine produced one.
    pub result: Option<String>,
    /// Raw log artifact, when the engine produced one.
    pub logs: Option<String>,
}

impl QlJob {
    /// Backtest window, when both dates are set and ordered.
    pub fn period(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start <= end => Some((start, end)),
            _ => None,
        }
    }
}
