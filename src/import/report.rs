//! Import outcome reporting

use crate::types::GameId;
use serde::{Deserialize, Serialize};

/// A row that could not be imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    /// 1-based line number in the upload
    pub line: u64,
    /// Error kind, as reported by `LeagueError::kind`
    pub kind: String,
    pub message: String,
}

impl RowFailure {
    pub fn new(line: u64, kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Summary of one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Number of games created
    pub imported: usize,
    /// Ids of the created games, in file order
    pub game_ids: Vec<GameId>,
    pub failures: Vec<RowFailure>,
    /// Whether processing stopped before the end of the file
    pub aborted: bool,
    /// Rows left unprocessed after an abort
    pub skipped: usize,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Every row imported and nothing was skipped
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.aborted
    }

    pub(crate) fn record_success(&mut self, game_id: GameId) {
        self.imported += 1;
        self.game_ids.push(game_id);
    }

    pub(crate) fn record_failure(&mut self, failure: RowFailure) {
        self.failures.push(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::generate_game_id;

    #[test]
    fn test_report_counts() {
        let mut report = ImportReport::default();
        assert!(report.is_clean());

        report.record_success(generate_game_id());
        report.record_failure(RowFailure::new(3, "validation", "Invalid row"));
        assert_eq!(report.imported, 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ImportReport::default();
        report.record_failure(RowFailure::new(2, "validation", "bad score"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["imported"], 0);
        assert_eq!(json["failures"][0]["line"], 2);
        assert_eq!(json["failures"][0]["kind"], "validation");
        assert_eq!(json["aborted"], false);
        assert_eq!(json["skipped"], 0);
    }
}
