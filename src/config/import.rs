//! CSV import configuration

use serde::{Deserialize, Serialize};

/// Bulk import settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Skip the first line of every upload
    pub has_headers: bool,
    /// Stop at the first invalid row instead of reporting it and moving on
    pub stop_on_error: bool,
    /// Field delimiter
    pub delimiter: char,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            has_headers: true,
            stop_on_error: false,
            delimiter: ',',
        }
    }
}
