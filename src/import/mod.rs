//! Bulk game import from CSV uploads
//!
//! Each data row is `first team, first score, second team, second score`.
//! Rows are read and validated here; the league manager turns valid rows
//! into games one at a time.

pub mod reader;
pub mod report;
pub mod row;

pub use reader::{read_records, CsvRecord, ImportOptions};
pub use report::{ImportReport, RowFailure};
pub use row::{parse_score, GameRow, FIELD_COUNT};
