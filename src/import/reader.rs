//! CSV record reading

use crate::config::ImportSettings;
use crate::import::report::RowFailure;
use serde::{Deserialize, Serialize};
use std::io::Read;
use tracing::warn;

/// How an upload is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Skip the first line
    pub has_headers: bool,
    /// Stop at the first invalid row
    pub stop_on_error: bool,
    /// Field delimiter byte
    pub delimiter: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            has_headers: true,
            stop_on_error: false,
            delimiter: b',',
        }
    }
}

impl From<&ImportSettings> for ImportOptions {
    fn from(settings: &ImportSettings) -> Self {
        let delimiter = if settings.delimiter.is_ascii() {
            settings.delimiter as u8
        } else {
            b','
        };
        Self {
            has_headers: settings.has_headers,
            stop_on_error: settings.stop_on_error,
            delimiter,
        }
    }
}

/// One raw CSV record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    /// 1-based line number in the upload
    pub line: u64,
    pub fields: Vec<String>,
}

/// Read every record of an upload
///
/// Records with the wrong number of fields are returned as-is and rejected
/// later by row validation, so the failure names the row. Records the csv
/// reader itself cannot decode come back as failures.
pub fn read_records<R: Read>(reader: R, options: &ImportOptions) -> Vec<Result<CsvRecord, RowFailure>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(options.has_headers)
        .flexible(true)
        .trim(csv::Trim::All)
        .delimiter(options.delimiter)
        .from_reader(reader);

    let first_data_line: u64 = if options.has_headers { 2 } else { 1 };
    let mut records = Vec::new();

    for (index, result) in reader.records().enumerate() {
        let fallback_line = first_data_line + index as u64;
        match result {
            Ok(record) => {
                let line = record
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                records.push(Ok(CsvRecord {
                    line,
                    fields: record.iter().map(|field| field.to_string()).collect(),
                }));
            }
            Err(e) => {
                let line = e
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                warn!("Unreadable CSV record at line {}: {}", line, e);
                let is_io = e.is_io_error();
                records.push(Err(RowFailure::new(line, "csv", e.to_string())));
                if is_io {
                    break;
                }
            }
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_is_skipped() {
        let data = "Team_1 name,Team_1 score,Team_2 name,Team_2 score\nFirst Team,3,Second Team,3\n";
        let records = read_records(data.as_bytes(), &ImportOptions::default());
        assert_eq!(records.len(), 1);
        let record = records[0].as_ref().unwrap();
        assert_eq!(record.line, 2);
        assert_eq!(record.fields, vec!["First Team", "3", "Second Team", "3"]);
    }

    #[test]
    fn test_without_header() {
        let options = ImportOptions {
            has_headers: false,
            ..ImportOptions::default()
        };
        let records = read_records("A,1,B,0\nC,2,D,2\n".as_bytes(), &options);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].as_ref().unwrap().line, 2);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let data = "h1,h2,h3,h4\nA,1,B\nC , 2 , D , 0\n";
        let records = read_records(data.as_bytes(), &ImportOptions::default());
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].as_ref().unwrap().fields.len(), 3);
        assert_eq!(
            records[1].as_ref().unwrap().fields,
            vec!["C", "2", "D", "0"]
        );
        assert_eq!(records[1].as_ref().unwrap().line, 3);
    }

    #[test]
    fn test_custom_delimiter() {
        let options = ImportOptions {
            has_headers: false,
            stop_on_error: false,
            delimiter: b';',
        };
        let records = read_records("A;1;B;0\n".as_bytes(), &options);
        assert_eq!(records[0].as_ref().unwrap().fields, vec!["A", "1", "B", "0"]);
    }

    #[test]
    fn test_invalid_utf8_is_a_row_failure() {
        let mut data = b"h1,h2,h3,h4\n".to_vec();
        data.extend_from_slice(b"A,1,\xff\xfe,0\n");
        data.extend_from_slice(b"C,2,D,0\n");
        let records = read_records(data.as_slice(), &ImportOptions::default());
        assert_eq!(records.len(), 2);
        assert!(records[0].is_err());
        assert!(records[1].is_ok());
    }

    #[test]
    fn test_options_from_settings() {
        let settings = ImportSettings {
            has_headers: false,
            stop_on_error: true,
            delimiter: '\t',
        };
        let options = ImportOptions::from(&settings);
        assert!(!options.has_headers);
        assert!(options.stop_on_error);
        assert_eq!(options.delimiter, b'\t');
    }
}
