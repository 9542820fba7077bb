//! Dataset parsing and column inventory
//!
//! Delimited files are read in full: the header row becomes the column
//! inventory and every data row is validated, but only the first
//! [`PREVIEW_ROWS`] are kept. Spreadsheet and JSON files are accepted
//! without reading their content and get a placeholder inventory.

use crate::error::{WizardError, WizardResult};
use crate::models::{DataPreview, DatasetFile, FileSource, MediaType, PreviewFidelity};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// Data rows kept for display
pub const PREVIEW_ROWS: usize = 5;

/// Stand-in columns for formats that are not parsed locally
pub const PLACEHOLDER_COLUMNS: usize = 5;

const PLACEHOLDER_HEADER: &str = "File loaded successfully";

/// Parse a selected file into a [`DatasetFile`]
pub fn parse_dataset(source: FileSource) -> WizardResult<DatasetFile> {
    let media_type = MediaType::resolve(source.declared_type.as_deref(), &source.filename)?;
    debug!(filename = %source.filename, media_type = %media_type, bytes = source.bytes.len(), "Parsing dataset");

    if media_type.is_delimited() {
        parse_delimited(source, media_type)
    } else {
        Ok(placeholder(source, media_type))
    }
}

/// Parse on the blocking pool so large files do not stall the runtime
pub async fn parse_dataset_blocking(source: FileSource) -> WizardResult<DatasetFile> {
    tokio::task::spawn_blocking(move || parse_dataset(source))
        .await
        .map_err(|e| WizardError::Internal(format!("dataset parser task failed: {}", e)))?
}

fn parse_delimited(source: FileSource, media_type: MediaType) -> WizardResult<DatasetFile> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(source.bytes.as_slice());

    let columns = read_columns(reader.headers().map_err(describe)?)?;

    let mut preview_rows = Vec::with_capacity(PREVIEW_ROWS);
    let mut row_count = 0usize;

    for record in reader.records() {
        // Empty lines never reach here; csv skips them
        let record = record.map_err(describe)?;
        if record.len() != columns.len() {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(WizardError::Parse(format!(
                "line {} has {} fields, expected {}",
                line,
                record.len(),
                columns.len()
            )));
        }

        if preview_rows.len() < PREVIEW_ROWS {
            preview_rows.push(record.iter().map(str::to_string).collect());
        }
        row_count += 1;
    }

    info!(
        filename = %source.filename,
        columns = columns.len(),
        rows = row_count,
        "Dataset parsed"
    );

    let preview = DataPreview {
        headers: columns.clone(),
        rows: preview_rows,
    };
    Ok(DatasetFile::new(
        source,
        media_type,
        columns,
        preview,
        PreviewFidelity::Full,
        Some(row_count),
    ))
}

/// Trimmed, unique, non-empty column names
fn read_columns(headers: &StringRecord) -> WizardResult<Vec<String>> {
    let blank = headers.len() <= 1 && headers.iter().all(|h| h.trim().is_empty());
    if headers.is_empty() || blank {
        return Err(WizardError::Parse("the file has no header row".to_string()));
    }

    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, raw) in headers.iter().enumerate() {
        let name = raw.trim_matches('\u{feff}').trim();
        if name.is_empty() {
            return Err(WizardError::Parse(format!(
                "column {} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(name.to_string()) {
            return Err(WizardError::Parse(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        columns.push(name.to_string());
    }
    Ok(columns)
}

fn describe(err: csv::Error) -> WizardError {
    let message = match err.kind() {
        csv::ErrorKind::Utf8 { pos, .. } => match pos {
            Some(pos) => format!("line {} is not valid UTF-8", pos.line()),
            None => "the file is not valid UTF-8".to_string(),
        },
        _ => err.to_string(),
    };
    WizardError::Parse(message)
}

fn placeholder(source: FileSource, media_type: MediaType) -> DatasetFile {
    info!(
        filename = %source.filename,
        media_type = %media_type,
        "Dataset accepted with placeholder columns"
    );
    let columns: Vec<String> = (1..=PLACEHOLDER_COLUMNS)
        .map(|n| format!("Column{}", n))
        .collect();
    let preview = DataPreview {
        headers: vec![PLACEHOLDER_HEADER.to_string()],
        rows: Vec::new(),
    };
    DatasetFile::new(
        source,
        media_type,
        columns,
        preview,
        PreviewFidelity::Placeholder,
        None,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv(content: &str) -> FileSource {
        FileSource::new("data.csv", Some("text/csv"), content.as_bytes().to_vec())
    }

    #[test]
    fn test_header_and_preview_limit() {
        let mut content = String::from("A,B,C\n");
        for i in 0..8 {
            content.push_str(&format!("{},{},{}\n", i, i * 2, i * 3));
        }
        let dataset = parse_dataset(csv(&content)).unwrap();
        assert_eq!(dataset.columns(), &["A", "B", "C"]);
        assert_eq!(dataset.preview().rows.len(), PREVIEW_ROWS);
        assert_eq!(dataset.preview().rows[0], vec!["0", "0", "0"]);
        assert_eq!(dataset.row_count(), Some(8));
        assert_eq!(dataset.fidelity(), PreviewFidelity::Full);
        assert!(dataset.notice().is_none());
    }

    #[test]
    fn test_fewer_rows_than_preview() {
        let dataset = parse_dataset(csv("x,y\n1,2\n3,4\n")).unwrap();
        assert_eq!(dataset.preview().rows.len(), 2);
        assert_eq!(dataset.preview().headers, vec!["x", "y"]);
    }

    #[test]
    fn test_bom_blank_lines_and_trimmed_headers() {
        let dataset = parse_dataset(csv("\u{feff} id , name\n1,a\n\n2,b\n\n")).unwrap();
        assert_eq!(dataset.columns(), &["id", "name"]);
        assert_eq!(dataset.row_count(), Some(2));
    }

    #[test]
    fn test_single_column_keeps_empty_values() {
        let dataset = parse_dataset(csv("label\nyes\n\"\"\n\nno\n")).unwrap();
        assert_eq!(dataset.columns(), &["label"]);
        assert_eq!(dataset.row_count(), Some(3));
        assert_eq!(
            dataset.preview().rows,
            vec![vec!["yes"], vec![""], vec!["no"]]
        );
    }

    #[test]
    fn test_crlf_line_endings() {
        let dataset = parse_dataset(csv("a,b\r\n1,2\r\n")).unwrap();
        assert_eq!(dataset.columns(), &["a", "b"]);
        assert_eq!(dataset.preview().rows, vec![vec!["1", "2"]]);
    }

    #[test]
    fn test_ragged_row_rejected_even_past_preview() {
        let mut content = String::from("a,b\n");
        for i in 0..10 {
            content.push_str(&format!("{},{}\n", i, i));
        }
        content.push_str("oops\n");
        let err = parse_dataset(csv(&content)).unwrap_err();
        match err {
            WizardError::Parse(msg) => assert!(msg.contains("expected 2"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_and_empty_headers_rejected() {
        assert!(matches!(
            parse_dataset(csv("a,b,a\n1,2,3\n")),
            Err(WizardError::Parse(msg)) if msg.contains("duplicate")
        ));
        assert!(matches!(
            parse_dataset(csv("a,,c\n1,2,3\n")),
            Err(WizardError::Parse(msg)) if msg.contains("empty name")
        ));
        assert!(parse_dataset(csv("")).is_err());
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let source = FileSource::new("data.csv", None, vec![b'a', b',', b'b', b'\n', 0xff, b',', b'1', b'\n']);
        assert!(matches!(parse_dataset(source), Err(WizardError::Parse(_))));
    }

    #[test]
    fn test_spreadsheet_gets_placeholder() {
        let source = FileSource::new(
            "book.xlsx",
            Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            vec![0x50, 0x4b, 0x03, 0x04],
        );
        let dataset = parse_dataset(source).unwrap();
        assert_eq!(
            dataset.columns(),
            &["Column1", "Column2", "Column3", "Column4", "Column5"]
        );
        assert_eq!(dataset.preview().headers, vec!["File loaded successfully"]);
        assert!(dataset.preview().rows.is_empty());
        assert_eq!(dataset.fidelity(), PreviewFidelity::Placeholder);
        assert!(dataset.notice().is_some());
        assert_eq!(dataset.row_count(), None);
    }

    #[test]
    fn test_unsupported_type_rejected() {
        let source = FileSource::new("photo.png", Some("image/png"), vec![1, 2, 3]);
        assert!(matches!(
            parse_dataset(source),
            Err(WizardError::UnsupportedMediaType(_))
        ));
    }

    #[tokio::test]
    async fn test_blocking_parse() {
        let dataset = parse_dataset_blocking(csv("a\n1\n")).await.unwrap();
        assert_eq!(dataset.columns(), &["a"]);
    }
}
