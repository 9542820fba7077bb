//! Uploaded dataset and its column inventory

use crate::error::{WizardError, WizardResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    /// `text/csv`
    Csv,
    /// `application/vnd.ms-excel`
    Excel,
    /// `application/vnd.openxmlformats-officedocument.spreadsheetml.sheet`
    Spreadsheet,
    /// `application/json`
    Json,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [Self::Csv, Self::Excel, Self::Spreadsheet, Self::Json];

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Excel => "application/vnd.ms-excel",
            Self::Spreadsheet => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Self::Json => "application/json",
        }
    }

    /// Match a declared media type; parameters such as `; charset=utf-8` are ignored
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|t| t.mime() == essence)
    }

    /// Infer the media type from the file extension
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(Self::Csv),
            "xls" => Some(Self::Excel),
            "xlsx" => Some(Self::Spreadsheet),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Resolve the declared type, falling back to the extension when absent
    pub fn resolve(declared: Option<&str>, filename: &str) -> WizardResult<Self> {
        match declared.map(str::trim).filter(|m| !m.is_empty()) {
            Some(mime) => {
                Self::from_mime(mime).ok_or_else(|| WizardError::UnsupportedMediaType(mime.to_string()))
            }
            None => Self::from_filename(filename)
                .ok_or_else(|| WizardError::UnsupportedMediaType(filename.to_string())),
        }
    }

    /// True for formats whose header row is read locally
    pub fn is_delimited(&self) -> bool {
        matches!(self, Self::Csv)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV",
            Self::Excel => "Excel",
            Self::Spreadsheet => "Excel (xlsx)",
            Self::Json => "JSON",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// How much of the file the preview reflects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewFidelity {
    /// Columns and rows read from the file
    Full,
    /// File accepted without parsing; columns are stand-ins
    Placeholder,
}

/// Header plus the first few data rows, for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPreview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// File selected by the user, before parsing
#[derive(Debug, Clone)]
pub struct FileSource {
    pub filename: String,
    /// Media type reported by the picker, if any
    pub declared_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FileSource {
    pub fn new(filename: impl Into<String>, declared_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            declared_type: declared_type.map(str::to_string),
            bytes,
        }
    }

    /// Read a file from disk; the media type is inferred from its extension
    pub fn from_path(path: &Path) -> WizardResult<Self> {
        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            filename,
            declared_type: None,
            bytes,
        })
    }
}

/// Parsed dataset
///
/// Never mutated after parsing; selecting another file replaces it.
#[derive(Debug, Clone)]
pub struct DatasetFile {
    raw: Vec<u8>,
    filename: String,
    media_type: MediaType,
    columns: Vec<String>,
    preview: DataPreview,
    fidelity: PreviewFidelity,
    row_count: Option<usize>,
}

impl DatasetFile {
    pub(crate) fn new(
        source: FileSource,
        media_type: MediaType,
        columns: Vec<String>,
        preview: DataPreview,
        fidelity: PreviewFidelity,
        row_count: Option<usize>,
    ) -> Self {
        Self {
            raw: source.bytes,
            filename: source.filename,
            media_type,
            columns,
            preview,
            fidelity,
            row_count,
        }
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    /// Column names in header order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn preview(&self) -> &DataPreview {
        &self.preview
    }

    pub fn fidelity(&self) -> PreviewFidelity {
        self.fidelity
    }

    /// Number of data rows; unknown for placeholder previews
    pub fn row_count(&self) -> Option<usize> {
        self.row_count
    }

    pub fn size_bytes(&self) -> usize {
        self.raw.len()
    }

    /// Notice to show alongside a placeholder preview
    pub fn notice(&self) -> Option<&'static str> {
        match self.fidelity {
            PreviewFidelity::Full => None,
            PreviewFidelity::Placeholder => Some(
                "For best results, please use CSV files. Other file formats have limited preview support.",
            ),
        }
    }

    /// One-line description for logs and the CLI
    pub fn summary(&self) -> String {
        let rows = match self.row_count {
            Some(n) => format!("{} rows", n),
            None => "rows unknown".to_string(),
        };
        let fidelity = match self.fidelity {
            PreviewFidelity::Full => "full preview",
            PreviewFidelity::Placeholder => "placeholder preview",
        };
        format!(
            "{} ({}, {}): {} columns, {}, {}",
            self.filename,
            format_size(self.raw.len()),
            self.media_type.label(),
            self.columns.len(),
            rows,
            fidelity
        )
    }
}

fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KB {
        format!("{} B", bytes)
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{:.1} MB", b / (KB * KB))
    }
}
