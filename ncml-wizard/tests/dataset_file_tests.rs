//! Loading datasets from disk

mod helpers;

use helpers::datasets::{session, CHURN_CSV};
use ncml_wizard::models::{FileSource, MediaType, PreviewFidelity};
use ncml_wizard::services::parse_dataset_blocking;
use ncml_wizard::{Wizard, WizardError};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_csv_from_disk_infers_media_type() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("churn.CSV");
    fs::write(&path, CHURN_CSV).unwrap();

    let source = FileSource::from_path(&path).unwrap();
    assert_eq!(source.filename, "churn.CSV");
    assert!(source.declared_type.is_none());

    let dataset = parse_dataset_blocking(source).await.unwrap();
    assert_eq!(dataset.media_type(), MediaType::Csv);
    assert_eq!(dataset.fidelity(), PreviewFidelity::Full);
    assert_eq!(dataset.row_count(), Some(6));
    assert_eq!(dataset.size_bytes(), CHURN_CSV.len());
}

#[tokio::test]
async fn test_unsupported_file_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "a,b\n1,2\n").unwrap();

    let mut wizard = Wizard::start(&session()).unwrap();
    let err = wizard
        .select_file_async(FileSource::from_path(&path).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, WizardError::UnsupportedMediaType(_)));
    assert!(wizard.dataset().is_none());
    assert!(wizard.last_error().unwrap().contains("CSV, Excel, or JSON"));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = FileSource::from_path(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, WizardError::Io(_)));
}

#[tokio::test]
async fn test_reselecting_replaces_dataset() {
    let dir = TempDir::new().unwrap();
    let first = dir.path().join("first.csv");
    let second = dir.path().join("second.xls");
    fs::write(&first, "a,b\n1,2\n").unwrap();
    fs::write(&second, [0xd0u8, 0xcf, 0x11, 0xe0]).unwrap();

    let mut wizard = Wizard::start(&session()).unwrap();
    wizard
        .select_file_async(FileSource::from_path(&first).unwrap())
        .await
        .unwrap();
    assert!(wizard.notice().is_none());

    let dataset = wizard
        .select_file_async(FileSource::from_path(&second).unwrap())
        .await
        .unwrap();
    assert_eq!(dataset.filename(), "second.xls");
    assert_eq!(dataset.media_type(), MediaType::Excel);
    assert_eq!(dataset.columns().len(), 5);
    assert!(wizard.notice().is_some());
}
