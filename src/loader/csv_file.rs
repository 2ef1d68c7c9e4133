//! Flat-file sink: one CSV with a header row.

use super::LoadSink;
use crate::models::CleanedProduct;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Overwrite `path` with the products, header first.
pub fn write_csv(path: &Path, products: &[CleanedProduct]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Could not create dir {:?}", parent))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {:?}", path))?;

    for p in products {
        writer.serialize(p).with_context(|| format!("write row {:?}", p.title))?;
    }
    writer.flush()?;

    debug!("Wrote {} rows to {:?}", products.len(), path);
    Ok(products.len())
}

#[async_trait]
impl LoadSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn load(&self, products: &[CleanedProduct]) -> Result<usize> {
        write_csv(&self.path, products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product() -> CleanedProduct {
        CleanedProduct {
            title: "T-shirt 2".into(),
            price: 160_000.0,
            rating: 4.5,
            colors: 3,
            size: "M".into(),
            gender: "Women".into(),
            timestamp: NaiveDate::from_ymd_opt(2025, 5, 1)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("products.csv");

        let n = CsvSink::new(&path).load(&[product()]).await.unwrap();
        assert_eq!(n, 1);

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Title,Price,Rating,Colors,Size,Gender,Timestamp"));
        assert_eq!(lines.next(), Some("T-shirt 2,160000.0,4.5,3,M,Women,2025-05-01T10:30:00"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn round_trips_through_csv_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.csv");
        write_csv(&path, &[product(), product()]).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<CleanedProduct> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows, vec![product(), product()]);
    }
}
