use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::config::{PURCHASE_FILE, SELLING_FILE};
use crate::error::{AppError, Result};
use crate::report::Report;
use crate::types::{
    PurchaseRecommendation, SellingRecommendation, PURCHASE_COLUMNS, SELLING_COLUMNS,
};

/// The header comes from serde when there are rows, from `columns` otherwise.
fn to_csv<T: Serialize>(rows: &[T], columns: &[&str]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer.write_record(columns)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))
}

/// Header row is written even when there are no recommendations.
pub fn purchase_csv(rows: &[PurchaseRecommendation]) -> Result<Vec<u8>> {
    to_csv(rows, PURCHASE_COLUMNS)
}

pub fn selling_csv(rows: &[SellingRecommendation]) -> Result<Vec<u8>> {
    to_csv(rows, SELLING_COLUMNS)
}

/// Writes both recommendation files into `dir`, creating it if needed.
/// Returns the purchase and selling file paths.
pub async fn write_reports(dir: impl AsRef<Path>, report: &Report) -> Result<(PathBuf, PathBuf)> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let purchase_path = dir.join(PURCHASE_FILE);
    let selling_path = dir.join(SELLING_FILE);
    tokio::fs::write(&purchase_path, purchase_csv(&report.purchases)?).await?;
    tokio::fs::write(&selling_path, selling_csv(&report.sellings)?).await?;

    info!(
        purchases = report.purchases.len(),
        sellings = report.sellings.len(),
        dir = %dir.display(),
        "exports written"
    );
    Ok((purchase_path, selling_path))
}
