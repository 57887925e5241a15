//! Read-side queries used by dashboards: filtering the cleaned dataset and
//! the per-zipcode and per-attribute averages shown next to it.
//!
//! Nothing here feeds back into the recommendation tables; medians are
//! always those of the full dataset.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::stats::{group, mean_by};
use crate::types::{Flag, PropertyRecord, PROPERTY_COLUMNS};

/// Empty lists mean "no restriction".
#[derive(Debug, Clone, Default)]
pub struct DatasetFilter {
    pub zipcodes: Vec<u32>,
    pub water_view: Vec<Flag>,
    pub condition_good: Vec<Flag>,
    /// Columns to keep when projecting rows.
    pub columns: Vec<String>,
}

impl DatasetFilter {
    pub fn matches(&self, record: &PropertyRecord) -> bool {
        (self.zipcodes.is_empty() || self.zipcodes.contains(&record.zipcode))
            && (self.water_view.is_empty() || self.water_view.contains(&record.water_view))
            && (self.condition_good.is_empty()
                || self.condition_good.contains(&record.condition_good))
    }

    pub fn apply<'a>(&self, records: &'a [PropertyRecord]) -> Vec<&'a PropertyRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// Filters and projects to the requested columns. Unknown columns are
    /// rejected before any row is touched.
    pub fn select(&self, records: &[PropertyRecord]) -> Result<Vec<Value>> {
        if let Some(unknown) = self
            .columns
            .iter()
            .find(|c| !PROPERTY_COLUMNS.contains(&c.as_str()))
        {
            return Err(AppError::InvalidQuery(format!("unknown column '{unknown}'")));
        }

        self.apply(records)
            .into_iter()
            .map(|r| -> Result<Value> {
                let value = serde_json::to_value(r)?;
                if self.columns.is_empty() {
                    return Ok(value);
                }
                let Value::Object(mut full) = value else {
                    return Ok(value);
                };
                let projected: Map<String, Value> = self
                    .columns
                    .iter()
                    .filter_map(|c| full.remove(c).map(|v| (c.clone(), v)))
                    .collect();
                Ok(Value::Object(projected))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipMetrics {
    pub zipcode: u32,
    pub total_ids: usize,
    pub avg_price: f64,
}

/// Number of properties and mean price per zipcode.
pub fn average_metrics<'a, I>(records: I) -> Vec<ZipMetrics>
where
    I: IntoIterator<Item = &'a PropertyRecord>,
{
    group(records.into_iter().map(|r| (r.zipcode, r.price)))
        .into_iter()
        .map(|(zipcode, prices)| ZipMetrics {
            zipcode,
            total_ids: prices.len(),
            avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceAttribute {
    YrBuilt,
    Month,
}

impl std::str::FromStr for PriceAttribute {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "yr_built" => Ok(PriceAttribute::YrBuilt),
            "month" => Ok(PriceAttribute::Month),
            other => Err(AppError::InvalidQuery(format!("unknown attribute '{other}'"))),
        }
    }
}

impl PriceAttribute {
    fn key(self, record: &PropertyRecord) -> i64 {
        match self {
            PriceAttribute::YrBuilt => record.yr_built as i64,
            PriceAttribute::Month => record.month as i64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeMean {
    pub key: i64,
    pub mean_price: f64,
}

/// Mean price per attribute value, keeping keys within `[min, max]`.
pub fn mean_price_by<'a, I>(
    records: I,
    attribute: PriceAttribute,
    min: Option<i64>,
    max: Option<i64>,
) -> Vec<AttributeMean>
where
    I: IntoIterator<Item = &'a PropertyRecord>,
{
    mean_by(records.into_iter().map(|r| (attribute.key(r), r.price)))
        .into_iter()
        .filter(|(key, _)| min.map_or(true, |m| *key >= m) && max.map_or(true, |m| *key <= m))
        .map(|(key, mean_price)| AttributeMean { key, mean_price })
        .collect()
}
