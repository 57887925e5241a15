use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info};

use crate::attributes::derive;
use crate::error::{AppError, Result};
use crate::types::{Dataset, RawRecord, REQUIRED_COLUMNS};

/// Reads the whole source file in one go and cleans it.
pub async fn load_path(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "read data source");
    load_reader(bytes.as_slice())
}

/// Parses, deduplicates and enriches sale records.
///
/// Rows are ordered by sale date, most recent first, before deduplication so
/// the latest sale of every identifier survives. Rows sharing both
/// identifier and date keep the one that appears first in the source.
pub fn load_reader<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::DataFormat(format!("header: {e}")))?
        .clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(AppError::DataFormat(format!(
                "missing required column '{column}'"
            )));
        }
    }

    let mut rows: Vec<(RawRecord, NaiveDate)> = Vec::new();
    for (idx, result) in reader.deserialize::<RawRecord>().enumerate() {
        let row = idx + 1;
        let raw = result.map_err(|e| AppError::DataFormat(format!("row {row}: {e}")))?;
        let date = parse_date(&raw.date).ok_or_else(|| {
            AppError::DataFormat(format!("row {row}: unparseable date '{}'", raw.date))
        })?;
        if !raw.price.is_finite() || raw.price < 0.0 {
            return Err(AppError::DataFormat(format!(
                "row {row}: invalid price {}",
                raw.price
            )));
        }
        if !(1..=5).contains(&raw.condition) {
            return Err(AppError::DataFormat(format!(
                "row {row}: condition must be between 1 and 5, got {}",
                raw.condition
            )));
        }
        rows.push((raw, date));
    }
    let total = rows.len();

    rows.sort_by(|a, b| b.1.cmp(&a.1));

    let mut seen = HashSet::with_capacity(rows.len());
    let records: Vec<_> = rows
        .into_iter()
        .filter(|(raw, _)| seen.insert(raw.id))
        .map(|(raw, date)| derive(raw, date))
        .collect();

    let duplicates_removed = total - records.len();
    info!(
        rows = total,
        unique = records.len(),
        duplicates = duplicates_removed,
        "dataset loaded"
    );

    Ok(Dataset {
        records,
        duplicates_removed,
    })
}

/// ISO `YYYY-MM-DD`, or the `YYYYMMDDTHHMMSS` form of the King County export.
fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S")
                .ok()
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::{Flag, Season};

    pub(crate) const HEADER: &str =
        "id,date,price,bedrooms,zipcode,waterfront,condition,yr_built,yr_renovated,sqft_living,sqft_basement,bathrooms,lat,long";

    /// Builds a CSV row with sensible defaults for the fields tests rarely care about.
    pub(crate) fn row(id: u64, date: &str, price: f64, zipcode: u32, waterfront: u8, condition: u8) -> String {
        format!("{id},{date},{price},3,{zipcode},{waterfront},{condition},1990,0,1800,0,2,47.5,-122.2")
    }

    pub(crate) fn csv_of(rows: &[String]) -> String {
        let mut out = HEADER.to_string();
        for r in rows {
            out.push('\n');
            out.push_str(r);
        }
        out.push('\n');
        out
    }

    #[test]
    fn keeps_most_recent_duplicate() {
        let data = csv_of(&[
            row(7, "2014-05-02", 300_000.0, 98001, 0, 3),
            row(7, "2015-01-20", 350_000.0, 98001, 0, 3),
            row(8, "2014-07-01", 410_000.0, 98002, 1, 4),
        ]);
        let ds = load_reader(data.as_bytes()).unwrap();
        assert_eq!(ds.records.len(), 2);
        assert_eq!(ds.duplicates_removed, 1);

        let kept = ds.records.iter().find(|r| r.id == 7).unwrap();
        assert_eq!(kept.price, 350_000.0);
        assert_eq!(kept.date, NaiveDate::from_ymd_opt(2015, 1, 20).unwrap());
        assert_eq!(kept.season, Season::DecToFeb);
    }

    #[test]
    fn identical_dates_keep_first_row() {
        let data = csv_of(&[
            row(7, "2014-05-02", 300_000.0, 98001, 0, 3),
            row(7, "2014-05-02", 999_000.0, 98001, 0, 3),
        ]);
        let ds = load_reader(data.as_bytes()).unwrap();
        assert_eq!(ds.records.len(), 1);
        assert_eq!(ds.records[0].price, 300_000.0);
    }

    #[test]
    fn sorted_most_recent_first() {
        let data = csv_of(&[
            row(1, "2014-05-02", 1.0, 98001, 0, 3),
            row(2, "2015-03-01", 1.0, 98001, 0, 3),
            row(3, "2014-11-15", 1.0, 98001, 0, 3),
        ]);
        let ds = load_reader(data.as_bytes()).unwrap();
        let ids: Vec<u64> = ds.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn accepts_king_county_timestamps() {
        let data = csv_of(&[row(1, "20141013T000000", 221_900.0, 98178, 0, 3)]);
        let ds = load_reader(data.as_bytes()).unwrap();
        assert_eq!(ds.records[0].date, NaiveDate::from_ymd_opt(2014, 10, 13).unwrap());
        assert_eq!(ds.records[0].year_month, "2014-10");
        assert_eq!(ds.records[0].water_view, Flag::No);
    }

    #[test]
    fn missing_column_is_fatal() {
        let data = "id,date,price\n1,2014-01-01,100\n";
        let err = load_reader(data.as_bytes()).unwrap_err();
        match err {
            AppError::DataFormat(msg) => assert!(msg.contains("zipcode"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_date_names_the_row() {
        let data = csv_of(&[
            row(1, "2014-01-01", 100.0, 98001, 0, 3),
            row(2, "01/02/2014", 100.0, 98001, 0, 3),
        ]);
        let err = load_reader(data.as_bytes()).unwrap_err();
        match err {
            AppError::DataFormat(msg) => {
                assert!(msg.contains("row 2"), "{msg}");
                assert!(msg.contains("01/02/2014"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_number_is_a_format_error() {
        let data = csv_of(&[row(1, "2014-01-01", 100.0, 98001, 0, 3).replace(",100,", ",lots,")]);
        assert!(matches!(
            load_reader(data.as_bytes()),
            Err(AppError::DataFormat(_))
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let data = csv_of(&[
            row(1, "2014-06-01", -500.0, 98001, 1, 5),
            row(2, "2014-06-02", 200.0, 98001, 0, 3),
            row(3, "2014-06-03", 300.0, 98001, 0, 3),
        ]);
        match load_reader(data.as_bytes()).unwrap_err() {
            AppError::DataFormat(msg) => {
                assert!(msg.contains("row 1"), "{msg}");
                assert!(msg.contains("price"), "{msg}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_finite_prices_are_rejected() {
        for price in [f64::NAN, f64::INFINITY] {
            let data = csv_of(&[
                row(1, "2014-06-01", 200.0, 98001, 0, 3),
                row(2, "2014-06-02", price, 98001, 1, 5),
            ]);
            match load_reader(data.as_bytes()).unwrap_err() {
                AppError::DataFormat(msg) => assert!(msg.contains("row 2"), "{msg}"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn zero_price_is_accepted() {
        let data = csv_of(&[row(1, "2014-06-01", 0.0, 98001, 0, 3)]);
        assert_eq!(load_reader(data.as_bytes()).unwrap().records[0].price, 0.0);
    }

    #[test]
    fn malformed_header_is_a_format_error() {
        let mut data = b"id,da\xffte,price\n".to_vec();
        data.extend_from_slice(b"1,2014-01-01,100\n");
        assert!(matches!(
            load_reader(data.as_slice()),
            Err(AppError::DataFormat(_))
        ));
    }

    #[test]
    fn condition_out_of_range() {
        let data = csv_of(&[row(1, "2014-01-01", 100.0, 98001, 0, 9)]);
        assert!(matches!(
            load_reader(data.as_bytes()),
            Err(AppError::DataFormat(_))
        ));
    }

    #[test]
    fn header_only_is_empty() {
        let ds = load_reader(csv_of(&[]).as_bytes()).unwrap();
        assert!(ds.records.is_empty());
        assert_eq!(ds.duplicates_removed, 0);
    }
}
