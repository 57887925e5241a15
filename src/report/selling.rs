use std::cmp::Ordering;

use tracing::warn;

use crate::config::markup;
use crate::stats::median_by;
use crate::types::{
    PropertyRecord, PurchaseRecommendation, Season, SeasonMedianTable, SellingMoment,
    SellingRecommendation,
};

/// Median sale price per (zipcode, season) over the full dataset.
pub fn season_medians(records: &[PropertyRecord]) -> SeasonMedianTable {
    median_by(records.iter().map(|r| ((r.zipcode, r.season), r.price)))
}

/// Compares the purchase price against the seasonal median once and derives
/// both the target selling price and the moment label from that comparison.
pub fn assess(price: f64, median_price: f64) -> (f64, SellingMoment) {
    match price.total_cmp(&median_price) {
        Ordering::Less => (price * markup::BELOW_MEDIAN, SellingMoment::Good),
        Ordering::Equal => (price * markup::AT_MEDIAN, SellingMoment::Regular),
        Ordering::Greater => (price * markup::ABOVE_MEDIAN, SellingMoment::Bad),
    }
}

/// One selling recommendation per purchase, in purchase order.
pub fn selling_report(
    purchases: &[PurchaseRecommendation],
    medians: &SeasonMedianTable,
) -> Vec<SellingRecommendation> {
    purchases
        .iter()
        .filter_map(|p| {
            let season = Season::from_date(p.date);
            let Some(&median_price) = medians.get(&(p.zipcode, season)) else {
                warn!(
                    id = p.id,
                    zipcode = p.zipcode,
                    season = %season,
                    "no seasonal median for purchase, skipping"
                );
                return None;
            };
            let (selling_price, selling_moment) = assess(p.price, median_price);
            Some(SellingRecommendation {
                id: p.id,
                zipcode: p.zipcode,
                season,
                price: p.price,
                median_season: season,
                median_price,
                selling_price,
                selling_moment,
            })
        })
        .collect()
}
