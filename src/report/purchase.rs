use tracing::debug;

use crate::stats::median_by;
use crate::types::{PropertyRecord, PurchaseRecommendation, ZipMedianTable};

/// Median sale price per zipcode over every record passed in.
pub fn zip_medians(records: &[PropertyRecord]) -> ZipMedianTable {
    median_by(records.iter().map(|r| (r.zipcode, r.price)))
}

/// Waterfront houses in good condition priced strictly below their zipcode
/// median, sorted by zipcode. Records of the same zipcode keep their input
/// order.
pub fn purchase_report(
    records: &[PropertyRecord],
    medians: &ZipMedianTable,
) -> Vec<PurchaseRecommendation> {
    let mut candidates = 0usize;
    let mut purchases: Vec<PurchaseRecommendation> = records
        .iter()
        .filter(|r| r.water_view.is_yes() && r.condition_good.is_yes())
        .inspect(|_| candidates += 1)
        .filter_map(|r| {
            let median_price = *medians.get(&r.zipcode)?;
            (r.price < median_price).then(|| PurchaseRecommendation {
                id: r.id,
                date: r.date,
                zipcode: r.zipcode,
                price: r.price,
                median_price,
            })
        })
        .collect();

    purchases.sort_by_key(|p| p.zipcode);
    debug!(candidates, purchases = purchases.len(), "purchase selection done");
    purchases
}
