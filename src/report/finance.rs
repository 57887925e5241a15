use std::collections::HashSet;

use crate::types::{FinanceSummary, PurchaseRecommendation, SellingMoment, SellingRecommendation};

/// Cost of buying every recommended property against the revenue of the
/// sales with a good selling moment.
pub fn finance_result(
    purchases: &[PurchaseRecommendation],
    sellings: &[SellingRecommendation],
) -> FinanceSummary {
    let total_cost: f64 = purchases.iter().map(|p| p.price).sum();

    let mut seen = HashSet::new();
    let total_revenue: f64 = sellings
        .iter()
        .filter(|s| seen.insert((s.id, s.selling_price.to_bits())))
        .filter(|s| s.selling_moment == SellingMoment::Good)
        .map(|s| s.selling_price)
        .sum();

    FinanceSummary {
        total_cost,
        total_revenue,
        net_profit: total_revenue - total_cost,
    }
}
