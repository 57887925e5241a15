pub mod finance;
pub mod purchase;
pub mod selling;

use serde::Serialize;
use tracing::{info, warn};

use crate::hypotheses::{self, HypothesisResult};
use crate::types::{
    Dataset, FinanceSummary, PropertyRecord, PurchaseRecommendation, ReportWarning,
    Season, SeasonMedianTable, SellingMoment, SellingRecommendation, ZipMedianTable,
};

pub use finance::finance_result;
pub use purchase::{purchase_report, zip_medians};
pub use selling::{season_medians, selling_report};

/// Every table computed from one load of the dataset. Built once and then
/// only read.
#[derive(Debug, Clone)]
pub struct Report {
    pub records: Vec<PropertyRecord>,
    pub duplicates_removed: usize,
    pub zip_medians: ZipMedianTable,
    pub season_medians: SeasonMedianTable,
    pub purchases: Vec<PurchaseRecommendation>,
    pub sellings: Vec<SellingRecommendation>,
    pub finance: FinanceSummary,
    pub hypotheses: Vec<HypothesisResult>,
    pub warnings: Vec<ReportWarning>,
}

/// Row of the zipcode median table as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ZipMedianRow {
    pub zipcode: u32,
    pub median_price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SeasonMedianRow {
    pub zipcode: u32,
    pub season: Season,
    pub median_price: f64,
}

impl Report {
    pub fn build(dataset: Dataset) -> Self {
        let Dataset {
            records,
            duplicates_removed,
        } = dataset;

        let zip_medians = zip_medians(&records);
        let purchases = purchase_report(&records, &zip_medians);
        let season_medians = season_medians(&records);
        let sellings = selling_report(&purchases, &season_medians);
        let finance = finance_result(&purchases, &sellings);
        let hypotheses = hypotheses::run_all(&records);

        let mut warnings = Vec::new();
        if purchases.is_empty() {
            warnings.push(ReportWarning::NoPurchaseCandidates);
        }
        if !sellings
            .iter()
            .any(|s| s.selling_moment == SellingMoment::Good)
        {
            warnings.push(ReportWarning::NoGoodSales);
        }
        for w in &warnings {
            warn!("{w}");
        }

        info!(
            zipcodes = zip_medians.len(),
            purchases = purchases.len(),
            sellings = sellings.len(),
            "report built"
        );

        Self {
            records,
            duplicates_removed,
            zip_medians,
            season_medians,
            purchases,
            sellings,
            finance,
            hypotheses,
            warnings,
        }
    }

    pub fn zip_median_rows(&self) -> Vec<ZipMedianRow> {
        self.zip_medians
            .iter()
            .map(|(&zipcode, &median_price)| ZipMedianRow {
                zipcode,
                median_price,
            })
            .collect()
    }

    pub fn season_median_rows(&self) -> Vec<SeasonMedianRow> {
        self.season_medians
            .iter()
            .map(|(&(zipcode, season), &median_price)| SeasonMedianRow {
                zipcode,
                season,
                median_price,
            })
            .collect()
    }
}
