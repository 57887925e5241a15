use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Boolean attribute rendered as a "yes"/"no" label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    No,
    Yes,
}

impl Flag {
    pub fn from_nonzero<T: Default + PartialEq>(value: T) -> Self {
        if value == T::default() {
            Flag::No
        } else {
            Flag::Yes
        }
    }

    pub fn is_yes(self) -> bool {
        self == Flag::Yes
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flag::No => write!(f, "no"),
            Flag::Yes => write!(f, "yes"),
        }
    }
}

impl std::str::FromStr for Flag {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "yes" => Ok(Flag::Yes),
            "no" => Ok(Flag::No),
            other => Err(format!("expected 'yes' or 'no', got '{other}'")),
        }
    }
}

/// Calendar bin of the sale month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    #[serde(rename = "Mar to May")]
    MarToMay,
    #[serde(rename = "Jun to Aug")]
    JunToAug,
    #[serde(rename = "Sep to Nov")]
    SepToNov,
    #[serde(rename = "Dec to Feb")]
    DecToFeb,
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Season::MarToMay => "Mar to May",
            Season::JunToAug => "Jun to Aug",
            Season::SepToNov => "Sep to Nov",
            Season::DecToFeb => "Dec to Feb",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SellingMoment {
    /// Bought below the zipcode+season median.
    Good,
    /// Bought exactly at the median.
    Regular,
    /// Bought above the median.
    Bad,
}

impl std::fmt::Display for SellingMoment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SellingMoment::Good => "good",
            SellingMoment::Regular => "regular",
            SellingMoment::Bad => "bad",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Property records
// ---------------------------------------------------------------------------

/// One row of the input file as it appears on disk. Columns not listed here
/// are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    pub id: u64,
    pub date: String,
    pub price: f64,
    pub zipcode: u32,
    pub waterfront: u8,
    pub condition: u8,
    pub yr_built: i32,
    pub yr_renovated: i32,
    pub sqft_living: f64,
    pub sqft_basement: f64,
    pub bathrooms: f64,
    pub lat: f64,
    pub long: f64,
}

/// Columns that must be present in the input header.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "id",
    "date",
    "price",
    "zipcode",
    "waterfront",
    "condition",
    "yr_built",
    "yr_renovated",
    "sqft_living",
    "sqft_basement",
    "bathrooms",
    "lat",
    "long",
];

/// Cleaned, deduplicated sale with its derived attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    pub id: u64,
    pub date: NaiveDate,
    pub price: f64,
    pub zipcode: u32,
    pub waterfront: u8,
    pub condition: u8,
    pub yr_built: i32,
    pub yr_renovated: i32,
    pub sqft_living: f64,
    pub sqft_basement: f64,
    pub bathrooms: f64,
    pub lat: f64,
    pub long: f64,

    pub year: i32,
    pub month: u32,
    /// "YYYY-MM"
    pub year_month: String,
    pub season: Season,
    pub water_view: Flag,
    pub condition_good: Flag,
    pub renovated: Flag,
    pub with_basement: Flag,
}

/// Field names of [`PropertyRecord`], in serialisation order.
pub const PROPERTY_COLUMNS: &[&str] = &[
    "id",
    "date",
    "price",
    "zipcode",
    "waterfront",
    "condition",
    "yr_built",
    "yr_renovated",
    "sqft_living",
    "sqft_basement",
    "bathrooms",
    "lat",
    "long",
    "year",
    "month",
    "year_month",
    "season",
    "water_view",
    "condition_good",
    "renovated",
    "with_basement",
];

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Sorted by sale date, most recent first.
    pub records: Vec<PropertyRecord>,
    pub duplicates_removed: usize,
}

// ---------------------------------------------------------------------------
// Reference tables
// ---------------------------------------------------------------------------

pub type ZipMedianTable = BTreeMap<u32, f64>;
pub type SeasonMedianTable = BTreeMap<(u32, Season), f64>;

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseRecommendation {
    pub id: u64,
    pub date: NaiveDate,
    pub zipcode: u32,
    pub price: f64,
    pub median_price: f64,
}

/// Field names of [`PurchaseRecommendation`], in serialisation order.
pub const PURCHASE_COLUMNS: &[&str] = &["id", "date", "zipcode", "price", "median_price"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellingRecommendation {
    pub id: u64,
    pub zipcode: u32,
    /// Season of the purchase date.
    pub season: Season,
    pub price: f64,
    /// Season of the median row the price was compared against.
    pub median_season: Season,
    pub median_price: f64,
    pub selling_price: f64,
    pub selling_moment: SellingMoment,
}

/// Field names of [`SellingRecommendation`], in serialisation order.
pub const SELLING_COLUMNS: &[&str] = &[
    "id",
    "zipcode",
    "season",
    "price",
    "median_season",
    "median_price",
    "selling_price",
    "selling_moment",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FinanceSummary {
    pub total_cost: f64,
    pub total_revenue: f64,
    pub net_profit: f64,
}

/// Non-fatal conditions of a report run. Affected tables are empty and their
/// totals zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportWarning {
    NoPurchaseCandidates,
    NoGoodSales,
}

impl std::fmt::Display for ReportWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportWarning::NoPurchaseCandidates => {
                write!(f, "no property matches the purchase criteria")
            }
            ReportWarning::NoGoodSales => write!(f, "no purchase has a good selling moment"),
        }
    }
}
