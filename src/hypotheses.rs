//! The ten business hypotheses checked against the cleaned dataset.
//!
//! Every check is a plain grouped aggregation. A hypothesis whose comparison
//! groups are missing from the data reports `observed: None` instead of
//! failing the run.

use serde::Serialize;

use crate::config::hypothesis_thresholds as th;
use crate::stats::{mean, mean_by, pct_delta};
use crate::types::{Flag, PropertyRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Percent,
    Years,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub group: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisResult {
    pub number: u8,
    pub claim: &'static str,
    pub expected: f64,
    pub observed: Option<f64>,
    pub unit: Unit,
    /// `observed >= expected`
    pub holds: Option<bool>,
    pub groups: Vec<GroupStat>,
}

impl HypothesisResult {
    fn new(
        number: u8,
        claim: &'static str,
        expected: f64,
        unit: Unit,
        observed: Option<f64>,
        groups: Vec<GroupStat>,
    ) -> Self {
        Self {
            number,
            claim,
            expected,
            observed,
            unit,
            holds: observed.map(|o| o >= expected),
            groups,
        }
    }
}

/// Mean price per key with the period-over-period change of that mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRow<K> {
    pub key: K,
    pub mean_price: f64,
    /// Percent change against the previous key; the first row is 0.
    pub growth_pct: f64,
}

pub fn growth_table<'a, K, I, F>(records: I, key: F) -> Vec<GrowthRow<K>>
where
    K: Ord,
    I: IntoIterator<Item = &'a PropertyRecord>,
    F: Fn(&PropertyRecord) -> K,
{
    let means = mean_by(records.into_iter().map(|r| (key(r), r.price)));
    let mut rows: Vec<GrowthRow<K>> = Vec::with_capacity(means.len());
    let mut previous: Option<f64> = None;
    for (key, mean_price) in means {
        let growth_pct = match previous {
            Some(prev) if prev != 0.0 => (mean_price / prev - 1.0) * 100.0,
            _ => 0.0,
        };
        previous = Some(mean_price);
        rows.push(GrowthRow {
            key,
            mean_price,
            growth_pct,
        });
    }
    rows
}

/// Average growth over all rows, the leading zero included.
pub fn mean_growth<K>(rows: &[GrowthRow<K>]) -> Option<f64> {
    let values: Vec<f64> = rows.iter().map(|r| r.growth_pct).collect();
    mean(&values)
}

/// Means of `value` split by a yes/no flag, "no" first.
fn split_means<F, V>(records: &[PropertyRecord], flag: F, value: V) -> (Vec<GroupStat>, Option<(f64, f64)>)
where
    F: Fn(&PropertyRecord) -> Flag,
    V: Fn(&PropertyRecord) -> f64,
{
    let means = mean_by(records.iter().map(|r| (flag(r), value(r))));
    let groups = means
        .iter()
        .map(|(flag, value)| GroupStat {
            group: flag.to_string(),
            value: *value,
        })
        .collect();
    let pair = match (means.get(&Flag::Yes), means.get(&Flag::No)) {
        (Some(&yes), Some(&no)) => Some((yes, no)),
        _ => None,
    };
    (groups, pair)
}

fn premium<F, V>(
    number: u8,
    claim: &'static str,
    expected: f64,
    records: &[PropertyRecord],
    flag: F,
    value: V,
) -> HypothesisResult
where
    F: Fn(&PropertyRecord) -> Flag,
    V: Fn(&PropertyRecord) -> f64,
{
    let (groups, pair) = split_means(records, flag, value);
    let observed = pair.and_then(|(yes, no)| pct_delta(yes, no));
    HypothesisResult::new(number, claim, expected, Unit::Percent, observed, groups)
}

fn monthly_growth<'a, I>(records: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a PropertyRecord>,
{
    mean_growth(&growth_table(records, |r| r.year_month.clone()))
}

pub fn run_all(records: &[PropertyRecord]) -> Vec<HypothesisResult> {
    let price = |r: &PropertyRecord| r.price;

    let h1 = premium(
        1,
        "Waterfront houses are 30% more expensive, on average",
        th::WATERFRONT_PREMIUM_PCT,
        records,
        |r| r.water_view,
        price,
    );

    let h2 = premium(
        2,
        "Houses built after 1955 are 50% more expensive, on average",
        th::BUILT_AFTER_PREMIUM_PCT,
        records,
        |r| if r.yr_built > th::BUILT_AFTER_YEAR { Flag::Yes } else { Flag::No },
        price,
    );

    let h3 = premium(
        3,
        "Houses with basement are 50% bigger, on average",
        th::BASEMENT_SIZE_PCT,
        records,
        |r| r.with_basement,
        |r| r.sqft_living,
    );

    let h4 = HypothesisResult::new(
        4,
        "The YoY price growth by year built is 10%",
        th::YOY_GROWTH_PCT,
        Unit::Percent,
        mean_growth(&growth_table(records, |r| r.yr_built)),
        Vec::new(),
    );

    let h5 = HypothesisResult::new(
        5,
        "Houses with 3 bathrooms have a 15% MoM price growth",
        th::BATHROOM_MOM_GROWTH_PCT,
        Unit::Percent,
        monthly_growth(records.iter().filter(|r| r.bathrooms == th::BATHROOM_COUNT)),
        Vec::new(),
    );

    let h6 = premium(
        6,
        "In December houses are 25% more expensive than in other months, on average",
        th::DECEMBER_PREMIUM_PCT,
        records,
        |r| if r.month == 12 { Flag::Yes } else { Flag::No },
        price,
    );

    let h7 = premium(
        7,
        "Renovated houses are 50% more expensive, on average",
        th::RENOVATED_PREMIUM_PCT,
        records,
        |r| r.renovated,
        price,
    );

    let h8 = premium(
        8,
        "Houses with basement are 40% more expensive, on average",
        th::BASEMENT_PREMIUM_PCT,
        records,
        |r| r.with_basement,
        price,
    );

    let (groups, pair) = split_means(records, |r| r.condition_good, |r| r.yr_built as f64);
    let h9 = HypothesisResult::new(
        9,
        "Houses in good condition are 10 years younger than houses in bad condition, on average",
        th::GOOD_CONDITION_AGE_YEARS,
        Unit::Years,
        pair.map(|(yes, no)| yes - no),
        groups,
    );

    let not_renovated = monthly_growth(records.iter().filter(|r| !r.renovated.is_yes()));
    let renovated = monthly_growth(records.iter().filter(|r| r.renovated.is_yes()));
    let groups = [(Flag::No, not_renovated), (Flag::Yes, renovated)]
        .into_iter()
        .filter_map(|(flag, value)| {
            value.map(|value| GroupStat {
                group: flag.to_string(),
                value,
            })
        })
        .collect();
    let h10 = HypothesisResult::new(
        10,
        "Renovated houses have a MoM price growth 5% bigger than non-renovated houses",
        th::RENOVATED_MOM_EDGE_PCT,
        Unit::Percent,
        renovated.zip(not_renovated).map(|(yes, no)| yes - no),
        groups,
    );

    vec![h1, h2, h3, h4, h5, h6, h7, h8, h9, h10]
}
