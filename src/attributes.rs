use chrono::{Datelike, NaiveDate};

use crate::config::GOOD_CONDITION_ABOVE;
use crate::types::{Flag, PropertyRecord, RawRecord, Season};

impl Season {
    /// Bins a calendar month (1-12). Anything outside Mar..=Nov falls into
    /// Dec to Feb.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::MarToMay,
            6..=8 => Season::JunToAug,
            9..=11 => Season::SepToNov,
            _ => Season::DecToFeb,
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self::from_month(date.month())
    }
}

pub fn condition_flag(condition: u8) -> Flag {
    if condition > GOOD_CONDITION_ABOVE {
        Flag::Yes
    } else {
        Flag::No
    }
}

/// Builds the cleaned record from a raw row and its parsed sale date.
pub fn derive(raw: RawRecord, date: NaiveDate) -> PropertyRecord {
    PropertyRecord {
        year: date.year(),
        month: date.month(),
        year_month: date.format("%Y-%m").to_string(),
        season: Season::from_date(date),
        water_view: Flag::from_nonzero(raw.waterfront),
        condition_good: condition_flag(raw.condition),
        renovated: Flag::from_nonzero(raw.yr_renovated),
        with_basement: Flag::from_nonzero(raw.sqft_basement),

        id: raw.id,
        date,
        price: raw.price,
        zipcode: raw.zipcode,
        waterfront: raw.waterfront,
        condition: raw.condition,
        yr_built: raw.yr_built,
        yr_renovated: raw.yr_renovated,
        sqft_living: raw.sqft_living,
        sqft_basement: raw.sqft_basement,
        bathrooms: raw.bathrooms,
        lat: raw.lat,
        long: raw.long,
    }
}
