use crate::error::{AppError, Result};

pub const DATA_PATH: &str = "csv/kc_house_data.csv";
pub const OUTPUT_DIR: &str = "csv";

pub const PURCHASE_FILE: &str = "purchase_recommendations.csv";
pub const SELLING_FILE: &str = "selling_recommendations.csv";

/// Condition scores strictly above this count as good condition.
pub const GOOD_CONDITION_ABOVE: u8 = 3;

/// Markup applied to the purchase price, keyed by how the price compares to
/// the zipcode+season median.
pub mod markup {
    pub const BELOW_MEDIAN: f64 = 1.3;
    pub const AT_MEDIAN: f64 = 1.2;
    pub const ABOVE_MEDIAN: f64 = 1.1;
}

/// Expected values of the ten business hypotheses.
pub mod hypothesis_thresholds {
    pub const WATERFRONT_PREMIUM_PCT: f64 = 30.0;
    /// Houses built after this year count as "younger".
    pub const BUILT_AFTER_YEAR: i32 = 1955;
    pub const BUILT_AFTER_PREMIUM_PCT: f64 = 50.0;
    pub const BASEMENT_SIZE_PCT: f64 = 50.0;
    pub const YOY_GROWTH_PCT: f64 = 10.0;
    pub const BATHROOM_COUNT: f64 = 3.0;
    pub const BATHROOM_MOM_GROWTH_PCT: f64 = 15.0;
    pub const DECEMBER_PREMIUM_PCT: f64 = 25.0;
    pub const RENOVATED_PREMIUM_PCT: f64 = 50.0;
    pub const BASEMENT_PREMIUM_PCT: f64 = 40.0;
    pub const GOOD_CONDITION_AGE_YEARS: f64 = 10.0;
    pub const RENOVATED_MOM_EDGE_PCT: f64 = 5.0;
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: String,
    pub output_dir: String,
    pub log_level: String,
    /// Keep running after the exports and serve the JSON interface (SERVE_API)
    pub serve_api: bool,
    pub api_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_path: std::env::var("HOUSE_DATA_PATH").unwrap_or_else(|_| DATA_PATH.to_string()),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or_else(|_| OUTPUT_DIR.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            serve_api: parse_bool(
                "SERVE_API",
                &std::env::var("SERVE_API").unwrap_or_else(|_| "false".to_string()),
            )?,
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
        })
    }
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(AppError::Config(format!("{name} must be a boolean, got '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_values() {
        assert!(parse_bool("SERVE_API", "true").unwrap());
        assert!(parse_bool("SERVE_API", " ON ").unwrap());
        assert!(!parse_bool("SERVE_API", "0").unwrap());
        assert!(!parse_bool("SERVE_API", "").unwrap());
        assert!(matches!(parse_bool("SERVE_API", "maybe"), Err(AppError::Config(_))));
    }
}
