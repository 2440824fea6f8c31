//! Per-timestep record schema of a simulation log

use serde::{de, Deserialize, Deserializer};

/// Column names every simulation log must carry
pub const REQUIRED_COLUMNS: [&str; 11] = [
    "temp_air",
    "rh_air",
    "co2_air",
    "Rewards",
    "Revenue",
    "Heat costs",
    "CO2 costs",
    "Elec costs",
    "temp_violation",
    "co2_violation",
    "rh_violation",
];

/// One timestep of a controller run
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TimestepRecord {
    /// Air temperature (°C)
    pub temp_air: f64,
    /// Relative humidity (%)
    pub rh_air: f64,
    /// CO2 concentration (ppm)
    pub co2_air: f64,

    #[serde(rename = "Rewards")]
    pub reward: f64,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "Heat costs")]
    pub heat_cost: f64,
    #[serde(rename = "CO2 costs")]
    pub co2_cost: f64,
    #[serde(rename = "Elec costs")]
    pub elec_cost: f64,

    #[serde(deserialize_with = "indicator")]
    pub temp_violation: f64,
    #[serde(deserialize_with = "indicator")]
    pub co2_violation: f64,
    #[serde(deserialize_with = "indicator")]
    pub rh_violation: f64,
}

/// Violation indicators are written either as numbers or as boolean literals.
fn indicator<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_indicator(&raw).ok_or_else(|| {
        de::Error::custom(format!("invalid violation indicator {:?}", raw))
    })
}

fn parse_indicator(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(1.0)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(0.0)
    } else {
        raw.parse::<f64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_indicator_forms() {
        assert_eq!(parse_indicator("1"), Some(1.0));
        assert_eq!(parse_indicator("0.0"), Some(0.0));
        assert_eq!(parse_indicator("True"), Some(1.0));
        assert_eq!(parse_indicator("FALSE"), Some(0.0));
        assert_eq!(parse_indicator(" true "), Some(1.0));
        assert_eq!(parse_indicator(""), None);
        assert_eq!(parse_indicator("maybe"), None);
    }

    #[test]
    fn test_record_from_log_row() {
        let data = format!("{}\n21.5,75,600,1.5,3,0.2,0.1,0.05,True,0,1.0\n", REQUIRED_COLUMNS.join(","));
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let record: TimestepRecord = reader.deserialize().next().unwrap().unwrap();

        assert_eq!(record.reward, 1.5);
        assert_eq!(record.heat_cost, 0.2);
        assert_eq!(record.temp_violation, 1.0);
        assert_eq!(record.co2_violation, 0.0);
        assert_eq!(record.rh_violation, 1.0);
    }

    #[test]
    fn test_required_columns_unique() {
        let mut cols = REQUIRED_COLUMNS.to_vec();
        cols.sort_unstable();
        cols.dedup();
        assert_eq!(cols.len(), REQUIRED_COLUMNS.len());
    }
}
