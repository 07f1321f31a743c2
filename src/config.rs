use crate::error::{ReportError, Result};
use crate::schema::Period;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A saved comparison set: the ordered list of periods a report renders
/// side by side. Authored by the dashboard configuration step and passed
/// to the engine explicitly; the library holds no global config state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReportConfig {
    #[schemars(description = "Display name of the saved comparison set")]
    pub name: String,

    #[schemars(
        description = "Ordered reporting periods. Keys (year-month-type) must be unique within the set."
    )]
    pub periods: Vec<Period>,
}

impl ReportConfig {
    pub fn new(name: &str, periods: Vec<Period>) -> Self {
        Self {
            name: name.to_string(),
            periods,
        }
    }

    /// Enforces the comparison-set invariants: at least one period, unique
    /// period keys, resolvable month selectors, and a display name on
    /// every custom range.
    pub fn validate(&self) -> Result<()> {
        if self.periods.is_empty() {
            return Err(ReportError::InvalidConfig {
                name: self.name.clone(),
                details: "comparison set is empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for period in &self.periods {
            let key = period.key();
            if !seen.insert(key.clone()) {
                return Err(ReportError::DuplicatePeriodKey(key));
            }

            if period.is_custom_range && period.display_name.is_none() {
                return Err(ReportError::InvalidConfig {
                    name: self.name.clone(),
                    details: format!("custom range period '{}' has no display name", key),
                });
            }

            if period.span().is_none() {
                let selector = period.month.as_deref().unwrap_or("").trim();
                if selector.to_ascii_lowercase().starts_with('q') {
                    return Err(ReportError::InvalidQuarter(selector.to_string()));
                }
                return Err(ReportError::InvalidConfig {
                    name: self.name.clone(),
                    details: format!("period '{}' has an unrecognized month selector", key),
                });
            }
        }

        Ok(())
    }

    /// Parses and validates a saved configuration file.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PeriodKind;

    #[test]
    fn test_valid_config() {
        let config = ReportConfig::new(
            "FY25 vs Budget",
            vec![
                Period::month(2025, "January", PeriodKind::Actual),
                Period::month(2025, "January", PeriodKind::Budget),
                Period::full_year(2024, PeriodKind::Actual),
            ],
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_period_key_rejected() {
        let config = ReportConfig::new(
            "dup",
            vec![
                Period::month(2025, "January", PeriodKind::Actual),
                Period::month(2025, " January ", PeriodKind::Actual),
            ],
        );
        assert!(matches!(
            config.validate(),
            Err(ReportError::DuplicatePeriodKey(key)) if key == "2025-January-Actual"
        ));
    }

    #[test]
    fn test_empty_set_rejected() {
        let config = ReportConfig::new("empty", vec![]);
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_bad_quarter_rejected() {
        let config = ReportConfig::new(
            "bad",
            vec![Period::month(2025, "Q7", PeriodKind::Actual)],
        );
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidQuarter(code)) if code == "Q7"
        ));
    }

    #[test]
    fn test_custom_range_needs_display_name() {
        let mut period = Period::custom(
            2025,
            "Peak",
            vec!["November".into(), "December".into()],
            PeriodKind::Actual,
        );
        period.display_name = None;
        let config = ReportConfig::new("custom", vec![period]);
        assert!(matches!(
            config.validate(),
            Err(ReportError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = ReportConfig::new(
            "roundtrip",
            vec![
                Period::quarter(2025, 1, PeriodKind::Actual),
                Period::quarter(2025, 1, PeriodKind::Budget),
            ],
        );
        let json = config.to_json().unwrap();
        let back = ReportConfig::from_json(&json).unwrap();
        assert_eq!(back.name, config.name);
        assert_eq!(back.periods, config.periods);
    }

    #[test]
    fn test_from_json_validates() {
        let json = r#"{"name":"bad","periods":[]}"#;
        assert!(ReportConfig::from_json(json).is_err());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = ReportConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("periods"));
        assert!(schema_json.contains("name"));
    }
}
