use crate::utils::{parse_month, parse_quarter, quarter_months, ALL_MONTHS};
use chrono::Month;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Product group whose line items carry no physical weight. Excluded from
/// every weight-based aggregation (KGS and the per-kg ratios).
pub const SERVICES_CHARGES_GROUP: &str = "Services Charges";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PeriodKind {
    #[schemars(description = "Realized figures from the sales ledger")]
    Actual,

    #[schemars(description = "Planned figures from the budget workbook")]
    Budget,
}

impl PeriodKind {
    /// Matches a type header string. Exact comparison after trimming;
    /// casing is significant ("actual" does not match).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "Actual" => Some(Self::Actual),
            "Budget" => Some(Self::Budget),
            _ => None,
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Actual => write!(f, "Actual"),
            Self::Budget => write!(f, "Budget"),
        }
    }
}

/// The month selection a period resolves to before column matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodSpan {
    Month(Month),
    Quarter(u32),
    FullYear,
    Custom(Vec<Month>),
}

impl PeriodSpan {
    /// The set of months a dataset column may carry to match this span.
    pub fn month_set(&self) -> Vec<Month> {
        match self {
            Self::Month(m) => vec![*m],
            Self::Quarter(q) => quarter_months(*q)
                .map(|ms| ms.to_vec())
                .unwrap_or_default(),
            Self::FullYear => ALL_MONTHS.to_vec(),
            Self::Custom(months) => months.clone(),
        }
    }

    /// Canonical label used in period keys.
    pub fn label(&self) -> String {
        match self {
            Self::Month(m) => m.name().to_string(),
            Self::Quarter(q) => format!("Q{}", q),
            Self::FullYear => "Year".to_string(),
            Self::Custom(_) => "Custom".to_string(),
        }
    }
}

/// A reporting column descriptor as authored by the comparison-set
/// configuration: one year, a month/quarter/full-year selector, and the
/// Actual/Budget axis. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    #[schemars(description = "Calendar year of the reporting column")]
    pub year: i32,

    #[schemars(
        description = "Month name ('January'), quarter code ('Q1'..'Q4'), or null for the full year"
    )]
    #[serde(default)]
    pub month: Option<String>,

    #[schemars(description = "Actual or Budget figures")]
    pub kind: PeriodKind,

    #[schemars(description = "True when this period is a hand-picked month range")]
    #[serde(default)]
    pub is_custom_range: bool,

    #[schemars(
        description = "Explicit month list for custom ranges; takes precedence over 'month'"
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<Vec<String>>,

    #[schemars(description = "Display label for custom ranges, used in the period key")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[schemars(description = "Optional chart color override, passed through to consumers")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Period {
    pub fn month(year: i32, month: &str, kind: PeriodKind) -> Self {
        Self {
            year,
            month: Some(month.to_string()),
            kind,
            is_custom_range: false,
            months: None,
            display_name: None,
            color: None,
        }
    }

    pub fn quarter(year: i32, quarter: u32, kind: PeriodKind) -> Self {
        Self::month(year, &format!("Q{}", quarter), kind)
    }

    pub fn full_year(year: i32, kind: PeriodKind) -> Self {
        Self {
            year,
            month: None,
            kind,
            is_custom_range: false,
            months: None,
            display_name: None,
            color: None,
        }
    }

    pub fn custom(year: i32, display_name: &str, months: Vec<String>, kind: PeriodKind) -> Self {
        Self {
            year,
            month: None,
            kind,
            is_custom_range: true,
            months: Some(months),
            display_name: Some(display_name.to_string()),
            color: None,
        }
    }

    /// Resolves the month selector. `None` means the descriptor cannot
    /// match any column (unknown month or quarter text); the engine treats
    /// that as "no matching data", never as an error.
    pub fn span(&self) -> Option<PeriodSpan> {
        if self.is_custom_range || self.months.is_some() {
            let raw = self.months.as_deref().unwrap_or_default();
            let months: Vec<Month> = raw.iter().filter_map(|m| parse_month(m)).collect();
            if months.len() < raw.len() {
                warn!(
                    "Custom range '{}' contains unparseable month names; {} of {} kept",
                    self.display_name.as_deref().unwrap_or("?"),
                    months.len(),
                    raw.len()
                );
            }
            return Some(PeriodSpan::Custom(months));
        }

        match self.month.as_deref().map(str::trim) {
            None | Some("") | Some("Year") => Some(PeriodSpan::FullYear),
            Some(text) => {
                if let Some(q) = parse_quarter(text) {
                    Some(PeriodSpan::Quarter(q))
                } else if let Some(m) = parse_month(text) {
                    Some(PeriodSpan::Month(m))
                } else {
                    warn!("Period month selector '{}' is not a month, quarter, or 'Year'", text);
                    None
                }
            }
        }
    }

    /// Derived lookup key: `year-month-kind`, or `year-displayName-kind`
    /// for custom ranges. Two descriptors with equal year/selector/kind
    /// always produce the same key regardless of object identity.
    pub fn key(&self) -> String {
        if self.is_custom_range {
            let name = self.display_name.as_deref().unwrap_or("Custom");
            return format!("{}-{}-{}", self.year, name, self.kind);
        }
        let label = self
            .span()
            .map(|s| s.label())
            .unwrap_or_else(|| self.month.as_deref().unwrap_or("Year").trim().to_string());
        format!("{}-{}-{}", self.year, label, self.kind)
    }

    /// Label shown to chart/table consumers.
    pub fn display_label(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) => name.to_string(),
            None => self.key(),
        }
    }
}

/// Parsed header of one value column: year row, month row, type row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnHeader {
    pub year: i32,
    pub month: Month,
    pub kind: PeriodKind,
}

/// One data row of the grid. Classification fields are trimmed at
/// ingestion; `values` is aligned to `Dataset::columns`, `None` marking a
/// blank or malformed source cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRow {
    pub label: String,
    pub material: String,
    pub process: String,
    pub product_group: String,
    pub values: Vec<Option<f64>>,
}

/// The in-memory dataset the engine reads: value-column headers plus data
/// rows. Treated as read-only by every operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub columns: Vec<ColumnHeader>,
    pub rows: Vec<LineRow>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Which classification column a category aggregation filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Process,
    Material,
}

/// Metrics the grouped tables and charts report on. The first three are
/// summed straight from raw rows; the rest are ratios derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum MetricKind {
    Kgs,
    Sales,
    Morm,
    SlsPerKg,
    RmPerKg,
    MormPerKg,
    MormPct,
}

impl MetricKind {
    /// Row label used in the grouped source sheets.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Kgs => "KGS",
            Self::Sales => "Sales",
            Self::Morm => "MoRM",
            Self::SlsPerKg => "Sls/Kg",
            Self::RmPerKg => "RM/kg",
            Self::MormPerKg => "MoRM/Kg",
            Self::MormPct => "MoRM%",
        }
    }

    /// Weight-based metrics exclude the Services Charges product group,
    /// whose line items have no physical weight.
    pub fn is_weight_based(&self) -> bool {
        matches!(
            self,
            Self::Kgs | Self::SlsPerKg | Self::RmPerKg | Self::MormPerKg
        )
    }

    /// Derived metrics are computed from the base sums, never summed
    /// directly across rows.
    pub fn is_derived(&self) -> bool {
        matches!(
            self,
            Self::SlsPerKg | Self::RmPerKg | Self::MormPerKg | Self::MormPct
        )
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_ignores_identity() {
        let a = Period::month(2025, "January", PeriodKind::Actual);
        let b = Period::month(2025, "January", PeriodKind::Actual);
        assert_eq!(a.key(), b.key());
        assert_eq!(a.key(), "2025-January-Actual");
    }

    #[test]
    fn test_period_key_normalizes_whitespace_and_case() {
        let padded = Period::month(2025, "  january ", PeriodKind::Actual);
        let clean = Period::month(2025, "January", PeriodKind::Actual);
        assert_eq!(padded.key(), clean.key());
    }

    #[test]
    fn test_full_year_key() {
        let p = Period::full_year(2024, PeriodKind::Budget);
        assert_eq!(p.key(), "2024-Year-Budget");
        assert_eq!(p.span(), Some(PeriodSpan::FullYear));
        assert_eq!(p.span().unwrap().month_set().len(), 12);
    }

    #[test]
    fn test_quarter_span() {
        let p = Period::quarter(2025, 1, PeriodKind::Actual);
        let months = p.span().unwrap().month_set();
        assert_eq!(months, vec![Month::January, Month::February, Month::March]);
        assert_eq!(p.key(), "2025-Q1-Actual");
    }

    #[test]
    fn test_custom_range_key_uses_display_name() {
        let p = Period::custom(
            2025,
            "Peak Season",
            vec!["November".into(), "December".into()],
            PeriodKind::Actual,
        );
        assert_eq!(p.key(), "2025-Peak Season-Actual");
        let months = p.span().unwrap().month_set();
        assert_eq!(months, vec![Month::November, Month::December]);
    }

    #[test]
    fn test_unknown_selector_resolves_to_nothing() {
        let p = Period::month(2025, "Januray", PeriodKind::Actual);
        assert_eq!(p.span(), None);
    }

    #[test]
    fn test_kind_parse_is_exact_after_trim() {
        assert_eq!(PeriodKind::parse(" Actual "), Some(PeriodKind::Actual));
        assert_eq!(PeriodKind::parse("actual"), None);
        assert_eq!(PeriodKind::parse("BUDGET"), None);
    }

    #[test]
    fn test_period_serialization_round_trip() {
        let p = Period::quarter(2025, 2, PeriodKind::Budget);
        let json = serde_json::to_string(&p).unwrap();
        let back: Period = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert_eq!(back.key(), p.key());
    }

    #[test]
    fn test_metric_weight_subset() {
        assert!(MetricKind::Kgs.is_weight_based());
        assert!(MetricKind::SlsPerKg.is_weight_based());
        assert!(MetricKind::RmPerKg.is_weight_based());
        assert!(MetricKind::MormPerKg.is_weight_based());
        assert!(!MetricKind::Sales.is_weight_based());
        assert!(!MetricKind::MormPct.is_weight_based());
    }
}
