use crate::schema::MetricKind;
use serde::{Deserialize, Serialize};

/// Evaluates a metric from the three base aggregates for one period.
/// Base metrics pass through; ratios guard their zero denominator by
/// returning 0 so no NaN or Infinity ever reaches a consumer.
pub fn derived_ratio(metric: MetricKind, kgs: f64, sales: f64, morm: f64) -> f64 {
    match metric {
        MetricKind::Kgs => kgs,
        MetricKind::Sales => sales,
        MetricKind::Morm => morm,
        MetricKind::SlsPerKg => guard_div(sales, kgs),
        MetricKind::RmPerKg => guard_div(sales - morm, kgs),
        MetricKind::MormPerKg => guard_div(morm, kgs),
        MetricKind::MormPct => guard_div(morm, sales) * 100.0,
    }
}

fn guard_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Rendering hint for period-over-period movement (arrow and color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    fn of(pct: f64) -> Self {
        if pct > 0.0 {
            Self::Up
        } else if pct < 0.0 {
            Self::Down
        } else {
            Self::Flat
        }
    }
}

/// Period-over-period percentage change with its display direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub pct: f64,
    pub direction: Direction,
}

/// `(current - previous) / |previous| * 100`. A zero previous value yields
/// 0 regardless of `current`; a metric growing from nothing reports flat.
pub fn period_delta(current: f64, previous: f64) -> Delta {
    let pct = if previous == 0.0 {
        0.0
    } else {
        (current - previous) / previous.abs() * 100.0
    };
    Delta {
        pct,
        direction: Direction::of(pct),
    }
}

/// Compound annual growth rate over `years` years, in percent.
///
/// Returns 0 when either prior-year value is absent or `years < 2`, and
/// guards the undefined cases (non-positive base value, negative current)
/// the same way so the result is always finite.
pub fn cagr(current: f64, prev1: Option<f64>, prev2: Option<f64>, years: u32) -> f64 {
    if years < 2 {
        return 0.0;
    }
    let (Some(_prev1), Some(prev2)) = (prev1, prev2) else {
        return 0.0;
    };
    if prev2 <= 0.0 || current < 0.0 {
        return 0.0;
    }
    ((current / prev2).powf(1.0 / years as f64) - 1.0) * 100.0
}
