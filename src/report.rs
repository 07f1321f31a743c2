use crate::config::ReportConfig;
use crate::engine::MetricEngine;
use crate::kpi::{period_delta, Delta};
use crate::line_items::LineItem;
use crate::schema::{CategoryKind, Dataset, MetricKind, Period};
use serde::{Deserialize, Serialize};

/// One line of a rendered report: the item's value per period plus its
/// movement vs. the previous period column (None for the first column).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub item: LineItem,
    pub label: String,
    pub values: Vec<f64>,
    pub deltas: Vec<Option<Delta>>,
}

/// The shaped main table a renderer consumes: period labels across,
/// line items down. Built once per call, no hidden state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTable {
    pub name: String,
    pub period_labels: Vec<String>,
    pub rows: Vec<ReportRow>,
}

pub fn build_report_table(
    dataset: &Dataset,
    config: &ReportConfig,
    items: &[LineItem],
) -> ReportTable {
    let engine = MetricEngine::new(dataset);
    let period_labels: Vec<String> = config.periods.iter().map(Period::display_label).collect();

    let rows = items
        .iter()
        .map(|&item| {
            let values: Vec<f64> = config
                .periods
                .iter()
                .map(|period| engine.cell_value(item, period))
                .collect();

            let deltas: Vec<Option<Delta>> = values
                .iter()
                .enumerate()
                .map(|(idx, &value)| {
                    (idx > 0).then(|| period_delta(value, values[idx - 1]))
                })
                .collect();

            ReportRow {
                item,
                label: item.label().to_string(),
                values,
                deltas,
            }
        })
        .collect();

    ReportTable {
        name: config.name.clone(),
        period_labels,
        rows,
    }
}

impl ReportTable {
    pub fn to_csv(&self) -> String {
        let mut output = String::new();
        output.push_str("Line Item");
        for label in &self.period_labels {
            output.push_str(&format!(",{}", label));
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&row.label);
            for value in &row.values {
                output.push_str(&format!(",{:.2}", value));
            }
            output.push('\n');
        }

        output
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {}\n\n", self.name));

        output.push_str("| Line Item |");
        for label in &self.period_labels {
            output.push_str(&format!(" {} |", label));
        }
        output.push('\n');

        output.push_str("|---|");
        for _ in &self.period_labels {
            output.push_str("---|");
        }
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!("| {} |", row.label));
            for (idx, value) in row.values.iter().enumerate() {
                match row.deltas[idx] {
                    Some(delta) => {
                        output.push_str(&format!(" {:.2} ({:+.1}%) |", value, delta.pct))
                    }
                    None => output.push_str(&format!(" {:.2} |", value)),
                }
            }
            output.push('\n');
        }

        output
    }
}

/// One category's values per period, with its share of the grand total.
/// `share_pct` is `None` for derived metrics, where a share of a ratio
/// has no meaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRow {
    pub name: String,
    pub values: Vec<f64>,
    pub share_pct: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub metric: MetricKind,
    pub category_kind: CategoryKind,
    pub period_labels: Vec<String>,
    pub categories: Vec<CategoryRow>,
}

pub fn build_category_breakdown(
    dataset: &Dataset,
    metric: MetricKind,
    category_kind: CategoryKind,
    categories: &[String],
    periods: &[Period],
) -> CategoryBreakdown {
    let engine = MetricEngine::new(dataset);
    let period_labels: Vec<String> = periods.iter().map(Period::display_label).collect();

    let totals: Vec<f64> = periods
        .iter()
        .map(|period| engine.metric_total(metric, period))
        .collect();

    let rows = categories
        .iter()
        .map(|name| {
            let values: Vec<f64> = periods
                .iter()
                .map(|period| engine.category_total(metric, name, category_kind, period))
                .collect();

            let share_pct = (!metric.is_derived()).then(|| {
                values
                    .iter()
                    .zip(&totals)
                    .map(|(&value, &total)| if total == 0.0 { 0.0 } else { value / total * 100.0 })
                    .collect()
            });

            CategoryRow {
                name: name.clone(),
                values,
                share_pct,
            }
        })
        .collect();

    CategoryBreakdown {
        metric,
        category_kind,
        period_labels,
        categories: rows,
    }
}

/// A named value series across an ordered period list, ready for a chart
/// consumer to pair with the returned labels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartSeries {
    pub name: String,
    pub points: Vec<f64>,
}

pub fn line_item_series(
    dataset: &Dataset,
    items: &[LineItem],
    periods: &[Period],
) -> (Vec<String>, Vec<ChartSeries>) {
    let engine = MetricEngine::new(dataset);
    let labels: Vec<String> = periods.iter().map(Period::display_label).collect();

    let series = items
        .iter()
        .map(|&item| ChartSeries {
            name: item.label().to_string(),
            points: periods
                .iter()
                .map(|period| engine.cell_value(item, period))
                .collect(),
        })
        .collect();

    (labels, series)
}
