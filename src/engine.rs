use crate::kpi::derived_ratio;
use crate::line_items::{LineItem, RowFormula};
use crate::schema::{
    CategoryKind, Dataset, LineRow, MetricKind, Period, SERVICES_CHARGES_GROUP,
};
use log::debug;

/// The period metric engine: resolves (line item, period) pairs against a
/// read-only dataset and aggregates category subsets.
///
/// Every operation is a pure function of the dataset and its arguments.
/// Missing data never errors; the public accessors degrade to 0 while the
/// `_opt` variants preserve the "no data at all" case for callers that
/// want to distinguish it from a true zero.
pub struct MetricEngine<'a> {
    dataset: &'a Dataset,
}

impl<'a> MetricEngine<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Indices of dataset columns matching the period: same year, same
    /// Actual/Budget axis, month inside the period's month set.
    fn matching_columns(&self, period: &Period) -> Vec<usize> {
        let Some(span) = period.span() else {
            return Vec::new();
        };
        let months = span.month_set();

        self.dataset
            .columns
            .iter()
            .enumerate()
            .filter(|(_, header)| {
                header.year == period.year
                    && header.kind == period.kind
                    && months.contains(&header.month)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Sums one row across the given columns. `Some` only if at least one
    /// matching cell held a numeric value.
    fn sum_row_cells(&self, row: &LineRow, cols: &[usize]) -> Option<f64> {
        let mut seen = false;
        let mut sum = 0.0;
        for &col in cols {
            if let Some(value) = row.values.get(col).copied().flatten() {
                seen = true;
                sum += value;
            }
        }
        seen.then_some(sum)
    }

    /// Positional row lookup, `None` when no column matches or the row
    /// holds no data for the period.
    pub fn row_value_opt(&self, row_index: usize, period: &Period) -> Option<f64> {
        let cols = self.matching_columns(period);
        if cols.is_empty() {
            return None;
        }
        let row = self.dataset.rows.get(row_index)?;
        self.sum_row_cells(row, &cols)
    }

    /// Positional row lookup with the silent-zero boundary applied.
    pub fn row_value(&self, row_index: usize, period: &Period) -> f64 {
        self.row_value_opt(row_index, period).unwrap_or(0.0)
    }

    /// Resolves a line item for a period. Direct items sum their dataset
    /// row's matching columns; calculated items evaluate their signed
    /// combination against the same period.
    pub fn cell_value_opt(&self, item: LineItem, period: &Period) -> Option<f64> {
        match &item.definition().formula {
            RowFormula::Direct { row } => self.row_value_opt(*row, period),
            RowFormula::Combine(terms) => {
                let mut seen = false;
                let mut sum = 0.0;
                for (dep, sign) in terms {
                    if let Some(value) = self.cell_value_opt(*dep, period) {
                        seen = true;
                        sum += sign.factor() * value;
                    }
                }
                seen.then_some(sum)
            }
        }
    }

    pub fn cell_value(&self, item: LineItem, period: &Period) -> f64 {
        self.cell_value_opt(item, period).unwrap_or(0.0)
    }

    /// Grand total of a metric for a period across all rows, honoring the
    /// Services Charges exclusion for weight-based metrics.
    pub fn metric_total(&self, metric: MetricKind, period: &Period) -> f64 {
        self.total_inner(metric, None, period)
    }

    /// Total of a metric over the rows whose classification column matches
    /// `category_name`. Matching is exact after trimming; weight-based
    /// metrics skip the Services Charges product group.
    pub fn category_total(
        &self,
        metric: MetricKind,
        category_name: &str,
        category_kind: CategoryKind,
        period: &Period,
    ) -> f64 {
        self.total_inner(metric, Some((category_name, category_kind)), period)
    }

    fn total_inner(
        &self,
        metric: MetricKind,
        category: Option<(&str, CategoryKind)>,
        period: &Period,
    ) -> f64 {
        let cols = self.matching_columns(period);
        if cols.is_empty() {
            debug!("No columns match period {}", period.key());
            return 0.0;
        }

        let exclude_services = metric.is_weight_based();

        if metric.is_derived() {
            let kgs = self.filtered_sum(MetricKind::Kgs.label(), category, exclude_services, &cols);
            let sales =
                self.filtered_sum(MetricKind::Sales.label(), category, exclude_services, &cols);
            let morm =
                self.filtered_sum(MetricKind::Morm.label(), category, exclude_services, &cols);
            derived_ratio(metric, kgs, sales, morm)
        } else {
            self.filtered_sum(metric.label(), category, exclude_services, &cols)
        }
    }

    fn filtered_sum(
        &self,
        label: &str,
        category: Option<(&str, CategoryKind)>,
        exclude_services: bool,
        cols: &[usize],
    ) -> f64 {
        self.dataset
            .rows
            .iter()
            .filter(|row| row.label == label)
            .filter(|row| !(exclude_services && row.product_group == SERVICES_CHARGES_GROUP))
            .filter(|row| match category {
                None => true,
                Some((name, kind)) => {
                    let field = match kind {
                        CategoryKind::Process => &row.process,
                        CategoryKind::Material => &row.material,
                    };
                    field == name.trim()
                }
            })
            .filter_map(|row| self.sum_row_cells(row, cols))
            .sum()
    }
}
