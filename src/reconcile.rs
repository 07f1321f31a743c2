use crate::engine::MetricEngine;
use crate::error::{ReportError, Result};
use crate::schema::{CategoryKind, Dataset, MetricKind, Period};
use log::warn;
use serde::{Deserialize, Serialize};

/// Best-effort check that a complete, non-overlapping category list adds
/// up to the grand total for a metric and period. The source dashboard
/// never enforced this; here it is available to tests and data-quality
/// tooling without changing engine behavior.
pub struct PartitionChecker<'a> {
    dataset: &'a Dataset,
}

/// Diagnostic breakdown of one partition check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionReport {
    pub metric: MetricKind,
    pub period: String,
    pub per_category: Vec<(String, f64)>,
    pub categorized: f64,
    pub grand_total: f64,
    pub residual: f64,
}

impl<'a> PartitionChecker<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Sums every category and compares against the grand total. The
    /// Services Charges exclusion for weight metrics applies to both
    /// sides, so a services-only category legitimately contributes 0.
    pub fn partition_report(
        &self,
        metric: MetricKind,
        category_kind: CategoryKind,
        categories: &[String],
        period: &Period,
    ) -> PartitionReport {
        let engine = MetricEngine::new(self.dataset);

        let per_category: Vec<(String, f64)> = categories
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    engine.category_total(metric, name, category_kind, period),
                )
            })
            .collect();

        let categorized: f64 = per_category.iter().map(|(_, v)| v).sum();
        let grand_total = engine.metric_total(metric, period);

        PartitionReport {
            metric,
            period: period.key(),
            per_category,
            categorized,
            grand_total,
            residual: grand_total - categorized,
        }
    }

    /// Errors when the categorized sum misses the grand total by more
    /// than `tolerance`. Derived metrics are skipped: ratios do not sum
    /// across categories.
    pub fn verify_partition(
        &self,
        metric: MetricKind,
        category_kind: CategoryKind,
        categories: &[String],
        period: &Period,
        tolerance: f64,
    ) -> Result<()> {
        if metric.is_derived() {
            warn!(
                "Partition check for {} skipped: only base metrics partition",
                metric
            );
            return Ok(());
        }

        let report = self.partition_report(metric, category_kind, categories, period);
        let difference = report.residual.abs();

        if difference > tolerance {
            return Err(ReportError::PartitionMismatch {
                metric: metric.label().to_string(),
                period: report.period,
                categorized: report.categorized,
                grand_total: report.grand_total,
                difference,
            });
        }

        Ok(())
    }
}

pub fn verify_partition(
    dataset: &Dataset,
    metric: MetricKind,
    category_kind: CategoryKind,
    categories: &[String],
    period: &Period,
    tolerance: f64,
) -> Result<()> {
    PartitionChecker::new(dataset).verify_partition(metric, category_kind, categories, period, tolerance)
}

pub fn partition_report(
    dataset: &Dataset,
    metric: MetricKind,
    category_kind: CategoryKind,
    categories: &[String],
    period: &Period,
) -> PartitionReport {
    PartitionChecker::new(dataset).partition_report(metric, category_kind, categories, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnHeader, LineRow, PeriodKind};
    use chrono::Month;

    fn dataset() -> Dataset {
        let row = |label: &str, process: &str, group: &str, value: f64| LineRow {
            label: label.to_string(),
            material: String::new(),
            process: process.to_string(),
            product_group: group.to_string(),
            values: vec![Some(value)],
        };

        Dataset {
            columns: vec![ColumnHeader {
                year: 2025,
                month: Month::January,
                kind: PeriodKind::Actual,
            }],
            rows: vec![
                row("Sales", "Extrusion", "Films", 6000.0),
                row("Sales", "Lamination", "Pouches", 4000.0),
                row("Sales", "Tolling", "Services Charges", 900.0),
                row("KGS", "Extrusion", "Films", 600.0),
                row("KGS", "Lamination", "Pouches", 200.0),
                row("KGS", "Tolling", "Services Charges", 50.0),
            ],
        }
    }

    fn all_processes() -> Vec<String> {
        vec![
            "Extrusion".to_string(),
            "Lamination".to_string(),
            "Tolling".to_string(),
        ]
    }

    #[test]
    fn test_complete_partition_reconciles() {
        let dataset = dataset();
        let jan = Period::month(2025, "January", PeriodKind::Actual);

        let result = verify_partition(
            &dataset,
            MetricKind::Sales,
            CategoryKind::Process,
            &all_processes(),
            &jan,
            0.01,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_weight_metric_partitions_with_services_excluded_on_both_sides() {
        let dataset = dataset();
        let jan = Period::month(2025, "January", PeriodKind::Actual);

        // Tolling contributes 0 KGS on the category side, and the grand
        // total skips it too, so the partition still closes.
        let report = partition_report(
            &dataset,
            MetricKind::Kgs,
            CategoryKind::Process,
            &all_processes(),
            &jan,
        );
        assert_eq!(report.grand_total, 800.0);
        assert_eq!(report.categorized, 800.0);
        assert_eq!(report.residual, 0.0);
    }

    #[test]
    fn test_incomplete_partition_fails() {
        let dataset = dataset();
        let jan = Period::month(2025, "January", PeriodKind::Actual);

        let result = verify_partition(
            &dataset,
            MetricKind::Sales,
            CategoryKind::Process,
            &["Extrusion".to_string()],
            &jan,
            0.01,
        );
        assert!(matches!(
            result,
            Err(ReportError::PartitionMismatch { difference, .. }) if difference > 0.0
        ));
    }

    #[test]
    fn test_residual_reported() {
        let dataset = dataset();
        let jan = Period::month(2025, "January", PeriodKind::Actual);

        let report = partition_report(
            &dataset,
            MetricKind::Sales,
            CategoryKind::Process,
            &["Extrusion".to_string(), "Lamination".to_string()],
            &jan,
        );
        assert_eq!(report.grand_total, 10900.0);
        assert_eq!(report.categorized, 10000.0);
        assert_eq!(report.residual, 900.0);
    }

    #[test]
    fn test_derived_metric_skipped() {
        let dataset = dataset();
        let jan = Period::month(2025, "January", PeriodKind::Actual);

        let result = verify_partition(
            &dataset,
            MetricKind::SlsPerKg,
            CategoryKind::Process,
            &all_processes(),
            &jan,
            0.01,
        );
        assert!(result.is_ok());
    }
}
