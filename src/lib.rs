//! # Period Metrics
//!
//! A library for computing period-aware sales and margin KPIs from
//! spreadsheet-shaped reporting data.
//!
//! ## Core Concepts
//!
//! - **Dataset**: a grid ingested from the reporting workbook — three
//!   header rows (year / month / Actual-or-Budget) over line-item rows
//! - **Period**: a reporting column selector (year + month, quarter,
//!   full year, or a custom month range + the Actual/Budget axis)
//! - **Line Items**: the statically-defined report rows; calculated items
//!   (Margin over Material, Net Profit, EBITDA) are fixed combinations of
//!   direct rows
//! - **Category Totals**: per-process or per-material aggregates, with the
//!   Services Charges product group excluded from weight-based metrics
//! - **Silent zero**: missing data never fails a report — lookups degrade
//!   to 0 at the public boundary, while `_opt` accessors preserve the
//!   distinction for tests and data-quality tooling
//!
//! ## Example
//!
//! ```rust,ignore
//! use period_metrics::*;
//!
//! let dataset = dataset_from_grid(&grid)?;
//! let config = ReportConfig::new(
//!     "Q1 Actual vs Budget",
//!     vec![
//!         Period::quarter(2025, 1, PeriodKind::Actual),
//!         Period::quarter(2025, 1, PeriodKind::Budget),
//!     ],
//! );
//!
//! let table = generate_report(&dataset, &config, &LineItem::all())?;
//! println!("{}", table.to_markdown());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod kpi;
pub mod line_items;
pub mod reconcile;
pub mod report;
pub mod schema;
pub mod utils;

pub use config::ReportConfig;
pub use engine::MetricEngine;
pub use error::{ReportError, Result};
pub use ingestion::{dataset_from_grid, DATA_OFFSET, HEADER_ROWS};
pub use kpi::{cagr, derived_ratio, period_delta, Delta, Direction};
pub use line_items::{LineItem, LineItemDef, RowFormula, Sign};
pub use reconcile::{partition_report, verify_partition, PartitionChecker, PartitionReport};
pub use report::{
    build_category_breakdown, build_report_table, line_item_series, CategoryBreakdown,
    CategoryRow, ChartSeries, ReportRow, ReportTable,
};
pub use schema::*;

use log::{debug, info};

pub struct ReportGenerator;

impl ReportGenerator {
    /// Validates the comparison set and builds the main report table.
    pub fn generate(
        dataset: &Dataset,
        config: &ReportConfig,
        items: &[LineItem],
    ) -> Result<ReportTable> {
        config.validate()?;

        info!("Generating report '{}'", config.name);
        debug!(
            "Comparison set has {} periods over {} value columns and {} rows",
            config.periods.len(),
            dataset.columns.len(),
            dataset.rows.len()
        );

        Ok(report::build_report_table(dataset, config, items))
    }

    /// Like [`generate`](Self::generate), but first checks that the given
    /// category list reconciles to the grand total for every period in
    /// the comparison set.
    pub fn generate_with_reconciliation(
        dataset: &Dataset,
        config: &ReportConfig,
        items: &[LineItem],
        metric: MetricKind,
        category_kind: CategoryKind,
        categories: &[String],
        tolerance: f64,
    ) -> Result<ReportTable> {
        config.validate()?;

        let checker = PartitionChecker::new(dataset);
        for period in &config.periods {
            checker.verify_partition(metric, category_kind, categories, period, tolerance)?;
        }

        Self::generate(dataset, config, items)
    }
}

pub fn generate_report(
    dataset: &Dataset,
    config: &ReportConfig,
    items: &[LineItem],
) -> Result<ReportTable> {
    ReportGenerator::generate(dataset, config, items)
}
