use crate::error::{ReportError, Result};
use crate::schema::{ColumnHeader, Dataset, LineRow, PeriodKind};
use crate::utils::{parse_month, parse_number, parse_quarter};
use log::{debug, warn};

/// Header layout of the source grids: row 0 = year, row 1 = month name,
/// row 2 = Actual/Budget type, one triple per value column.
pub const HEADER_ROWS: usize = 3;

/// Data rows lead with label, material, process and product group before
/// the first value column.
pub const DATA_OFFSET: usize = 4;

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Builds a typed dataset from a raw spreadsheet-shaped grid.
///
/// Header strings are trimmed exactly once here; every later comparison in
/// the engine is exact. A value column whose header does not parse is
/// skipped with a warning rather than failing the whole grid, so one bad
/// column cannot take the dashboard down. Structural problems (missing
/// header rows, no usable columns at all) are errors.
pub fn dataset_from_grid(grid: &[Vec<String>]) -> Result<Dataset> {
    if grid.len() < HEADER_ROWS {
        return Err(ReportError::MissingHeaderRows(grid.len()));
    }

    let year_row = &grid[0];
    let month_row = &grid[1];
    let type_row = &grid[2];

    let width = year_row
        .len()
        .max(month_row.len())
        .max(type_row.len());

    let mut columns = Vec::new();
    let mut kept_indices = Vec::new();

    for idx in DATA_OFFSET..width {
        let year_text = cell(year_row, idx).trim();
        let month_text = cell(month_row, idx).trim();
        let type_text = cell(type_row, idx).trim();

        if year_text.is_empty() && month_text.is_empty() && type_text.is_empty() {
            continue;
        }

        let year = match year_text.parse::<i32>() {
            Ok(y) => y,
            Err(_) => {
                warn!("Column {}: unparseable year header '{}', skipped", idx, year_text);
                continue;
            }
        };

        // Source columns are always single months; quarters exist only as
        // query spans.
        if parse_quarter(month_text).is_some() {
            warn!(
                "Column {}: quarter code '{}' in month header row, skipped",
                idx, month_text
            );
            continue;
        }

        let month = match parse_month(month_text) {
            Some(m) => m,
            None => {
                warn!("Column {}: unparseable month header '{}', skipped", idx, month_text);
                continue;
            }
        };

        let kind = match PeriodKind::parse(type_text) {
            Some(k) => k,
            None => {
                warn!("Column {}: unparseable type header '{}', skipped", idx, type_text);
                continue;
            }
        };

        columns.push(ColumnHeader { year, month, kind });
        kept_indices.push(idx);
    }

    if columns.is_empty() {
        return Err(ReportError::NoPeriodColumns);
    }

    let mut rows = Vec::new();
    for (row_number, raw) in grid.iter().enumerate().skip(HEADER_ROWS) {
        let label = cell(raw, 0).trim().to_string();
        let material = cell(raw, 1).trim().to_string();
        let process = cell(raw, 2).trim().to_string();
        let product_group = cell(raw, 3).trim().to_string();

        let values: Vec<Option<f64>> = kept_indices
            .iter()
            .map(|&idx| {
                let text = cell(raw, idx);
                let parsed = parse_number(text);
                if parsed.is_none() && !text.trim().is_empty() {
                    debug!(
                        "Row {} column {}: non-numeric cell '{}' treated as missing",
                        row_number, idx, text
                    );
                }
                parsed
            })
            .collect();

        if label.is_empty() && values.iter().all(Option::is_none) {
            debug!("Row {}: blank, skipped", row_number);
            continue;
        }

        rows.push(LineRow {
            label,
            material,
            process,
            product_group,
            values,
        });
    }

    debug!(
        "Ingested grid: {} value columns, {} data rows",
        columns.len(),
        rows.len()
    );

    Ok(Dataset { columns, rows })
}
