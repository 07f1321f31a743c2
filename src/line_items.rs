use crate::error::{ReportError, Result};
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The statically-defined rows of the main report table. Direct items map
/// to a dataset row; calculated items are fixed linear combinations of
/// other items evaluated for the same period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum LineItem {
    SalesVolume,
    Sales,
    MaterialCost,
    DirectLabour,
    Overheads,
    SgaCost,
    ProfitAfterSga,
    FinanceCost,
    OtherIncome,
    Depreciation,
    MarginOverMaterial,
    GrossProfit,
    NetProfit,
    Ebitda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Plus,
    Minus,
}

impl Sign {
    pub fn factor(&self) -> f64 {
        match self {
            Self::Plus => 1.0,
            Self::Minus => -1.0,
        }
    }
}

/// How a line item's value is produced for a period.
#[derive(Debug, Clone, PartialEq)]
pub enum RowFormula {
    /// Positional lookup into the dataset rows.
    Direct { row: usize },
    /// Signed sum of other items' values for the same period. The registry
    /// is acyclic by construction.
    Combine(Vec<(LineItem, Sign)>),
}

#[derive(Debug, Clone)]
pub struct LineItemDef {
    pub item: LineItem,
    pub label: &'static str,
    pub formula: RowFormula,
}

static REGISTRY: Lazy<Vec<LineItemDef>> = Lazy::new(|| {
    use LineItem::*;
    use Sign::*;
    vec![
        LineItemDef {
            item: SalesVolume,
            label: "Sales Volume",
            formula: RowFormula::Direct { row: 0 },
        },
        LineItemDef {
            item: Sales,
            label: "Sales",
            formula: RowFormula::Direct { row: 1 },
        },
        LineItemDef {
            item: MaterialCost,
            label: "Material Cost",
            formula: RowFormula::Direct { row: 2 },
        },
        LineItemDef {
            item: DirectLabour,
            label: "Direct Labour",
            formula: RowFormula::Direct { row: 3 },
        },
        LineItemDef {
            item: Overheads,
            label: "Overheads",
            formula: RowFormula::Direct { row: 4 },
        },
        LineItemDef {
            item: SgaCost,
            label: "SG&A",
            formula: RowFormula::Direct { row: 5 },
        },
        LineItemDef {
            item: ProfitAfterSga,
            label: "Profit after SG&A",
            formula: RowFormula::Direct { row: 6 },
        },
        LineItemDef {
            item: FinanceCost,
            label: "Finance Cost",
            formula: RowFormula::Direct { row: 7 },
        },
        LineItemDef {
            item: OtherIncome,
            label: "Other Income",
            formula: RowFormula::Direct { row: 8 },
        },
        LineItemDef {
            item: Depreciation,
            label: "Depreciation",
            formula: RowFormula::Direct { row: 9 },
        },
        LineItemDef {
            item: MarginOverMaterial,
            label: "Margin over Material",
            formula: RowFormula::Combine(vec![(Sales, Plus), (MaterialCost, Minus)]),
        },
        LineItemDef {
            item: GrossProfit,
            label: "Gross Profit",
            formula: RowFormula::Combine(vec![
                (Sales, Plus),
                (MaterialCost, Minus),
                (DirectLabour, Minus),
                (Overheads, Minus),
            ]),
        },
        LineItemDef {
            item: NetProfit,
            label: "Net Profit",
            formula: RowFormula::Combine(vec![
                (ProfitAfterSga, Plus),
                (FinanceCost, Minus),
                (OtherIncome, Plus),
            ]),
        },
        LineItemDef {
            item: Ebitda,
            label: "EBITDA",
            formula: RowFormula::Combine(vec![
                (NetProfit, Plus),
                (FinanceCost, Plus),
                (Depreciation, Plus),
            ]),
        },
    ]
});

impl LineItem {
    pub fn all() -> Vec<LineItem> {
        REGISTRY.iter().map(|def| def.item).collect()
    }

    pub fn label(&self) -> &'static str {
        self.definition().label
    }

    pub fn definition(&self) -> &'static LineItemDef {
        REGISTRY
            .iter()
            .find(|def| def.item == *self)
            .expect("every LineItem variant is registered")
    }

    pub fn is_calculated(&self) -> bool {
        matches!(self.definition().formula, RowFormula::Combine(_))
    }

    /// The direct item defined at a dataset row index, if any.
    pub fn for_row(row: usize) -> Option<LineItem> {
        REGISTRY.iter().find_map(|def| match def.formula {
            RowFormula::Direct { row: r } if r == row => Some(def.item),
            _ => None,
        })
    }

    /// Looks an item up by its report label (trimmed exact match).
    pub fn by_label(label: &str) -> Result<LineItem> {
        let wanted = label.trim();
        REGISTRY
            .iter()
            .find(|def| def.label == wanted)
            .map(|def| def.item)
            .ok_or_else(|| ReportError::UnknownLineItem(wanted.to_string()))
    }
}

impl fmt::Display for LineItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_is_registered() {
        for item in LineItem::all() {
            // definition() panics if a variant is missing from the registry
            let def = item.definition();
            assert_eq!(def.item, item);
        }
        assert_eq!(LineItem::all().len(), 14);
    }

    #[test]
    fn test_direct_rows_are_unique() {
        let mut rows: Vec<usize> = LineItem::all()
            .into_iter()
            .filter_map(|item| match item.definition().formula {
                RowFormula::Direct { row } => Some(row),
                _ => None,
            })
            .collect();
        let before = rows.len();
        rows.sort_unstable();
        rows.dedup();
        assert_eq!(rows.len(), before, "two items share a dataset row");
    }

    #[test]
    fn test_for_row() {
        assert_eq!(LineItem::for_row(1), Some(LineItem::Sales));
        assert_eq!(LineItem::for_row(0), Some(LineItem::SalesVolume));
        assert_eq!(LineItem::for_row(99), None);
    }

    #[test]
    fn test_by_label() {
        assert_eq!(LineItem::by_label("Net Profit").unwrap(), LineItem::NetProfit);
        assert_eq!(LineItem::by_label("  EBITDA  ").unwrap(), LineItem::Ebitda);
        assert!(LineItem::by_label("Nonsense").is_err());
    }

    #[test]
    fn test_calculated_flags() {
        assert!(LineItem::NetProfit.is_calculated());
        assert!(LineItem::MarginOverMaterial.is_calculated());
        assert!(!LineItem::Sales.is_calculated());
    }

    #[test]
    fn test_combine_formulas_reference_registered_items() {
        for item in LineItem::all() {
            if let RowFormula::Combine(terms) = &item.definition().formula {
                for (dep, _) in terms {
                    assert_ne!(*dep, item, "{} references itself", item);
                    let _ = dep.definition();
                }
            }
        }
    }
}
