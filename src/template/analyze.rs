//! Template analysis: one pass over validated rows, classifying each into
//! a title, header, column-definition, or total row and producing the
//! render plan.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::core::{ReportError, SyntaxError};
use crate::render::{FormatConfig, format_balance};

use super::token::{Attribute, CellToken, Level, PluralVar, SingularVar};

/// Per-export substitution state for singular variables and inline `{YEAR}`.
#[derive(Debug, Clone)]
pub struct HeaderContext {
    /// The report year.
    pub year: i32,
    /// Label of the rendered window (month name, "Q1".."Q4", "S1"/"S2").
    pub month_label: Option<String>,
    /// First month of the window.
    pub month_from: Option<u32>,
    /// Last month of the window.
    pub month_to: Option<u32>,
    /// Balance at the start of the window.
    pub opening_balance: Option<Decimal>,
    /// Balance at the end of the window.
    pub closing_balance: Option<Decimal>,
    /// Sum of positive amounts in the window.
    pub total_revenues: Option<Decimal>,
    /// Sum of negative amounts in the window.
    pub total_costs: Option<Decimal>,
}

impl HeaderContext {
    /// Context for a yearly report: only the year and previous year substitute.
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            month_label: None,
            month_from: None,
            month_to: None,
            opening_balance: None,
            closing_balance: None,
            total_revenues: None,
            total_costs: None,
        }
    }

    fn value(&self, var: SingularVar, cfg: &FormatConfig) -> String {
        let balance = |v: Option<Decimal>| v.map(|d| format_balance(d, cfg)).unwrap_or_default();
        match var {
            SingularVar::Year => self.year.to_string(),
            SingularVar::YearPrevious => (self.year - 1).to_string(),
            SingularVar::Month => self.month_label.clone().unwrap_or_default(),
            SingularVar::MonthFrom => self.month_from.map(|m| m.to_string()).unwrap_or_default(),
            SingularVar::MonthTo => self.month_to.map(|m| m.to_string()).unwrap_or_default(),
            SingularVar::OpeningBalance => balance(self.opening_balance),
            SingularVar::ClosingBalance => balance(self.closing_balance),
            SingularVar::TotalRevenues => balance(self.total_revenues),
            SingularVar::TotalCosts => balance(self.total_costs),
        }
    }
}

/// A realized row of the render plan, emitted ahead of the data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanRow {
    /// An empty separator row.
    Blank,
    /// A title or header row, fully substituted.
    Text(Vec<String>),
}

/// A declared total row for one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TotalDecl {
    /// Blank template rows immediately before the marker; reproduced as one
    /// separator row ahead of the rendered total.
    pub blanks_before: usize,
}

/// One output column bound to a plural variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// The declaring variable.
    pub var: PluralVar,
    /// The data-model attribute it binds to.
    pub attribute: Attribute,
    /// 0-based output column index (the cell position in the template row).
    pub index: usize,
}

/// The analyzed template: prelude rows, column layout, and declared totals.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    /// Title, header, and blank rows, realized once per export.
    pub prelude: Vec<PlanRow>,
    /// Column layout, one entry per plural variable cell.
    pub columns: Vec<ColumnSpec>,
    /// Levels whose total rows the template declares.
    pub totals: BTreeMap<Level, TotalDecl>,
}

impl ReportPlan {
    /// Width of a rendered data row.
    pub fn row_width(&self) -> usize {
        self.columns.iter().map(|c| c.index + 1).max().unwrap_or(0)
    }

    /// Positions (into `columns`) of the amount-carrying columns, in order.
    pub fn amount_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.attribute.is_amount())
            .map(|(i, _)| i)
            .collect()
    }

    /// Fail if the plan binds an attribute the calling report cannot supply.
    pub fn ensure_supported(&self, supported: &[Attribute]) -> Result<(), ReportError> {
        for spec in &self.columns {
            if !supported.contains(&spec.attribute) {
                return Err(ReportError::UnsupportedVariable {
                    variable: spec.var.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Drop trailing amount columns so only `keep` remain.
    ///
    /// This is the §4.5 coulance: when the merged data is narrower than the
    /// template declares, the data width is authoritative and the template's
    /// surplus amount columns are silently dropped. Callers record a warning.
    pub fn truncate_amount_columns(&mut self, keep: usize) {
        let mut seen = 0usize;
        self.columns.retain(|c| {
            if !c.attribute.is_amount() {
                return true;
            }
            seen += 1;
            seen <= keep
        });
    }
}

/// Walk the validated template once and build the render plan.
///
/// Classification is by the homogeneous kind of a row's non-blank cells:
/// all-literal rows become titles, all-singular rows become headers realized
/// from `ctx`, the all-plural row declares the column layout, and all-total
/// rows record which total levels the template wants. Mixing singular and
/// plural variables in one row is fatal.
pub fn analyze(
    template: &super::Template,
    ctx: &HeaderContext,
    cfg: &FormatConfig,
) -> Result<ReportPlan, ReportError> {
    let mut prelude: Vec<PlanRow> = Vec::new();
    let mut columns: Vec<ColumnSpec> = Vec::new();
    let mut totals: BTreeMap<Level, TotalDecl> = BTreeMap::new();
    let mut errors: Vec<SyntaxError> = Vec::new();
    let mut pending_blanks = 0usize;

    for (r, row) in template.rows().iter().enumerate() {
        let shape = RowShape::of(row);

        if shape.is_blank() {
            if columns.is_empty() {
                // Titles region: pass the blank through, collapsing runs.
                if !matches!(prelude.last(), Some(PlanRow::Blank)) {
                    prelude.push(PlanRow::Blank);
                }
            } else {
                // Below the column row blanks attach to the next total marker.
                pending_blanks += 1;
            }
            continue;
        }

        if shape.plural > 0 && shape.singular > 0 {
            return Err(ReportError::MixedVariableRow { row: r + 1 });
        }

        if shape.total > 0 {
            if shape.literal + shape.singular + shape.plural > 0 {
                errors.push(SyntaxError::new(
                    r + 1,
                    1,
                    "a total row may only contain total markers",
                ));
                continue;
            }
            for cell in row {
                if let CellToken::Total(level) = cell {
                    totals.entry(*level).or_insert(TotalDecl {
                        blanks_before: pending_blanks,
                    });
                }
            }
            pending_blanks = 0;
            continue;
        }

        if shape.plural > 0 {
            if shape.literal > 0 {
                errors.push(SyntaxError::new(
                    r + 1,
                    1,
                    "literal cells are not allowed in a column definition row",
                ));
                continue;
            }
            if !columns.is_empty() {
                errors.push(SyntaxError::new(
                    r + 1,
                    1,
                    "duplicate column definition row",
                ));
                continue;
            }
            for (c, cell) in row.iter().enumerate() {
                if let CellToken::Plural(var) = cell {
                    columns.push(ColumnSpec {
                        var: *var,
                        attribute: var.attribute(),
                        index: c,
                    });
                }
            }
            continue;
        }

        // Title row (all literal) or header row (singulars, possibly with
        // literal labels next to them) — realized once per export.
        let cells = row
            .iter()
            .map(|cell| realize_cell(cell, ctx, cfg))
            .collect();
        prelude.push(PlanRow::Text(cells));
    }

    if columns.is_empty() {
        errors.push(SyntaxError::new(
            template.rows().len(),
            1,
            "template declares no column definition row",
        ));
    }

    if errors.is_empty() {
        Ok(ReportPlan {
            prelude,
            columns,
            totals,
        })
    } else {
        Err(ReportError::TemplateSyntax(errors))
    }
}

fn realize_cell(cell: &CellToken, ctx: &HeaderContext, cfg: &FormatConfig) -> String {
    match cell {
        CellToken::Blank => String::new(),
        CellToken::Literal { text, inline } => {
            let mut out = text.clone();
            // Only YEAR substitutes inline; other placeholders validate but
            // pass through verbatim.
            if inline.contains(&SingularVar::Year) {
                out = out.replace("{YEAR}", &ctx.year.to_string());
            }
            out
        }
        CellToken::Singular(var) => ctx.value(*var, cfg),
        // Unreachable in the title/header branch; render nothing.
        CellToken::Plural(_) | CellToken::Total(_) => String::new(),
    }
}

#[derive(Debug, Default)]
struct RowShape {
    literal: usize,
    singular: usize,
    plural: usize,
    total: usize,
}

impl RowShape {
    fn of(row: &[CellToken]) -> Self {
        let mut shape = Self::default();
        for cell in row {
            match cell {
                CellToken::Blank => {}
                CellToken::Literal { .. } => shape.literal += 1,
                CellToken::Singular(_) => shape.singular += 1,
                CellToken::Plural(_) => shape.plural += 1,
                CellToken::Total(_) => shape.total += 1,
            }
        }
        shape
    }

    fn is_blank(&self) -> bool {
        self.literal + self.singular + self.plural + self.total == 0
    }
}
