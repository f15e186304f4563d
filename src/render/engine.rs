//! The level-break render engine.
//!
//! Consumes ordered, already-joined data rows plus the analyzed column
//! layout; detects level breaks on the grouping columns, emits formatted
//! detail rows, and accumulates running totals per aggregation level.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::core::{Cell, DataRow, ReportError};
use crate::template::{Attribute, Level, PlanRow, ReportPlan};

use super::format::{FormatConfig, format_amount, format_date};

/// Kind of a rendered output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// A realized title or header row from the template.
    Prelude,
    /// A formatted data row.
    Detail,
    /// A level total.
    Total,
    /// An empty separator row.
    Blank,
}

/// One formatted output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    /// What the row is.
    pub kind: RowKind,
    /// The formatted cells.
    pub cells: Vec<String>,
}

/// A fully rendered report.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// All output rows, in order.
    pub rows: Vec<RenderedRow>,
    /// The computed General sums, one per amount column — available to the
    /// final consistency checkpoint even when the template declares no
    /// `{TOTAL_GENERAL}` row.
    pub general_totals: Vec<Decimal>,
    /// Number of detail rows.
    pub detail_count: usize,
}

impl Rendered {
    /// Flatten to delimited text, CRLF line endings, one line per row.
    pub fn to_csv(&self, delimiter: char) -> String {
        let sep = delimiter.to_string();
        let mut out = String::new();
        for row in &self.rows {
            out.push_str(&row.cells.join(&sep));
            out.push_str("\r\n");
        }
        out
    }

    /// The detail-row cells of one output column, in order.
    pub fn detail_cells(&self, column_index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|r| r.kind == RowKind::Detail)
            .map(|r| r.cells.get(column_index).map_or("", String::as_str))
            .collect()
    }
}

/// Render data rows through the plan's column layout.
///
/// Grouping columns print their label only when the value changes; totals
/// for a level are emitted when it breaks, provided more than one row
/// contributed, and only if the template declared that level's total. The
/// General total is always flushed at end of data. An undeclared total is
/// computed but silently dropped.
pub fn render(
    plan: &ReportPlan,
    cfg: &FormatConfig,
    data: &[DataRow],
) -> Result<Rendered, ReportError> {
    let mut engine = Engine::new(plan, cfg);
    for row in data {
        engine.feed(row)?;
    }
    engine.finish()
}

struct GroupState {
    /// Position of the grouping column in `plan.columns`.
    pos: usize,
    /// Output column index of the grouping column.
    out_index: usize,
    prev: Option<String>,
    /// Consecutive rows with an unchanged value; 0 after a break.
    same_value_count: u32,
}

struct Engine<'a> {
    plan: &'a ReportPlan,
    cfg: &'a FormatConfig,
    width: usize,
    /// Positions (into `plan.columns`) of the amount columns.
    amount_positions: Vec<usize>,
    /// Grouping-column state per level present in the template.
    groups: BTreeMap<Level, GroupState>,
    /// Running sums per level, one slot per amount column. Every level
    /// receives every row's amounts; each resets independently on its own
    /// break.
    sums: BTreeMap<Level, Vec<Decimal>>,
    rows: Vec<RenderedRow>,
    detail_count: usize,
}

impl<'a> Engine<'a> {
    fn new(plan: &'a ReportPlan, cfg: &'a FormatConfig) -> Self {
        let width = plan.row_width();
        let amount_positions = plan.amount_columns();

        let mut groups = BTreeMap::new();
        for (pos, spec) in plan.columns.iter().enumerate() {
            if let Some(level) = spec.var.level() {
                groups.entry(level).or_insert(GroupState {
                    pos,
                    out_index: spec.index,
                    prev: None,
                    same_value_count: 0,
                });
            }
        }

        let zero = vec![Decimal::ZERO; amount_positions.len()];
        let mut sums = BTreeMap::new();
        sums.insert(Level::General, zero.clone());
        for level in [Level::Maingroup, Level::Type] {
            if groups.contains_key(&level) {
                sums.insert(level, zero.clone());
            }
        }

        let mut engine = Self {
            plan,
            cfg,
            width,
            amount_positions,
            groups,
            sums,
            rows: Vec::new(),
            detail_count: 0,
        };
        for row in &plan.prelude {
            match row {
                PlanRow::Blank => engine.push_row(RowKind::Blank, Vec::new()),
                PlanRow::Text(cells) => engine.push_row(RowKind::Prelude, cells.clone()),
            }
        }
        engine
    }

    fn feed(&mut self, data: &DataRow) -> Result<(), ReportError> {
        if data.cells.len() != self.plan.columns.len() {
            return Err(ReportError::ColumnCountMismatch {
                template: self.plan.columns.len(),
                data: data.cells.len(),
            });
        }

        // Most significant level whose grouping value is about to change.
        // A break there implies a break at every less significant level.
        let mut breaking: Option<Level> = None;
        for (level, state) in self.groups.iter().rev() {
            let new = text_cell(data, state.pos)?;
            if state.prev.as_deref() != Some(new) {
                breaking = Some(*level);
                break;
            }
        }

        // Pending totals go out before any value changes, least significant
        // first; then every breaking level's sums restart at zero.
        if let Some(brk) = breaking {
            let pending: Vec<Level> = self
                .sums
                .keys()
                .copied()
                .filter(|l| *l != Level::General && *l <= brk)
                .collect();
            for level in pending {
                if self.groups[&level].same_value_count > 0 {
                    self.emit_total(level);
                }
            }
            for (level, sums) in self.sums.iter_mut() {
                if *level <= brk {
                    sums.fill(Decimal::ZERO);
                }
            }
        }

        let mut cells = vec![String::new(); self.width];

        for (level, state) in self.groups.iter_mut() {
            let value = text_cell(data, state.pos)?.to_string();
            let broke = breaking.is_some_and(|b| *level <= b);
            if broke {
                cells[state.out_index] = value.clone();
                state.same_value_count = 0;
                state.prev = Some(value);
            } else {
                state.same_value_count += 1;
            }
        }

        let mut slot = 0usize;
        for (pos, spec) in self.plan.columns.iter().enumerate() {
            match spec.attribute {
                Attribute::BookingType | Attribute::Maingroup | Attribute::Subgroup => {}
                Attribute::Date => {
                    cells[spec.index] = format_date(date_cell(data, pos)?);
                }
                Attribute::Amount | Attribute::Revenue | Attribute::Cost => {
                    let v = amount_cell(data, pos)?;
                    cells[spec.index] = format_amount(v, self.cfg);
                    for sums in self.sums.values_mut() {
                        sums[slot] += v;
                    }
                    slot += 1;
                }
                Attribute::Description
                | Attribute::BookingDescription
                | Attribute::BookingCode => {
                    cells[spec.index] = text_cell(data, pos)?.to_string();
                }
            }
        }

        self.push_row(RowKind::Detail, cells);
        self.detail_count += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<Rendered, ReportError> {
        if self.detail_count > 0 {
            let levels: Vec<Level> = self.sums.keys().copied().collect();
            for level in levels {
                if level != Level::General && self.groups[&level].same_value_count > 0 {
                    self.emit_total(level);
                }
            }
            // End of data forces the final General flush. No reset follows.
            self.emit_total(Level::General);
        }

        let general_totals = self.sums.remove(&Level::General).unwrap_or_default();
        Ok(Rendered {
            rows: self.rows,
            general_totals,
            detail_count: self.detail_count,
        })
    }

    /// Emit one total row for `level` — if the template declared it.
    /// Undeclared totals are computed but silently dropped.
    fn emit_total(&mut self, level: Level) {
        let Some(decl) = self.plan.totals.get(&level) else {
            return;
        };
        let (label, label_index) = match level {
            Level::General => ("Totaal Generaal".to_string(), 0),
            _ => {
                let state = &self.groups[&level];
                (
                    format!("Totaal {}", state.prev.clone().unwrap_or_default()),
                    state.out_index,
                )
            }
        };
        let mut cells = vec![String::new(); self.width];
        cells[label_index] = label;
        for (slot, &pos) in self.amount_positions.iter().enumerate() {
            let out_index = self.plan.columns[pos].index;
            cells[out_index] = format_amount(self.sums[&level][slot], self.cfg);
        }
        if decl.blanks_before > 0 {
            self.push_row(RowKind::Blank, Vec::new());
        }
        self.push_row(RowKind::Total, cells);
    }

    fn push_row(&mut self, kind: RowKind, cells: Vec<String>) {
        // Never two blank rows in a row.
        if kind == RowKind::Blank
            && self.rows.last().is_some_and(|r| r.kind == RowKind::Blank)
        {
            return;
        }
        self.rows.push(RenderedRow { kind, cells });
    }
}

fn text_cell(data: &DataRow, pos: usize) -> Result<&str, ReportError> {
    match data.cells.get(pos) {
        Some(Cell::Text(s)) => Ok(s),
        other => Err(ReportError::Internal(format!(
            "expected a text cell at position {pos}, got {other:?}"
        ))),
    }
}

fn amount_cell(data: &DataRow, pos: usize) -> Result<Decimal, ReportError> {
    match data.cells.get(pos) {
        Some(Cell::Amount(d)) => Ok(*d),
        other => Err(ReportError::Internal(format!(
            "expected an amount cell at position {pos}, got {other:?}"
        ))),
    }
}

fn date_cell(data: &DataRow, pos: usize) -> Result<NaiveDate, ReportError> {
    match data.cells.get(pos) {
        Some(Cell::Date(d)) => Ok(*d),
        other => Err(ReportError::Internal(format!(
            "expected a date cell at position {pos}, got {other:?}"
        ))),
    }
}
