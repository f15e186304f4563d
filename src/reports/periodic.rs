//! Periodic account report: running balance over month, quarter, and
//! semester windows.
//!
//! One walker instance covers one year. Each kind of window (month, quarter,
//! semester) keeps its own running balance seeded from the year opening
//! balance; windows the caller never asks for are still computed so that
//! later windows open on the correct balance. Export calls must therefore
//! arrive in calendar order.

use chrono::Datelike;
use rust_decimal::Decimal;

use crate::core::{Cell, DataRow, Messages, ReportError, Transaction, reconcile};
use crate::render::{FormatConfig, Rendered, month_name, parse_amount, render};
use crate::template::{Attribute, HeaderContext, Template, analyze};

const SUPPORTED: &[Attribute] = &[
    Attribute::Date,
    Attribute::Description,
    Attribute::Revenue,
    Attribute::Cost,
];

/// The three window kinds, each walked independently across the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpanKind {
    Month,
    Quarter,
    Semester,
}

impl SpanKind {
    fn months(self) -> u32 {
        match self {
            Self::Month => 1,
            Self::Quarter => 3,
            Self::Semester => 6,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Month => 0,
            Self::Quarter => 1,
            Self::Semester => 2,
        }
    }

    /// Window-span arithmetic: 1 month is a month, 3 a quarter, 6 a
    /// semester; anything else (or a misaligned start) is an internal error.
    fn classify(month_from: u32, month_to: u32) -> Result<Self, ReportError> {
        if !(1..=12).contains(&month_from) || !(1..=12).contains(&month_to) {
            return Err(ReportError::Internal(format!(
                "months {month_from}..{month_to} out of range"
            )));
        }
        match month_to.checked_sub(month_from).map(|d| d + 1) {
            Some(1) => Ok(Self::Month),
            Some(3) if month_from % 3 == 1 => Ok(Self::Quarter),
            Some(6) if month_from == 1 || month_from == 7 => Ok(Self::Semester),
            _ => Err(ReportError::Internal(format!(
                "window {month_from}..{month_to} is neither a month, a quarter nor a semester"
            ))),
        }
    }

    fn label(self, month_from: u32) -> String {
        match self {
            Self::Month => month_name(month_from).to_string(),
            Self::Quarter => format!("Q{}", (month_from - 1) / 3 + 1),
            Self::Semester => format!("S{}", (month_from - 1) / 6 + 1),
        }
    }
}

/// Outcome of one window export.
#[derive(Debug, Clone)]
pub struct WindowReport {
    /// The rendered window, or `None` when the window had no transactions
    /// (a warning is recorded and the balance still advances).
    pub rendered: Option<Rendered>,
    /// Balance at the start of the window.
    pub opening_balance: Decimal,
    /// Balance at the end of the window.
    pub closing_balance: Decimal,
    /// Sum of positive amounts in the window.
    pub revenues: Decimal,
    /// Sum of negative amounts in the window.
    pub costs: Decimal,
}

/// Walks one year of transactions across month/quarter/semester windows.
pub struct PeriodicWalker<'a> {
    year: i32,
    transactions: &'a [Transaction],
    /// Running balance per window kind.
    balances: [Decimal; 3],
    /// Next unprocessed month per window kind, 1-based.
    positions: [u32; 3],
}

impl<'a> PeriodicWalker<'a> {
    /// Create a walker for one year. The opening balance seeds all three
    /// window kinds; `transactions` may be in any order and may include
    /// other years (they are filtered per window).
    pub fn new(year: i32, opening_balance: Decimal, transactions: &'a [Transaction]) -> Self {
        Self {
            year,
            transactions,
            balances: [opening_balance; 3],
            positions: [1; 3],
        }
    }

    /// The running balance months have advanced to so far.
    pub fn month_balance(&self) -> Decimal {
        self.balances[SpanKind::Month.index()]
    }

    /// Export one window.
    ///
    /// Windows of the same kind must be requested in calendar order; windows
    /// of that kind lying before the requested one are computed silently so
    /// the balance accumulates across the whole year.
    pub fn render_window(
        &mut self,
        template: &Template,
        month_from: u32,
        month_to: u32,
        cfg: &FormatConfig,
        messages: &mut Messages,
    ) -> Result<WindowReport, ReportError> {
        let kind = SpanKind::classify(month_from, month_to)?;
        let idx = kind.index();
        let span = kind.months();

        if month_from < self.positions[idx] {
            return Err(ReportError::Internal(format!(
                "window {month_from}..{month_to} requested out of calendar order"
            )));
        }

        // Advance over the unrequested windows in between.
        while self.positions[idx] < month_from {
            let from = self.positions[idx];
            let flow: Decimal = self
                .window_transactions(from, from + span - 1)
                .iter()
                .map(|t| t.amount)
                .sum();
            self.balances[idx] += flow;
            self.positions[idx] += span;
        }

        let opening_balance = self.balances[idx];
        let mut window: Vec<&Transaction> = self.window_transactions(month_from, month_to);
        window.sort_by_key(|t| t.date);

        let revenues: Decimal = window
            .iter()
            .filter(|t| t.amount >= Decimal::ZERO)
            .map(|t| t.amount)
            .sum();
        let costs: Decimal = window
            .iter()
            .filter(|t| t.amount < Decimal::ZERO)
            .map(|t| t.amount)
            .sum();
        let signed_total: Decimal = window.iter().map(|t| t.amount).sum();
        let closing_balance = opening_balance + revenues + costs;

        self.balances[idx] = closing_balance;
        self.positions[idx] = month_to + 1;

        let label = kind.label(month_from);
        if window.is_empty() {
            messages.warning(format!(
                "no transactions for {label} {}; window skipped",
                self.year
            ));
            return Ok(WindowReport {
                rendered: None,
                opening_balance,
                closing_balance,
                revenues,
                costs,
            });
        }

        // First check: splitting the signed amounts must lose nothing.
        reconcile("splitsing kosten/ontvangsten", signed_total, costs + revenues)?;

        let ctx = HeaderContext {
            year: self.year,
            month_label: Some(label.clone()),
            month_from: Some(month_from),
            month_to: Some(month_to),
            opening_balance: Some(opening_balance),
            closing_balance: Some(closing_balance),
            total_revenues: Some(revenues),
            total_costs: Some(costs),
        };
        let plan = analyze(template, &ctx, cfg)?;
        plan.ensure_supported(SUPPORTED)?;

        let data: Vec<DataRow> = window
            .iter()
            .map(|t| transaction_data_row(&plan.columns, t))
            .collect();
        let rendered = render(&plan, cfg, &data)?;

        // Second check: re-parse the rendered cost/revenue cells. The locale
        // formatting (comma, zero-suppression) must round-trip the total.
        let mut reparsed = Decimal::ZERO;
        for &pos in &plan.amount_columns() {
            let out_index = plan.columns[pos].index;
            for cell in rendered.detail_cells(out_index) {
                reparsed += parse_amount(cell, cfg)?;
            }
        }
        reconcile("formattering", signed_total, reparsed)?;

        messages.info(format!(
            "periodic account {label} {}: {} transactions, closing balance {}",
            self.year,
            rendered.detail_count,
            closing_balance.round_dp(2)
        ));
        Ok(WindowReport {
            rendered: Some(rendered),
            opening_balance,
            closing_balance,
            revenues,
            costs,
        })
    }

    fn window_transactions(&self, month_from: u32, month_to: u32) -> Vec<&'a Transaction> {
        self.transactions
            .iter()
            .filter(|t| {
                t.date.year() == self.year
                    && (month_from..=month_to).contains(&t.date.month())
            })
            .collect()
    }
}

fn transaction_data_row(
    columns: &[crate::template::ColumnSpec],
    t: &Transaction,
) -> DataRow {
    let cells = columns
        .iter()
        .map(|spec| match spec.attribute {
            Attribute::Date => Cell::Date(t.date),
            Attribute::Description => Cell::Text(t.description.clone()),
            Attribute::Revenue => Cell::Amount(if t.amount >= Decimal::ZERO {
                t.amount
            } else {
                Decimal::ZERO
            }),
            Attribute::Cost => Cell::Amount(if t.amount < Decimal::ZERO {
                t.amount
            } else {
                Decimal::ZERO
            }),
            // Ruled out by ensure_supported.
            _ => Cell::Text(String::new()),
        })
        .collect();
    DataRow::new(cells)
}
