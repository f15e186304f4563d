//! Results-per-booking-code report: one condensed row per code.

use rust_decimal::Decimal;

use crate::core::{BookingCatalog, Cell, DataRow, Messages, ReportError, Transaction, reconcile};
use crate::render::{FormatConfig, Rendered, render};
use crate::template::{Attribute, HeaderContext, ReportPlan, Template, analyze};

const SUPPORTED: &[Attribute] = &[
    Attribute::BookingCode,
    Attribute::BookingDescription,
    Attribute::Amount,
];

#[derive(Debug)]
struct CondensedRow {
    code: String,
    description: String,
    amount: Decimal,
    sequence: u32,
}

/// Render the results-per-booking-code report.
///
/// `transactions` must be pre-sorted by booking code; the condenser walks
/// them once, flushing one row per code, then re-sorts the rows by the
/// catalog's sequence numbers. Returns `Ok(None)` (with a recorded warning)
/// when there are no transactions at all.
pub fn render_booking_code_results(
    template: &Template,
    year: i32,
    transactions: &[Transaction],
    source_total: Decimal,
    catalog: &BookingCatalog,
    cfg: &FormatConfig,
    messages: &mut Messages,
) -> Result<Option<Rendered>, ReportError> {
    if transactions.is_empty() {
        messages.warning(format!(
            "no transactions for {year}; booking-code results skipped"
        ));
        return Ok(None);
    }

    let rows = condense(transactions, catalog, messages);

    // The condensed rows must still carry the source total.
    let condensed_total: Decimal = rows.iter().map(|r| r.amount).sum();
    reconcile("verdichting", source_total, condensed_total)?;

    let plan = analyze(template, &HeaderContext::for_year(year), cfg)?;
    plan.ensure_supported(SUPPORTED)?;
    if plan.amount_columns().is_empty() {
        return Err(ReportError::ColumnCountMismatch {
            template: 0,
            data: 1,
        });
    }

    let data: Vec<DataRow> = rows.iter().map(|r| condensed_data_row(&plan, r)).collect();
    let rendered = render(&plan, cfg, &data)?;
    reconcile("totaal generaal", source_total, rendered.general_totals[0])?;

    messages.info(format!(
        "booking-code results {year} rendered: {} codes from {} transactions",
        rendered.detail_count,
        transactions.len()
    ));
    Ok(Some(rendered))
}

/// One pass over code-sorted transactions, with an explicit boundary check
/// instead of running past the end: the current accumulator flushes when the
/// code changes, and the final accumulator flushes when its amount is
/// nonzero or nothing was flushed yet.
fn condense(
    transactions: &[Transaction],
    catalog: &BookingCatalog,
    messages: &mut Messages,
) -> Vec<CondensedRow> {
    let mut rows: Vec<CondensedRow> = Vec::new();
    let mut current: Option<(String, Decimal)> = None;

    for t in transactions {
        match &mut current {
            Some((code, amount)) if *code == t.booking_code => *amount += t.amount,
            _ => {
                if let Some((code, amount)) = current.take() {
                    rows.push(flush(code, amount, catalog, messages));
                }
                current = Some((t.booking_code.clone(), t.amount));
            }
        }
    }
    if let Some((code, amount)) = current.take() {
        if !amount.is_zero() || rows.is_empty() {
            rows.push(flush(code, amount, catalog, messages));
        }
    }

    // Output order is the reference data's, not the code or amount order.
    rows.sort_by_key(|r| r.sequence);
    rows
}

fn flush(
    code: String,
    amount: Decimal,
    catalog: &BookingCatalog,
    messages: &mut Messages,
) -> CondensedRow {
    let description = match catalog.description(&code) {
        Some(d) => d.to_string(),
        None => {
            messages.warning(format!(
                "booking code '{code}' is not in the catalog; code shown as description"
            ));
            code.clone()
        }
    };
    let sequence = catalog.sequence_for_code(&code).unwrap_or(u32::MAX);
    CondensedRow {
        code,
        description,
        amount,
        sequence,
    }
}

fn condensed_data_row(plan: &ReportPlan, row: &CondensedRow) -> DataRow {
    let cells = plan
        .columns
        .iter()
        .map(|spec| match spec.attribute {
            Attribute::BookingCode => Cell::Text(row.code.clone()),
            Attribute::BookingDescription => Cell::Text(row.description.clone()),
            Attribute::Amount => Cell::Amount(row.amount),
            // Ruled out by ensure_supported.
            _ => Cell::Text(String::new()),
        })
        .collect();
    DataRow::new(cells)
}
