//! Annual account report: realisation merged with budget.
//!
//! Realisation rows (aggregated from one year of enriched transactions) are
//! merged with budget rows keyed by `(type, maingroup, subgroup)`, ordered by
//! the booking catalog's sequence numbers, and rendered with per-level
//! totals. The source total is reconciled after keying, after merging, and
//! after rendering.
//!
//! # Column-count coulance
//!
//! When the template declares more amount columns than the merged data
//! carries and the merged width is at least 4, the template's surplus amount
//! columns are **silently dropped** — the budget file's width is
//! authoritative. This mirrors long-standing behavior and can mask template
//! drift; a Warning is recorded so the condition stays visible. A template
//! declaring *fewer* amount columns than the data, or a merged width under
//! 4, is a fatal [`ReportError::ColumnCountMismatch`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::core::{
    BookingCatalog, BookingRow, BudgetRow, Cell, DataRow, Messages, RealisationRow, ReportError,
    Transaction, reconcile,
};
use crate::render::{FormatConfig, Rendered, render};
use crate::template::{Attribute, HeaderContext, ReportPlan, Template, analyze};

/// Inputs to the annual account report, fetched by the caller.
#[derive(Debug, Clone)]
pub struct AnnualInputs<'a> {
    /// Realisation rows for the report year.
    pub realisation: &'a [RealisationRow],
    /// Authoritative realisation total from the data source.
    pub realisation_total: Decimal,
    /// Budget rows for the report year.
    pub budget: &'a [BudgetRow],
    /// Booking-code reference data, used for output ordering.
    pub catalog: &'a BookingCatalog,
}

const SUPPORTED: &[Attribute] = &[
    Attribute::BookingType,
    Attribute::Maingroup,
    Attribute::Subgroup,
    Attribute::Amount,
];

/// Render the annual account report.
///
/// Returns `Ok(None)` (with a recorded warning) when there is nothing to
/// report. Every consistency checkpoint failure is fatal and leaves no
/// output.
pub fn render_annual_account(
    template: &Template,
    year: i32,
    inputs: &AnnualInputs<'_>,
    cfg: &FormatConfig,
    messages: &mut Messages,
) -> Result<Option<Rendered>, ReportError> {
    if inputs.realisation.is_empty() && inputs.budget.is_empty() {
        messages.warning(format!(
            "no realisation or budget rows for {year}; annual account skipped"
        ));
        return Ok(None);
    }

    // Checkpoint 1: the keyed realisation must still carry the source total.
    let mut realised: BTreeMap<(String, String, String), Decimal> = BTreeMap::new();
    for row in inputs.realisation {
        *realised
            .entry((
                row.booking_type.clone(),
                row.maingroup.clone(),
                row.subgroup.clone(),
            ))
            .or_default() += row.amount;
    }
    let keyed_total: Decimal = realised.values().copied().sum();
    reconcile("realisatie", inputs.realisation_total, keyed_total)?;

    // Budget width is uniform per file: 2 columns when any row carries a
    // previous-year amount, 1 otherwise, 0 when there is no budget at all.
    let budget_width = if inputs.budget.is_empty() {
        0
    } else if inputs.budget.iter().any(|b| b.amount_previous.is_some()) {
        2
    } else {
        1
    };
    let amount_width = 1 + budget_width;

    // Merge: realisation keys get their budget attached; budget-only keys
    // synthesize a zero-realisation row carrying only the budget amounts.
    let mut merged: BTreeMap<(String, String, String), BookingRow> = BTreeMap::new();
    for (key, amount) in &realised {
        let mut amounts = vec![Decimal::ZERO; amount_width];
        amounts[0] = *amount;
        merged.insert(
            key.clone(),
            BookingRow {
                booking_type: key.0.clone(),
                maingroup: key.1.clone(),
                subgroup: key.2.clone(),
                amounts,
            },
        );
    }
    for b in inputs.budget {
        let key = (
            b.booking_type.clone(),
            b.maingroup.clone(),
            b.subgroup.clone(),
        );
        let row = merged.entry(key).or_insert_with(|| BookingRow {
            booking_type: b.booking_type.clone(),
            maingroup: b.maingroup.clone(),
            subgroup: b.subgroup.clone(),
            amounts: vec![Decimal::ZERO; amount_width],
        });
        row.amounts[1] += b.amount;
        if budget_width == 2 {
            row.amounts[2] += b.amount_previous.unwrap_or_default();
        }
    }

    // Order by the booking catalog's sequence numbers, not alphabetically.
    let mut rows: Vec<BookingRow> = merged.into_values().collect();
    sort_by_catalog(&mut rows, inputs.catalog, messages);

    // Checkpoint 2: merging must not have disturbed the realisation column.
    let merged_total: Decimal = rows.iter().map(|r| r.amounts[0]).sum();
    reconcile("samenvoeging", inputs.realisation_total, merged_total)?;

    let mut plan = analyze(template, &HeaderContext::for_year(year), cfg)?;
    plan.ensure_supported(SUPPORTED)?;
    apply_column_tolerance(&mut plan, amount_width, messages)?;

    let data = rows
        .iter()
        .map(|row| booking_data_row(&plan, row))
        .collect::<Result<Vec<_>, _>>()?;
    let rendered = render(&plan, cfg, &data)?;

    // Checkpoint 3: the rendered General total must reconcile as well.
    reconcile(
        "totaal generaal",
        inputs.realisation_total,
        rendered.general_totals[0],
    )?;

    messages.info(format!(
        "annual account {year} rendered: {} detail rows, {} budget rows merged",
        rendered.detail_count,
        inputs.budget.len()
    ));
    Ok(Some(rendered))
}

/// Aggregate enriched transactions into realisation rows via the catalog's
/// code classification. Unknown booking codes group under "Onbekend" with a
/// recorded warning.
pub fn realisation_from_transactions(
    transactions: &[Transaction],
    catalog: &BookingCatalog,
    messages: &mut Messages,
) -> Vec<RealisationRow> {
    let mut keyed: BTreeMap<(String, String, String), Decimal> = BTreeMap::new();
    for t in transactions {
        let key = match catalog.classification(&t.booking_code) {
            Some((ty, mg, sg)) => (ty.to_string(), mg.to_string(), sg.to_string()),
            None => {
                messages.warning(format!(
                    "booking code '{}' is not in the catalog; grouped under Onbekend",
                    t.booking_code
                ));
                ("Onbekend".into(), "Onbekend".into(), t.booking_code.clone())
            }
        };
        *keyed.entry(key).or_default() += t.amount;
    }
    keyed
        .into_iter()
        .map(|((booking_type, maingroup, subgroup), amount)| RealisationRow {
            booking_type,
            maingroup,
            subgroup,
            amount,
        })
        .collect()
}

fn sort_by_catalog(rows: &mut [BookingRow], catalog: &BookingCatalog, messages: &mut Messages) {
    for row in rows.iter() {
        if catalog
            .sequence_for_key(&row.booking_type, &row.maingroup, &row.subgroup)
            .is_none()
        {
            messages.warning(format!(
                "no sequence number for ({}, {}, {}); sorted last",
                row.booking_type, row.maingroup, row.subgroup
            ));
        }
    }
    rows.sort_by_key(|row| {
        catalog
            .sequence_for_key(&row.booking_type, &row.maingroup, &row.subgroup)
            .unwrap_or(u32::MAX)
    });
}

/// Data width is authoritative when the template over-declares and the
/// merged width (3 key columns + amounts) is at least 4.
fn apply_column_tolerance(
    plan: &mut ReportPlan,
    amount_width: usize,
    messages: &mut Messages,
) -> Result<(), ReportError> {
    let declared = plan.amount_columns().len();
    if declared == amount_width {
        return Ok(());
    }
    let merged_width = 3 + amount_width;
    if declared > amount_width && merged_width >= 4 {
        plan.truncate_amount_columns(amount_width);
        messages.warning(format!(
            "template declares {declared} amount columns, merged data carries {amount_width}; \
             trailing template columns dropped"
        ));
        Ok(())
    } else {
        Err(ReportError::ColumnCountMismatch {
            template: declared,
            data: amount_width,
        })
    }
}

fn booking_data_row(plan: &ReportPlan, row: &BookingRow) -> Result<DataRow, ReportError> {
    let mut cells = Vec::with_capacity(plan.columns.len());
    let mut amount_cursor = 0usize;
    for spec in &plan.columns {
        let cell = match spec.attribute {
            Attribute::BookingType => Cell::Text(row.booking_type.clone()),
            Attribute::Maingroup => Cell::Text(row.maingroup.clone()),
            Attribute::Subgroup => Cell::Text(row.subgroup.clone()),
            Attribute::Amount => {
                let value = row.amounts.get(amount_cursor).copied().ok_or_else(|| {
                    ReportError::ColumnCountMismatch {
                        template: plan.amount_columns().len(),
                        data: row.amounts.len(),
                    }
                })?;
                amount_cursor += 1;
                Cell::Amount(value)
            }
            _ => {
                return Err(ReportError::UnsupportedVariable {
                    variable: spec.var.name().to_string(),
                });
            }
        };
        cells.push(cell);
    }
    Ok(DataRow::new(cells))
}
