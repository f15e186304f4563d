use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An enriched transaction: a bank mutation that the import pipeline has
/// already matched to a booking code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date.
    pub date: NaiveDate,
    /// Counterparty or statement description.
    pub description: String,
    /// Booking code assigned during import.
    pub booking_code: String,
    /// Signed amount: costs are negative, revenues positive.
    pub amount: Decimal,
}

/// Actual (realised) amounts for one year, aggregated per classification key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealisationRow {
    /// Booking type, e.g. "Inkomsten" or "Uitgaven".
    pub booking_type: String,
    /// Main group within the type.
    pub maingroup: String,
    /// Subgroup within the main group.
    pub subgroup: String,
    /// Signed realised amount.
    pub amount: Decimal,
}

/// Budgeted amounts for one classification key, as read from the budget file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetRow {
    /// Booking type.
    pub booking_type: String,
    /// Main group within the type.
    pub maingroup: String,
    /// Subgroup within the main group.
    pub subgroup: String,
    /// Budget for the report year.
    pub amount: Decimal,
    /// Budget for the previous year, if the budget file carries that column.
    pub amount_previous: Option<Decimal>,
}

/// A merged business record — the unit the render engine iterates over.
///
/// `amounts` holds 1–3 values depending on the report: realisation alone,
/// realisation plus budget column(s), or a single condensed amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRow {
    /// Booking type.
    pub booking_type: String,
    /// Main group within the type.
    pub maingroup: String,
    /// Subgroup, or the booking code for condensed reports.
    pub subgroup: String,
    /// Amount columns, realisation first.
    pub amounts: Vec<Decimal>,
}

/// A single typed value feeding one output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// A label or description, rendered verbatim.
    Text(String),
    /// A currency amount, rendered with the configured decimal separator.
    Amount(Decimal),
    /// A date, rendered day-month-year.
    Date(NaiveDate),
}

/// One ordered, already-joined data row matching the template's column layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    /// One cell per declared column, in template order.
    pub cells: Vec<Cell>,
}

impl DataRow {
    /// Create a data row from its cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }
}
