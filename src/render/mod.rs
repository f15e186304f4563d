//! Level-break rendering and locale-aware formatting.
//!
//! The engine walks ordered data rows, prints grouping labels only when
//! they change, and keeps one running total per aggregation level, each
//! reset independently when its own level breaks.

mod engine;
mod format;

pub use engine::{Rendered, RenderedRow, RowKind, render};
pub use format::{
    DecimalSeparator, FormatConfig, format_amount, format_balance, format_date, month_name,
    parse_amount,
};
