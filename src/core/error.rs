use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while validating a template or rendering a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReportError {
    /// One or more template cells failed syntax validation.
    /// The full batch is collected before failing — no partial template is ever used.
    #[error("template validation failed with {} syntax error(s)", .0.len())]
    TemplateSyntax(Vec<SyntaxError>),

    /// A template variable is not supported by the report being rendered.
    #[error("variable '{variable}' is not supported by this report")]
    UnsupportedVariable {
        /// Canonical (upper-cased) variable name.
        variable: String,
    },

    /// A template row mixes singular and plural variables.
    #[error("mixed singular and plural variables in one line are not supported (row {row})")]
    MixedVariableRow {
        /// 1-based template row.
        row: usize,
    },

    /// Merged data width does not match the template's declared columns.
    #[error("column count mismatch: template declares {template} column(s), data rows carry {data}")]
    ColumnCountMismatch {
        /// Columns declared by the template.
        template: usize,
        /// Columns carried by the data rows.
        data: usize,
    },

    /// A recomputed total does not equal the source-of-truth total.
    /// Financial totals must reconcile exactly at every handoff — no tolerance.
    #[error("consistency check '{step}' failed: expected {expected}, got {actual} (difference {difference})")]
    ConsistencyCheck {
        /// Name of the pipeline checkpoint that failed.
        step: String,
        /// Source-of-truth total, rounded to 2 decimals.
        expected: Decimal,
        /// Recomputed total, rounded to 2 decimals.
        actual: Decimal,
        /// `expected - actual`.
        difference: Decimal,
    },

    /// A state the engine cannot reach through valid inputs.
    #[error("internal error: {0}")]
    Internal(String),

    /// Reading a template file or writing a report file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single template syntax error with the offending cell position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based template row.
    pub row: usize,
    /// 1-based template column.
    pub column: usize,
    /// Human-readable error description.
    pub message: String,
}

impl SyntaxError {
    /// Create a syntax error for the given cell.
    pub fn new(row: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            row,
            column,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "row {}, column {}: {}", self.row, self.column, self.message)
    }
}
