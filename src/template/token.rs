//! Typed template-cell tokens and the closed variable vocabularies.
//!
//! Every cell of a template grid tokenizes into exactly one [`CellToken`].
//! Variable names parse case-insensitively and canonicalize to upper case,
//! so re-validating an already-validated template is a no-op.

use serde::{Deserialize, Serialize};

use crate::core::SyntaxError;

/// Variables substituted once per export, in header rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SingularVar {
    /// The report year.
    Year,
    /// The year before the report year.
    YearPrevious,
    /// The rendered window label (month name, "Q1".."Q4", or "S1"/"S2").
    Month,
    /// First month of the rendered window.
    MonthFrom,
    /// Last month of the rendered window.
    MonthTo,
    /// Balance at the start of the window.
    OpeningBalance,
    /// Balance at the end of the window.
    ClosingBalance,
    /// Sum of positive amounts in the window.
    TotalRevenues,
    /// Sum of negative amounts in the window.
    TotalCosts,
}

impl SingularVar {
    /// Canonical variable name as written in templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::Year => "YEAR",
            Self::YearPrevious => "YEAR_PREVIOUS",
            Self::Month => "MONTH",
            Self::MonthFrom => "MONTH_FROM",
            Self::MonthTo => "MONTH_TO",
            Self::OpeningBalance => "OPENING_BALANCE",
            Self::ClosingBalance => "CLOSING_BALANCE",
            Self::TotalRevenues => "TOTAL_REVENUES",
            Self::TotalCosts => "TOTAL_COSTS",
        }
    }

    /// Parse a canonical (upper-cased) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "YEAR" => Self::Year,
            "YEAR_PREVIOUS" => Self::YearPrevious,
            "MONTH" => Self::Month,
            "MONTH_FROM" => Self::MonthFrom,
            "MONTH_TO" => Self::MonthTo,
            "OPENING_BALANCE" => Self::OpeningBalance,
            "CLOSING_BALANCE" => Self::ClosingBalance,
            "TOTAL_REVENUES" => Self::TotalRevenues,
            "TOTAL_COSTS" => Self::TotalCosts,
            _ => return None,
        })
    }
}

/// Variables repeated once per data row, in the column-definition row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluralVar {
    /// Booking type grouping column.
    Types,
    /// Main group grouping column.
    Maingroups,
    /// Subgroup grouping column.
    Subgroups,
    /// Signed amount column.
    Amounts,
    /// Transaction date column.
    Dates,
    /// Transaction description column.
    Descriptions,
    /// Revenue half of a split signed amount.
    Revenues,
    /// Cost half of a split signed amount.
    Costs,
    /// Booking-code description column.
    BookingDescriptions,
    /// Booking-code column.
    BookingCodes,
}

impl PluralVar {
    /// Canonical variable name as written in templates.
    pub fn name(self) -> &'static str {
        match self {
            Self::Types => "TYPES",
            Self::Maingroups => "MAINGROUPS",
            Self::Subgroups => "SUBGROUPS",
            Self::Amounts => "AMOUNTS",
            Self::Dates => "DATES",
            Self::Descriptions => "DESCRIPTIONS",
            Self::Revenues => "REVENUES",
            Self::Costs => "COSTS",
            Self::BookingDescriptions => "BOOKING_DESCRIPTIONS",
            Self::BookingCodes => "BOOKING_CODES",
        }
    }

    /// Parse a canonical (upper-cased) name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "TYPES" => Self::Types,
            "MAINGROUPS" => Self::Maingroups,
            "SUBGROUPS" => Self::Subgroups,
            "AMOUNTS" => Self::Amounts,
            "DATES" => Self::Dates,
            "DESCRIPTIONS" => Self::Descriptions,
            "REVENUES" => Self::Revenues,
            "COSTS" => Self::Costs,
            "BOOKING_DESCRIPTIONS" => Self::BookingDescriptions,
            "BOOKING_CODES" => Self::BookingCodes,
            _ => return None,
        })
    }

    /// The data-model attribute this variable binds to (the fixed table).
    pub fn attribute(self) -> Attribute {
        match self {
            Self::Types => Attribute::BookingType,
            Self::Maingroups => Attribute::Maingroup,
            Self::Subgroups => Attribute::Subgroup,
            Self::Amounts => Attribute::Amount,
            Self::Dates => Attribute::Date,
            Self::Descriptions => Attribute::Description,
            Self::Revenues => Attribute::Revenue,
            Self::Costs => Attribute::Cost,
            Self::BookingDescriptions => Attribute::BookingDescription,
            Self::BookingCodes => Attribute::BookingCode,
        }
    }

    /// The aggregation level this variable groups on, if it is a grouping column.
    pub fn level(self) -> Option<Level> {
        match self {
            Self::Types => Some(Level::Type),
            Self::Maingroups => Some(Level::Maingroup),
            Self::Subgroups => Some(Level::Subgroup),
            _ => None,
        }
    }
}

/// Data-model attribute a plural variable binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// Booking type label.
    BookingType,
    /// Main group label.
    Maingroup,
    /// Subgroup label.
    Subgroup,
    /// Signed currency amount.
    Amount,
    /// Transaction date.
    Date,
    /// Transaction description.
    Description,
    /// Revenue column of a split amount.
    Revenue,
    /// Cost column of a split amount.
    Cost,
    /// Booking-code description.
    BookingDescription,
    /// Booking code.
    BookingCode,
}

impl Attribute {
    /// Whether this attribute carries a currency amount.
    pub fn is_amount(self) -> bool {
        matches!(self, Self::Amount | Self::Revenue | Self::Cost)
    }
}

/// The four nested aggregation levels, ordered least → most significant.
///
/// A break at a more significant level implies a break at all less
/// significant ones; the reverse does not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Subgroup — least significant; has no total row of its own.
    Subgroup,
    /// Main group.
    Maingroup,
    /// Booking type.
    Type,
    /// The whole report — breaks only at end of data.
    General,
}

impl Level {
    /// Canonical total-marker name for this level, if it has one.
    pub fn total_name(self) -> Option<&'static str> {
        match self {
            Self::Subgroup => None,
            Self::Maingroup => Some("TOTAL_MAINGROUP"),
            Self::Type => Some("TOTAL_TYPE"),
            Self::General => Some("TOTAL_GENERAL"),
        }
    }

    /// Parse a canonical total-marker name.
    pub fn from_total_name(name: &str) -> Option<Self> {
        Some(match name {
            "TOTAL_MAINGROUP" => Self::Maingroup,
            "TOTAL_TYPE" => Self::Type,
            "TOTAL_GENERAL" => Self::General,
            _ => return None,
        })
    }
}

/// One classified template cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellToken {
    /// An empty cell.
    Blank,
    /// A quoted literal. Embedded `{NAME}` placeholders are validated and
    /// stored canonicalized; only `{YEAR}` substitutes at render time.
    Literal {
        /// Text between the quotes, placeholder names upper-cased.
        text: String,
        /// The singular variables embedded in the text, in order.
        inline: Vec<SingularVar>,
    },
    /// A `{VARIABLE}` cell from the singular vocabulary.
    Singular(SingularVar),
    /// A `{VARIABLE}` cell from the plural vocabulary.
    Plural(PluralVar),
    /// A `TOTAL_*` marker cell.
    Total(Level),
}

impl CellToken {
    /// Render the canonical cell text this token round-trips to.
    pub fn to_cell(&self) -> String {
        match self {
            Self::Blank => String::new(),
            Self::Literal { text, .. } => format!("\"{text}\""),
            Self::Singular(var) => format!("{{{}}}", var.name()),
            Self::Plural(var) => format!("{{{}}}", var.name()),
            Self::Total(level) => {
                // Guaranteed by tokenize_cell: only levels with a marker name
                // ever appear inside a Total token.
                format!("{{{}}}", level.total_name().unwrap_or_default())
            }
        }
    }
}

/// Classify one raw template cell.
///
/// `row` and `column` are 1-based and only used for error reporting. A
/// non-empty cell must either be wrapped in double quotes (literal) or in a
/// single pair of braces (variable); anything else is a syntax error.
pub fn tokenize_cell(raw: &str, row: usize, column: usize) -> Result<CellToken, SyntaxError> {
    let cell = raw.trim();
    if cell.is_empty() {
        return Ok(CellToken::Blank);
    }

    if cell.starts_with('"') {
        if cell.len() < 2 || !cell.ends_with('"') {
            return Err(SyntaxError::new(row, column, "unterminated literal"));
        }
        let inner = &cell[1..cell.len() - 1];
        return tokenize_literal(inner, row, column);
    }

    if cell.starts_with('{') {
        if !cell.ends_with('}') {
            return Err(SyntaxError::new(row, column, "unterminated placeholder"));
        }
        let inner = &cell[1..cell.len() - 1];
        if inner.contains('{') || inner.contains('}') {
            return Err(SyntaxError::new(
                row,
                column,
                "a variable cell must hold exactly one placeholder",
            ));
        }
        let name = inner.trim().to_uppercase();
        if let Some(var) = SingularVar::from_name(&name) {
            return Ok(CellToken::Singular(var));
        }
        if let Some(var) = PluralVar::from_name(&name) {
            return Ok(CellToken::Plural(var));
        }
        if let Some(level) = Level::from_total_name(&name) {
            return Ok(CellToken::Total(level));
        }
        return Err(SyntaxError::new(
            row,
            column,
            format!("unknown variable '{name}'"),
        ));
    }

    Err(SyntaxError::new(
        row,
        column,
        "cell must be a quoted literal or a {VARIABLE} placeholder",
    ))
}

/// Scan the inside of a quoted literal, validating and canonicalizing any
/// embedded placeholders.
fn tokenize_literal(inner: &str, row: usize, column: usize) -> Result<CellToken, SyntaxError> {
    let mut text = String::with_capacity(inner.len());
    let mut inline = Vec::new();
    let mut rest = inner;

    while let Some(open) = rest.find('{') {
        text.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            return Err(SyntaxError::new(
                row,
                column,
                "unterminated placeholder in literal",
            ));
        };
        let name = after[..close].trim().to_uppercase();
        let known = SingularVar::from_name(&name).is_some()
            || PluralVar::from_name(&name).is_some()
            || Level::from_total_name(&name).is_some();
        if !known {
            return Err(SyntaxError::new(
                row,
                column,
                format!("unknown variable '{name}' in literal"),
            ));
        }
        if let Some(var) = SingularVar::from_name(&name) {
            inline.push(var);
        }
        text.push('{');
        text.push_str(&name);
        text.push('}');
        rest = &after[close + 1..];
    }
    text.push_str(rest);

    Ok(CellToken::Literal { text, inline })
}
