//! Locale-aware numeric and date formatting.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::ReportError;

/// Decimal separator used in rendered amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimalSeparator {
    /// `1234.56`
    Point,
    /// `1234,56`
    Comma,
}

/// Formatting configuration, threaded explicitly through every render entry
/// point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatConfig {
    /// Decimal separator for amounts.
    pub decimal_separator: DecimalSeparator,
    /// Field delimiter of the template and report files.
    pub delimiter: char,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            decimal_separator: DecimalSeparator::Comma,
            delimiter: ';',
        }
    }
}

/// Format a column amount: 2 decimals, configured separator, and an exactly
/// zero value renders as an empty cell (zero-suppression).
pub fn format_amount(d: Decimal, cfg: &FormatConfig) -> String {
    let scaled = d.round_dp(2);
    if scaled.is_zero() {
        return String::new();
    }
    format_balance(scaled, cfg)
}

/// Format a header balance: 2 decimals and the configured separator, without
/// zero-suppression (a zero opening balance still reads "0,00").
pub fn format_balance(d: Decimal, cfg: &FormatConfig) -> String {
    let s = format!("{:.2}", d.round_dp(2));
    match cfg.decimal_separator {
        DecimalSeparator::Point => s,
        DecimalSeparator::Comma => s.replace('.', ","),
    }
}

/// Parse a rendered amount cell back to a `Decimal`.
///
/// The inverse of [`format_amount`]: an empty cell parses as 0.00. Used by
/// the round-trip consistency check that guards against the locale
/// formatting silently corrupting a total.
pub fn parse_amount(s: &str, cfg: &FormatConfig) -> Result<Decimal, ReportError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let normalized = match cfg.decimal_separator {
        DecimalSeparator::Point => s.to_string(),
        DecimalSeparator::Comma => s.replace(',', "."),
    };
    normalized
        .parse::<Decimal>()
        .map_err(|e| ReportError::Internal(format!("unparsable amount '{s}': {e}")))
}

/// Render a date day-month-year.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%d-%m-%Y").to_string()
}

/// Dutch month name, capitalized. Months are 1-based.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "Januari",
        2 => "Februari",
        3 => "Maart",
        4 => "April",
        5 => "Mei",
        6 => "Juni",
        7 => "Juli",
        8 => "Augustus",
        9 => "September",
        10 => "Oktober",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_comma_separator() {
        let cfg = FormatConfig::default();
        assert_eq!(format_amount(dec!(1190.00), &cfg), "1190,00");
        assert_eq!(format_amount(dec!(24.95), &cfg), "24,95");
        assert_eq!(format_amount(dec!(-12.5), &cfg), "-12,50");
    }

    #[test]
    fn amount_point_separator() {
        let cfg = FormatConfig {
            decimal_separator: DecimalSeparator::Point,
            ..Default::default()
        };
        assert_eq!(format_amount(dec!(100), &cfg), "100.00");
    }

    #[test]
    fn amount_rounds_to_two_decimals() {
        let cfg = FormatConfig::default();
        assert_eq!(format_amount(dec!(123.456), &cfg), "123,46");
    }

    #[test]
    fn zero_renders_empty() {
        let cfg = FormatConfig::default();
        assert_eq!(format_amount(dec!(0.00), &cfg), "");
        assert_eq!(format_amount(dec!(0.004), &cfg), "");
    }

    #[test]
    fn balance_keeps_zero() {
        let cfg = FormatConfig::default();
        assert_eq!(format_balance(dec!(0), &cfg), "0,00");
    }

    #[test]
    fn parse_is_inverse_of_format() {
        let cfg = FormatConfig::default();
        for d in [dec!(0.00), dec!(150.00), dec!(-12.34), dec!(1190.00)] {
            let parsed = parse_amount(&format_amount(d, &cfg), &cfg).unwrap();
            assert_eq!(parsed, d.round_dp(2));
        }
    }

    #[test]
    fn date_reorders_day_first() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(format_date(d), "15-06-2024");
    }

    #[test]
    fn month_names_dutch() {
        assert_eq!(month_name(1), "Januari");
        assert_eq!(month_name(3), "Maart");
        assert_eq!(month_name(12), "December");
    }
}
