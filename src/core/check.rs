use rust_decimal::Decimal;

use super::error::ReportError;

/// Compare a processed total against the source-of-truth total.
///
/// Both sides are rounded to 2 decimals and must be exactly equal; there is
/// no tolerance and no epsilon. Every report provider calls this at 2–3
/// pipeline checkpoints, and a mismatch aborts the export before any file
/// is written.
pub fn reconcile(step: &str, source: Decimal, processed: Decimal) -> Result<(), ReportError> {
    let expected = source.round_dp(2);
    let actual = processed.round_dp(2);
    if expected == actual {
        Ok(())
    } else {
        Err(ReportError::ConsistencyCheck {
            step: step.to_string(),
            expected,
            actual,
            difference: expected - actual,
        })
    }
}
