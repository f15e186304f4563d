//! Delimited-file primitives: template grid reading and whole-file report
//! writing.

use std::path::Path;

use crate::core::ReportError;
use crate::render::{FormatConfig, Rendered};
use crate::template::Template;

/// Split delimited text into a grid of raw cells.
///
/// Cells are kept verbatim — quotes are template syntax, not CSV quoting.
pub fn read_grid(text: &str, delimiter: char) -> Vec<Vec<String>> {
    text.lines()
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect()
}

/// Read and validate a template file.
pub fn load_template(path: &Path, cfg: &FormatConfig) -> Result<Template, ReportError> {
    let text = std::fs::read_to_string(path)?;
    Template::parse(&read_grid(&text, cfg.delimiter))
}

/// Write a rendered report to `path`.
///
/// The full output string is assembled first and written in one call, so a
/// failed export never leaves a partial file behind.
pub fn write_report(path: &Path, rendered: &Rendered, cfg: &FormatConfig) -> Result<(), ReportError> {
    std::fs::write(path, rendered.to_csv(cfg.delimiter))?;
    Ok(())
}
