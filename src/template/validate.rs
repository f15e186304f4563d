//! Template loading and cell-level validation.

use std::collections::BTreeMap;

use crate::core::{ReportError, SyntaxError};

use super::token::{CellToken, tokenize_cell};

/// Where a variable first occurs in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSite {
    /// 1-based template row.
    pub row: usize,
    /// 1-based template column.
    pub column: usize,
    /// Number of all-blank rows immediately preceding the row.
    pub blanks_before: usize,
}

/// A validated template: every cell tokenized, variable names canonicalized
/// to upper case.
#[derive(Debug, Clone)]
pub struct Template {
    rows: Vec<Vec<CellToken>>,
    sites: BTreeMap<String, VariableSite>,
}

impl Template {
    /// Validate a raw template grid.
    ///
    /// The complete batch of syntax errors is collected before failing, so a
    /// template author sees every offending cell at once; no partial
    /// template is ever returned.
    pub fn parse(grid: &[Vec<String>]) -> Result<Self, ReportError> {
        let mut rows = Vec::with_capacity(grid.len());
        let mut sites: BTreeMap<String, VariableSite> = BTreeMap::new();
        let mut errors = Vec::new();
        let mut blanks_before = 0usize;

        for (r, raw_row) in grid.iter().enumerate() {
            let mut row = Vec::with_capacity(raw_row.len());
            let mut row_blank = true;
            for (c, raw_cell) in raw_row.iter().enumerate() {
                match tokenize_cell(raw_cell, r + 1, c + 1) {
                    Ok(token) => {
                        if !matches!(token, CellToken::Blank) {
                            row_blank = false;
                            record_site(&mut sites, &token, r + 1, c + 1, blanks_before);
                        }
                        row.push(token);
                    }
                    Err(err) => {
                        errors.push(err);
                        row.push(CellToken::Blank);
                    }
                }
            }
            rows.push(row);
            blanks_before = if row_blank { blanks_before + 1 } else { 0 };
        }

        if errors.is_empty() {
            Ok(Self { rows, sites })
        } else {
            Err(ReportError::TemplateSyntax(errors))
        }
    }

    /// The tokenized rows, in template order.
    pub fn rows(&self) -> &[Vec<CellToken>] {
        &self.rows
    }

    /// First-occurrence site of a variable, by canonical name.
    ///
    /// Later occurrences of the same variable (amount columns reused across
    /// rows) are tolerated but not re-recorded.
    pub fn site(&self, name: &str) -> Option<&VariableSite> {
        self.sites.get(name)
    }

    /// Render the canonical grid back out.
    ///
    /// Parsing the result yields an identical template: validation is
    /// idempotent.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| row.iter().map(CellToken::to_cell).collect())
            .collect()
    }
}

fn record_site(
    sites: &mut BTreeMap<String, VariableSite>,
    token: &CellToken,
    row: usize,
    column: usize,
    blanks_before: usize,
) {
    let name = match token {
        CellToken::Singular(var) => var.name(),
        CellToken::Plural(var) => var.name(),
        CellToken::Total(level) => match level.total_name() {
            Some(name) => name,
            None => return,
        },
        CellToken::Blank | CellToken::Literal { .. } => return,
    };
    sites.entry(name.to_string()).or_insert(VariableSite {
        row,
        column,
        blanks_before,
    });
}
