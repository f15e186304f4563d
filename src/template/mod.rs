//! Template loading, validation, and analysis.
//!
//! A template is a grid of string cells: quoted literals for titles,
//! `{VARIABLE}` placeholders for substituted values, and `{TOTAL_*}` markers
//! declaring which total rows the report wants. [`Template::parse`] validates
//! cell syntax against the closed vocabularies and [`analyze`] turns the
//! validated grid into a [`ReportPlan`] for the render engine.

mod analyze;
mod token;
mod validate;

pub use analyze::{ColumnSpec, HeaderContext, PlanRow, ReportPlan, TotalDecl, analyze};
pub use token::{Attribute, CellToken, Level, PluralVar, SingularVar, tokenize_cell};
pub use validate::{Template, VariableSite};
