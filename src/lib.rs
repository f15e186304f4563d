//! # kasboek
//!
//! Template-driven CSV report engine for personal bookkeeping: a small
//! layout language for declaring report templates, a level-break render
//! engine with running per-level totals, and three report providers
//! (annual account, periodic account, results per booking code) that
//! reconcile every pipeline step against an independently computed control
//! total.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Consistency checks compare totals rounded to 2 decimals for exact
//! equality; there is no tolerance.
//!
//! ## Quick Start
//!
//! ```rust
//! use kasboek::core::*;
//! use kasboek::render::FormatConfig;
//! use kasboek::reports::annual::{AnnualInputs, render_annual_account};
//! use kasboek::template::Template;
//! use rust_decimal_macros::dec;
//!
//! let grid: Vec<Vec<String>> = vec![
//!     vec!["\"Jaarrekening {YEAR}\"".into()],
//!     vec!["".into()],
//!     vec!["{TYPES}".into(), "{MAINGROUPS}".into(), "{SUBGROUPS}".into(), "{AMOUNTS}".into()],
//!     vec!["{TOTAL_GENERAL}".into()],
//! ];
//! let template = Template::parse(&grid).unwrap();
//!
//! let catalog = BookingCatalog::new(vec![BookingDefinition {
//!     code: "CT".into(),
//!     description: "Collecte".into(),
//!     booking_type: "Inkomsten".into(),
//!     maingroup: "Levend geld".into(),
//!     subgroup: "Collecte".into(),
//!     sequence: 10,
//! }]);
//! let realisation = vec![RealisationRow {
//!     booking_type: "Inkomsten".into(),
//!     maingroup: "Levend geld".into(),
//!     subgroup: "Collecte".into(),
//!     amount: dec!(100.00),
//! }];
//! let inputs = AnnualInputs {
//!     realisation: &realisation,
//!     realisation_total: dec!(100.00),
//!     budget: &[],
//!     catalog: &catalog,
//! };
//!
//! let mut messages = Messages::new();
//! let rendered =
//!     render_annual_account(&template, 2024, &inputs, &FormatConfig::default(), &mut messages)
//!         .unwrap()
//!         .expect("rows were present");
//! assert!(rendered.to_csv(';').contains("Totaal Generaal;;;100,00"));
//! ```

pub mod core;
pub mod io;
pub mod render;
pub mod reports;
pub mod template;

// Re-export the shared data model at the crate root for convenience
pub use crate::core::*;
