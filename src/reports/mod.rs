//! The three report providers, each built on the template analyzer and the
//! level-break render engine, each reconciled against its source total at
//! every pipeline checkpoint.

pub mod annual;
pub mod booking_code;
pub mod periodic;

pub use annual::{AnnualInputs, realisation_from_transactions, render_annual_account};
pub use booking_code::render_booking_code_results;
pub use periodic::{PeriodicWalker, WindowReport};
