//! Presentation-side collaborators of the pipeline: the pay trigger, the
//! CSV batch front end and its payment ledger.

pub mod batch;
pub mod csv;
pub mod trigger;
