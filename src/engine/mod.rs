//! Reconciliation engine for the deferred CLI
//!
//! The engine orchestrates:
//! 1. Previewing - Decide every pass against a scratch copy of the catalog
//! 2. Displaying - Show the decisions grouped per pass
//! 3. Executing - Confirm, reconcile every pass, report a summary

pub mod differ;
pub mod executor;

pub use differ::{display_catalog_diff, display_plan, preview};
pub use executor::{ApplyOptions, execute};
