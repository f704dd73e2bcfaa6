// Reconciliation commands
pub mod apply;
pub mod plan;

// Inspection commands
pub mod show;
pub mod validate;
