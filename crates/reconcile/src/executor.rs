//! Execution engine - applies decisions to the catalog
//!
//! Each desired entry is decided and then applied before the next one is
//! looked at, in canonical order. Applying never fails: every path either
//! mutates the catalog, reports through the sink, or both.

use crate::catalog::Catalog;
use crate::context::MessageSink;
use crate::declaration::Declaration;
use crate::planner::{Action, OverrideStep, decide};
use crate::types::{LogLevel, OptionSet};

/// What happened to one desired entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    WouldCreate,
    Unchanged,
    Drifted,
    Overridden,
    WouldOverride,
}

/// Summary of one or more reconciliation passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub overridden: usize,
    pub unchanged: usize,
    pub drifted: usize,
    pub would_create: usize,
    pub would_override: usize,
}

impl ReconcileSummary {
    /// Total number of entries reconciled
    pub fn total(&self) -> usize {
        self.created
            + self.overridden
            + self.unchanged
            + self.drifted
            + self.would_create
            + self.would_override
    }

    /// Entries whose catalog state changed
    pub fn total_changes(&self) -> usize {
        self.created + self.overridden
    }

    /// Entries that would have changed under enforcing mode
    pub fn total_projected(&self) -> usize {
        self.would_create + self.would_override
    }

    /// Merge another summary into this one
    pub fn merge(&mut self, other: &ReconcileSummary) {
        self.created += other.created;
        self.overridden += other.overridden;
        self.unchanged += other.unchanged;
        self.drifted += other.drifted;
        self.would_create += other.would_create;
        self.would_override += other.would_override;
    }

    /// Add an outcome to the summary
    pub fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::WouldCreate => self.would_create += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Drifted => self.drifted += 1,
            Outcome::Overridden => self.overridden += 1,
            Outcome::WouldOverride => self.would_override += 1,
        }
    }
}

/// Reconcile a declaration against the catalog
///
/// Runs exactly once per pass, after the catalog is otherwise complete.
pub fn reconcile(
    decl: &Declaration,
    catalog: &mut dyn Catalog,
    sink: &mut dyn MessageSink,
) -> ReconcileSummary {
    let kind = decl.resource_type();
    let mut summary = ReconcileSummary::default();

    log::debug!(
        "reconciling '{}': {} {} resource(s) in {} mode",
        decl.name(),
        decl.resources().len(),
        kind,
        decl.mode()
    );

    for (name, options) in decl.resources() {
        let action = decide(
            options,
            catalog.find(kind, name),
            decl.override_rules(),
            decl.mode(),
        );
        let outcome = apply_action(decl, name, options, action, catalog, sink);
        summary.add(outcome);
    }

    summary
}

/// Apply one decided action
fn apply_action(
    decl: &Declaration,
    name: &str,
    options: &OptionSet,
    action: Action,
    catalog: &mut dyn Catalog,
    sink: &mut dyn MessageSink,
) -> Outcome {
    let kind = decl.resource_type();
    let label = kind.label(name);
    let level = decl.log_level();

    match action {
        Action::Create => {
            catalog.insert(kind, name, options.clone());
            sink.emit(
                LogLevel::Debug,
                &format!("Created {label} with {}", options.without("name")),
            );
            Outcome::Created
        }
        Action::WouldCreate => {
            sink.emit(
                level,
                &format!("Would have created {label} with {}", options.without("name")),
            );
            Outcome::WouldCreate
        }
        Action::Ignore => {
            sink.emit(
                LogLevel::Debug,
                &format!("Ignoring existing resource {label}"),
            );
            Outcome::Unchanged
        }
        Action::Drift { origin, .. } => {
            sink.emit(
                level,
                &format!(
                    "Existing resource '{label}' at '{origin}' has options that differ from the deferred resources"
                ),
            );
            Outcome::Drifted
        }
        Action::WouldOverride { attributes } => {
            sink.emit(
                level,
                &format!(
                    "Would have overridden attributes '{}' on existing resource {label}",
                    attributes.join("', '")
                ),
            );
            Outcome::WouldOverride
        }
        Action::Override { steps } => {
            let Some(entry) = catalog.find_mut(kind, name) else {
                log::warn!("{label} disappeared from the catalog before it could be overridden");
                return Outcome::Unchanged;
            };
            for step in steps {
                match step {
                    // Traced only when the attribute was set; unset ones stay unset silently
                    OverrideStep::Invalidate(attr) => {
                        if entry.remove(&attr).is_some() {
                            sink.emit(
                                LogLevel::Debug,
                                &format!(
                                    "Invalidating attribute '{attr}' on existing resource {label}"
                                ),
                            );
                        }
                    }
                    OverrideStep::Set(attr, value) => {
                        sink.emit(
                            LogLevel::Debug,
                            &format!(
                                "Setting value of '{attr}' to {value} on existing resource {label}"
                            ),
                        );
                        entry.set(&attr, value);
                    }
                }
            }
            Outcome::Overridden
        }
    }
}
