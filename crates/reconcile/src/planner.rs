//! Decision planner - decides what to do with each desired resource
//!
//! Deciding is kept apart from applying. [`decide`] looks at one desired
//! entry and whatever the catalog already holds under the same type and
//! title, and returns an [`Action`] without touching anything. The executor
//! then applies that action against the catalog and the message sink.
//!
//! | existing | override rules | enforcing              | warning         |
//! |----------|----------------|------------------------|-----------------|
//! | no       | any            | `Create`               | `WouldCreate`   |
//! | yes      | none           | `Ignore` / `Drift`     | `Ignore` / `Drift` |
//! | yes      | configured     | `Override` / `Ignore`  | `WouldOverride` / `Ignore` |
//!
//! With rules configured, `Ignore` means no rule's attribute is carried by
//! the desired options.

use crate::catalog::{Catalog, CatalogEntry, Origin};
use crate::declaration::Declaration;
use crate::diff::{AttributeDrift, drifted_attributes};
use crate::rules::OverrideRules;
use crate::types::{Mode, OptionSet, Value};

/// One mutation of an existing entry's attributes
#[derive(Debug, Clone, PartialEq)]
pub enum OverrideStep {
    /// Unset the attribute if it is currently set
    Invalidate(String),
    /// Replace the attribute's value
    Set(String, Value),
}

/// What reconciliation does with one desired resource
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Insert a new entry (enforcing)
    Create,
    /// Report the entry that would be inserted (warning)
    WouldCreate,
    /// The existing entry already satisfies the desired options
    Ignore,
    /// The existing entry differs; reported, never changed
    Drift {
        /// Declaration site of the existing entry
        origin: Origin,
        /// Desired attributes the existing entry does not match
        attributes: Vec<AttributeDrift>,
    },
    /// Mutate the existing entry in place (enforcing)
    Override {
        /// Ordered invalidations and assignments
        steps: Vec<OverrideStep>,
    },
    /// Report the attributes that would be overridden (warning)
    WouldOverride {
        /// Rule attributes carried by the desired options, in rule order
        attributes: Vec<String>,
    },
}

impl Action {
    /// Whether applying this action mutates the catalog
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Create | Self::Override { .. })
    }

    /// Whether this action reports a change that was held back
    pub fn is_projection(&self) -> bool {
        matches!(self, Self::WouldCreate | Self::WouldOverride { .. })
    }
}

/// A decision for one entry of a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Canonical resource name (the catalog title)
    pub name: String,
    /// `Type[name]`
    pub label: String,
    /// Fully merged desired options
    pub options: OptionSet,
    pub action: Action,
}

/// Decide what to do with one desired entry
///
/// `existing` is the catalog entry of the same type under the same title, if
/// any. Pure: the same inputs always yield the same action.
pub fn decide(
    options: &OptionSet,
    existing: Option<&dyn CatalogEntry>,
    rules: Option<&OverrideRules>,
    mode: Mode,
) -> Action {
    let Some(existing) = existing else {
        return if mode.is_enforcing() {
            Action::Create
        } else {
            Action::WouldCreate
        };
    };

    let Some(rules) = rules else {
        let drift = drifted_attributes(options, existing.attributes());
        return if drift.is_empty() {
            Action::Ignore
        } else {
            Action::Drift {
                origin: existing.origin().clone(),
                attributes: drift,
            }
        };
    };

    let steps = override_steps(options, rules);
    if steps.is_empty() {
        return Action::Ignore;
    }

    if mode.is_enforcing() {
        Action::Override { steps }
    } else {
        Action::WouldOverride {
            attributes: steps
                .into_iter()
                .filter_map(|step| match step {
                    OverrideStep::Set(attr, _) => Some(attr),
                    OverrideStep::Invalidate(_) => None,
                })
                .collect(),
        }
    }
}

/// Ordered override steps for the rules the desired options trigger
///
/// A rule acts only when the options carry its attribute with a non-null
/// value. Its invalidations come first, then the assignment.
pub fn override_steps(options: &OptionSet, rules: &OverrideRules) -> Vec<OverrideStep> {
    let mut steps = Vec::new();
    for (attr, rule) in rules.iter() {
        let Some(value) = options.get(attr).filter(|v| !v.is_null()) else {
            continue;
        };
        steps.extend(
            rule.invalidates
                .iter()
                .map(|name| OverrideStep::Invalidate(name.clone())),
        );
        steps.push(OverrideStep::Set(attr.to_string(), value.clone()));
    }
    steps
}

/// Decide every entry of a declaration without mutating the catalog
///
/// Each entry is decided against the catalog as it is now. Declarations
/// never name the same title twice, so this matches what reconciling would
/// do entry by entry.
pub fn plan(decl: &Declaration, catalog: &dyn Catalog) -> Vec<Decision> {
    let kind = decl.resource_type();
    decl.resources()
        .iter()
        .map(|(name, options)| Decision {
            name: name.clone(),
            label: kind.label(name),
            options: options.clone(),
            action: decide(
                options,
                catalog.find(kind, name),
                decl.override_rules(),
                decl.mode(),
            ),
        })
        .collect()
}
