//! # Reconcile
//!
//! Post-compilation reconciliation of desired resources into a resource
//! catalog.
//!
//! A catalog is compiled first. Afterwards, a [`Declaration`] names resources
//! of one type that should be present, and reconciliation walks them in
//! order: absent entries are added, existing ones are left alone, reported as
//! drifted, or have selected attributes overridden. In warning mode nothing
//! is changed and every would-be change is reported instead.
//!
//! ## Core Concepts
//!
//! - **Declaration**: one validated pass, built from a [`DeclarationConfig`]
//! - **OptionSet**: ordered attribute bag with shallow right-biased merging
//! - **OverrideRules**: attributes that may overwrite existing entries, and
//!   what each one invalidates
//! - **Action**: the pure decision for one entry, see [`decide`]
//! - **MessageSink**: where every decision is reported
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{Declaration, LogSink, MemoryCatalog, Mode, reconcile};
//!
//! let decl = Declaration::builder("deferred Package remove")
//!     .resource_type("package")
//!     .resources(vec!["telnet", "rsh-server"])
//!     .default_options(serde_json::from_str::<reconcile::Value>(r#"{"ensure":"absent"}"#)?)
//!     .mode(Mode::Enforcing)
//!     .build()?;
//!
//! let mut catalog = MemoryCatalog::new();
//! let summary = reconcile(&decl, &mut catalog, &mut LogSink);
//! assert_eq!(summary.created, 2);
//! ```
//!
//! ## Collaborator Traits
//!
//! - [`Catalog`] / [`CatalogEntry`]: the compiled resource graph
//! - [`MessageSink`]: receives decision messages
//!
//! The crate never prints; [`LogSink`] forwards to the `log` facade.

pub mod catalog;
pub mod context;
pub mod declaration;
pub mod diff;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod planner;
pub mod rules;
pub mod types;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogEntry, CatalogResource, MemoryCatalog, Origin};
pub use context::{LogSink, Message, MessageLog, MessageSink, NoMessages};
pub use declaration::{Declaration, DeclarationConfig};
pub use diff::{AttributeDrift, drifted_attributes, has_drift};
pub use error::{CatalogError, ConfigError, Result};
pub use executor::{Outcome, ReconcileSummary, reconcile};
pub use normalize::{DesiredResources, ResourceTable, normalize};
pub use planner::{Action, Decision, OverrideStep, decide, plan};
pub use rules::{OverrideRule, OverrideRules};
pub use types::{LogLevel, Mode, OptionSet, ResourceType, Value};
