//! Resource normalizer
//!
//! Turns the desired resources, written either as a list of bare names or
//! as a mapping of name to options, into one canonical table where every
//! entry carries a fully merged option set.

use crate::error::{ConfigError, Result};
use crate::types::{OptionSet, Value};
use indexmap::IndexMap;

/// Canonical table of desired resources, keyed by resource name
pub type ResourceTable = IndexMap<String, OptionSet>;

/// The desired resources as written by the user
///
/// Resolved once from a [`Value`]; nothing past this point branches on the
/// input shape.
#[derive(Debug, Clone, PartialEq)]
pub enum DesiredResources {
    /// Bare names, options default to empty
    Names(Vec<String>),
    /// Name to entry-specific options
    Table(IndexMap<String, OptionSet>),
}

impl DesiredResources {
    /// Number of named resources
    pub fn len(&self) -> usize {
        match self {
            Self::Names(names) => names.len(),
            Self::Table(table) => table.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TryFrom<&Value> for DesiredResources {
    type Error = ConfigError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(ConfigError::InvalidResourceName {
                        found: other.kind(),
                    }),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::Names),
            Value::Map(map) => Ok(Self::Table(
                map.iter()
                    .map(|(name, opts)| (name.clone(), entry_options(opts)))
                    .collect(),
            )),
            other => Err(ConfigError::InvalidSpecShape {
                found: other.kind(),
            }),
        }
    }
}

impl TryFrom<Value> for DesiredResources {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

// Anything that is not a mapping (null, or a stray scalar) means "no options".
fn entry_options(value: &Value) -> OptionSet {
    match value {
        Value::Map(map) => OptionSet::from(map.clone()),
        _ => OptionSet::new(),
    }
}

/// Parse default options; null means none
pub fn default_options(value: &Value) -> Result<OptionSet> {
    match value {
        Value::Null => Ok(OptionSet::new()),
        Value::Map(map) => Ok(OptionSet::from(map.clone())),
        other => Err(ConfigError::InvalidDefaultOptions {
            found: other.kind(),
        }),
    }
}

/// Merge every entry over `defaults` and pin its `name`
///
/// The entry's own options win over the defaults key by key. `name` is set
/// to the table key unless the entry itself supplied a non-null `name`; a
/// `name` coming only from the defaults is replaced.
pub fn normalize(resources: &DesiredResources, defaults: &OptionSet) -> ResourceTable {
    let empty = OptionSet::new();
    let entries: Vec<(&String, &OptionSet)> = match resources {
        DesiredResources::Names(names) => names.iter().map(|n| (n, &empty)).collect(),
        DesiredResources::Table(table) => table.iter().collect(),
    };

    entries
        .into_iter()
        .map(|(name, entry)| {
            let mut options = OptionSet::merged(defaults, entry);
            let explicit_name = entry.get("name").is_some_and(|v| !v.is_null());
            if !explicit_name {
                options.insert("name", name.clone());
            }
            (name.clone(), options)
        })
        .collect()
}

/// Shape-check and normalize in one step
pub fn normalize_value(resources: &Value, defaults: &Value) -> Result<ResourceTable> {
    let resources = DesiredResources::try_from(resources)?;
    let defaults = default_options(defaults)?;
    Ok(normalize(&resources, &defaults))
}
