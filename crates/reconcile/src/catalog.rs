//! Catalog traits for the compiled resource graph
//!
//! The catalog is owned by whatever compiled it. Reconciliation only needs
//! to look entries up by type and title, insert new ones, and edit the
//! attributes of an existing entry, so that is all these traits ask for.

use crate::error::CatalogError;
use crate::types::{OptionSet, ResourceType, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an entry was declared, used only in messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    /// Source file of the declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Line within the source file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Origin {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = &self.file {
            f.write_str(file)?;
        }
        f.write_str(":")?;
        if let Some(line) = self.line {
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

/// A single typed, named entry in the catalog
pub trait CatalogEntry {
    /// Current value of an attribute
    fn get(&self, attr: &str) -> Option<&Value>;

    /// Set an attribute, replacing any previous value
    fn set(&mut self, attr: &str, value: Value);

    /// Unset an attribute, returning the value it had
    fn remove(&mut self, attr: &str) -> Option<Value>;

    /// Every attribute currently set on the entry, including `name`
    fn attributes(&self) -> &OptionSet;

    /// Where the entry was declared
    fn origin(&self) -> &Origin;
}

/// The compiled resource graph
///
/// Implementations must make lookups and inserts infallible for the
/// duration of a pass; reconciliation never retries or rolls back.
pub trait Catalog {
    /// Look up an entry by canonical type and title
    fn find(&self, kind: &ResourceType, title: &str) -> Option<&dyn CatalogEntry>;

    /// Mutable lookup for in-place attribute overrides
    fn find_mut(&mut self, kind: &ResourceType, title: &str) -> Option<&mut dyn CatalogEntry>;

    /// Add a new entry. Callers only insert titles that `find` reported absent.
    fn insert(&mut self, kind: &ResourceType, title: &str, options: OptionSet);
}

/// A catalog entry held by [`MemoryCatalog`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogResource {
    /// Resource type
    #[serde(rename = "type")]
    pub kind: ResourceType,
    /// Title the entry is looked up by
    pub title: String,
    /// Declaration site
    #[serde(flatten)]
    pub origin: Origin,
    /// Attribute values
    #[serde(default)]
    pub attributes: OptionSet,
}

impl CatalogResource {
    /// Create an entry; `name` defaults to the title when not given
    pub fn new(kind: ResourceType, title: impl Into<String>, attributes: OptionSet) -> Self {
        let mut resource = Self {
            kind,
            title: title.into(),
            origin: Origin::default(),
            attributes,
        };
        resource.ensure_name();
        resource
    }

    /// Attach a declaration site
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// `Type[title]`
    pub fn label(&self) -> String {
        self.kind.label(&self.title)
    }

    fn ensure_name(&mut self) {
        if !self.attributes.contains_key("name") {
            self.attributes.insert("name", self.title.clone());
        }
    }
}

impl CatalogEntry for CatalogResource {
    fn get(&self, attr: &str) -> Option<&Value> {
        self.attributes.get(attr)
    }

    fn set(&mut self, attr: &str, value: Value) {
        self.attributes.insert(attr, value);
    }

    fn remove(&mut self, attr: &str) -> Option<Value> {
        self.attributes.remove(attr)
    }

    fn attributes(&self) -> &OptionSet {
        &self.attributes
    }

    fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// Insertion-ordered in-memory catalog
///
/// Serializes as a flat list of [`CatalogResource`] records, which is the
/// shape the CLI reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CatalogResource>", into = "Vec<CatalogResource>")]
pub struct MemoryCatalog {
    resources: IndexMap<(ResourceType, String), CatalogResource>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from records, rejecting duplicate type/title pairs
    pub fn from_resources(
        resources: impl IntoIterator<Item = CatalogResource>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for resource in resources {
            catalog.add(resource)?;
        }
        Ok(catalog)
    }

    /// Add a fully described entry, e.g. one declared by another manifest
    pub fn add(&mut self, mut resource: CatalogResource) -> Result<(), CatalogError> {
        let key = (resource.kind.clone(), resource.title.clone());
        if self.resources.contains_key(&key) {
            return Err(CatalogError::Duplicate(resource.label()));
        }
        resource.ensure_name();
        self.resources.insert(key, resource);
        Ok(())
    }

    /// Typed lookup, for callers that need the concrete record
    pub fn get(&self, kind: &ResourceType, title: &str) -> Option<&CatalogResource> {
        self.resources.get(&(kind.clone(), title.to_string()))
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &CatalogResource> {
        self.resources.values()
    }

    /// Entries of one type, in insertion order
    pub fn of_type<'a>(
        &'a self,
        kind: &'a ResourceType,
    ) -> impl Iterator<Item = &'a CatalogResource> + 'a {
        self.resources.values().filter(move |r| &r.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl Catalog for MemoryCatalog {
    fn find(&self, kind: &ResourceType, title: &str) -> Option<&dyn CatalogEntry> {
        self.get(kind, title).map(|r| r as &dyn CatalogEntry)
    }

    fn find_mut(&mut self, kind: &ResourceType, title: &str) -> Option<&mut dyn CatalogEntry> {
        self.resources
            .get_mut(&(kind.clone(), title.to_string()))
            .map(|r| r as &mut dyn CatalogEntry)
    }

    fn insert(&mut self, kind: &ResourceType, title: &str, options: OptionSet) {
        let resource = CatalogResource::new(kind.clone(), title, options);
        self.resources
            .insert((kind.clone(), title.to_string()), resource);
    }
}

impl TryFrom<Vec<CatalogResource>> for MemoryCatalog {
    type Error = CatalogError;

    fn try_from(resources: Vec<CatalogResource>) -> Result<Self, Self::Error> {
        Self::from_resources(resources)
    }
}

impl From<MemoryCatalog> for Vec<CatalogResource> {
    fn from(catalog: MemoryCatalog) -> Self {
        catalog.resources.into_values().collect()
    }
}
