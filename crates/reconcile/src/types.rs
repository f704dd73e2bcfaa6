//! Core types for catalog reconciliation

use crate::error::{ConfigError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A loosely-typed attribute or configuration value
///
/// Configuration front ends hand over whatever shape the user wrote, so the
/// engine keeps the full data model and only narrows it at the points where
/// a specific shape is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Explicit null; distinct from an absent key
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Integer(i64),
    /// Floating point number
    Float(f64),
    /// String
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// Ordered mapping
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Short name of the value's shape, for error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a boolean",
            Self::Integer(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a mapping",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(map) => write_pairs(f, map.iter()),
        }
    }
}

fn write_pairs<'a>(
    f: &mut fmt::Formatter<'_>,
    pairs: impl Iterator<Item = (&'a String, &'a Value)>,
) -> fmt::Result {
    write!(f, "{{")?;
    for (i, (key, value)) in pairs.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{key} => {value}")?;
    }
    write!(f, "}}")
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<OptionSet> for Value {
    fn from(options: OptionSet) -> Self {
        Self::Map(options.0)
    }
}

/// An ordered attribute bag for a single resource
///
/// Merging is shallow and right-biased: see [`OptionSet::merged`]. A key
/// holding [`Value::Null`] is still present; callers that care about the
/// difference check [`OptionSet::get`] for `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(IndexMap<String, Value>);

impl OptionSet {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a key, keeping the order of the remaining keys
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Shallow right-biased union: every key of `overrides` wins over the
    /// same key in `defaults`; nested values are never merged.
    pub fn merged(defaults: &OptionSet, overrides: &OptionSet) -> OptionSet {
        let mut merged = defaults.clone();
        for (key, value) in overrides {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }

    /// Copy of this set with `key` removed
    pub fn without(&self, key: &str) -> OptionSet {
        let mut copy = self.clone();
        copy.remove(key);
        copy
    }
}

impl From<IndexMap<String, Value>> for OptionSet {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_pairs(f, self.0.iter())
    }
}

/// The category of a catalog resource, e.g. `Package` or `File`
///
/// Type names are case-insensitive; the canonical form capitalizes every
/// `::`-separated segment, which is what lookups and log labels use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceType(String);

impl ResourceType {
    /// Canonicalize a raw type name
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let invalid = || ConfigError::InvalidResourceType(raw.to_string());

        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        for segment in trimmed.split("::") {
            if segment.is_empty() || segment.chars().any(char::is_whitespace) {
                return Err(invalid());
            }
            segments.push(capitalize(segment));
        }

        Ok(Self(segments.join("::")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Log label for a resource of this type, e.g. `Package[vim]`
    pub fn label(&self, name: &str) -> String {
        format!("{}[{}]", self.0, name)
    }
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ResourceType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ResourceType {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(&s)
    }
}

impl From<ResourceType> for String {
    fn from(kind: ResourceType) -> Self {
        kind.0
    }
}

/// Whether reconciliation mutates the catalog or only reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Mutate the catalog to realize the desired state
    Enforcing,
    /// Report what would change, never mutate
    #[default]
    Warning,
}

impl Mode {
    pub fn is_enforcing(self) -> bool {
        matches!(self, Self::Enforcing)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforcing => write!(f, "enforcing"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "enforcing" => Ok(Self::Enforcing),
            "warning" => Ok(Self::Warning),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// Severity used for drift and projection notices
///
/// The level only affects how messages are emitted, never control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    #[default]
    Warning,
    Err,
    Alert,
    Crit,
    Emerg,
}

impl LogLevel {
    /// All levels, least severe first
    pub const ALL: [LogLevel; 8] = [
        Self::Debug,
        Self::Info,
        Self::Notice,
        Self::Warning,
        LogLevel::Err,
        Self::Alert,
        Self::Crit,
        Self::Emerg,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warning => "warning",
            LogLevel::Err => "err",
            Self::Alert => "alert",
            Self::Crit => "crit",
            Self::Emerg => "emerg",
        }
    }

    /// Closest `log` crate level
    pub fn as_log_level(self) -> log::Level {
        match self {
            Self::Debug => log::Level::Debug,
            Self::Info | Self::Notice => log::Level::Info,
            Self::Warning => log::Level::Warn,
            LogLevel::Err | Self::Alert | Self::Crit | Self::Emerg => log::Level::Error,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, ConfigError> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| ConfigError::InvalidLogLevel(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_type_canonical_form() {
        assert_eq!(ResourceType::new("package").unwrap().as_str(), "Package");
        assert_eq!(ResourceType::new("FILE").unwrap().as_str(), "File");
        assert_eq!(ResourceType::new(" user ").unwrap().as_str(), "User");
        assert_eq!(
            ResourceType::new("concat::FRAGMENT").unwrap().as_str(),
            "Concat::Fragment"
        );
    }

    #[test]
    fn test_resource_type_is_case_insensitive() {
        assert_eq!(
            ResourceType::new("Package").unwrap(),
            ResourceType::new("pACKAGE").unwrap()
        );
    }

    #[test]
    fn test_resource_type_rejects_empty() {
        assert!(ResourceType::new("").is_err());
        assert!(ResourceType::new("   ").is_err());
        assert!(ResourceType::new("foo::").is_err());
        assert!(ResourceType::new("two words").is_err());
    }

    #[test]
    fn test_resource_type_label() {
        let kind = ResourceType::new("file").unwrap();
        assert_eq!(kind.label("/tmp/test"), "File[/tmp/test]");
    }

    #[test]
    fn test_merged_is_shallow_and_right_biased() {
        let defaults: OptionSet = [
            ("ensure", Value::from("absent")),
            ("tags", Value::from(vec!["a", "b"])),
        ]
        .into_iter()
        .collect();
        let entry: OptionSet = [("tags", Value::from(vec!["c"]))].into_iter().collect();

        let merged = OptionSet::merged(&defaults, &entry);
        assert_eq!(merged.get("ensure"), Some(&Value::from("absent")));
        assert_eq!(merged.get("tags"), Some(&Value::from(vec!["c"])));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut options: OptionSet = [("a", 1_i64), ("b", 2), ("c", 3)].into_iter().collect();
        options.remove("b");
        assert_eq!(options.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_option_set_display() {
        let options: OptionSet = [
            ("ensure", Value::from("absent")),
            ("uid", Value::from(42_i64)),
            ("groups", Value::from(vec!["wheel"])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            options.to_string(),
            r#"{ensure => "absent", uid => 42, groups => ["wheel"]}"#
        );
        assert_eq!(OptionSet::new().to_string(), "{}");
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("enforcing".parse::<Mode>().unwrap(), Mode::Enforcing);
        assert_eq!("Warning".parse::<Mode>().unwrap(), Mode::Warning);
        assert!("enforce".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Warning);
    }

    #[test]
    fn test_log_level_parse_and_map() {
        assert_eq!("notice".parse::<LogLevel>().unwrap(), LogLevel::Notice);
        assert!("verbose".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::default(), LogLevel::Warning);
        assert_eq!(LogLevel::Notice.as_log_level(), log::Level::Info);
        assert_eq!(LogLevel::Crit.as_log_level(), log::Level::Error);
    }
}
