//! Declarations: one validated reconciliation pass
//!
//! A [`DeclarationConfig`] is the loosely-typed input, deserialized from a
//! policy file or filled in through its builder methods. [`build`] validates
//! all of it up front, so a pass either starts with a complete
//! [`Declaration`] or never starts at all.
//!
//! [`build`]: DeclarationConfig::build

use crate::error::{ConfigError, Result};
use crate::normalize::{self, DesiredResources, ResourceTable};
use crate::rules::OverrideRules;
use crate::types::{LogLevel, Mode, OptionSet, ResourceType, Value};
use serde::Deserialize;

/// Unvalidated declaration settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeclarationConfig {
    /// Label used in reports
    pub name: String,
    /// Type of every resource in this pass
    pub resource_type: Option<String>,
    /// List of names, or mapping of name to options
    pub resources: Option<Value>,
    /// Options applied under every entry
    pub default_options: Option<Value>,
    /// Defaults to warning when unset
    pub mode: Option<Mode>,
    /// Defaults to warning when unset
    pub log_level: Option<LogLevel>,
    /// List of attributes, or mapping of attribute to rule
    pub override_existing_attributes: Option<Value>,
}

impl DeclarationConfig {
    /// Start a declaration with a report label
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn resource_type(mut self, kind: impl Into<String>) -> Self {
        self.resource_type = Some(kind.into());
        self
    }

    pub fn resources(mut self, resources: impl Into<Value>) -> Self {
        self.resources = Some(resources.into());
        self
    }

    pub fn default_options(mut self, options: impl Into<Value>) -> Self {
        self.default_options = Some(options.into());
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = Some(level);
        self
    }

    pub fn override_existing_attributes(mut self, rules: impl Into<Value>) -> Self {
        self.override_existing_attributes = Some(rules.into());
        self
    }

    /// Validate and normalize into a [`Declaration`]
    pub fn build(self) -> Result<Declaration> {
        let kind = self
            .resource_type
            .as_deref()
            .ok_or(ConfigError::MissingResourceType)
            .and_then(ResourceType::new)?;

        let resources = self.resources.as_ref().ok_or(ConfigError::MissingResources)?;
        let resources = DesiredResources::try_from(resources)?;

        let defaults = match &self.default_options {
            Some(value) => normalize::default_options(value)?,
            None => OptionSet::new(),
        };

        let override_rules = self
            .override_existing_attributes
            .as_ref()
            .map(OverrideRules::try_from)
            .transpose()?;

        Ok(Declaration {
            name: self.name,
            resource_type: kind,
            resources: normalize::normalize(&resources, &defaults),
            mode: self.mode.unwrap_or_default(),
            log_level: self.log_level.unwrap_or_default(),
            override_rules,
        })
    }
}

impl TryFrom<DeclarationConfig> for Declaration {
    type Error = ConfigError;

    fn try_from(config: DeclarationConfig) -> Result<Self> {
        config.build()
    }
}

/// A validated, immutable reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    name: String,
    resource_type: ResourceType,
    resources: ResourceTable,
    mode: Mode,
    log_level: LogLevel,
    override_rules: Option<OverrideRules>,
}

impl Declaration {
    /// Start building a declaration
    pub fn builder(name: impl Into<String>) -> DeclarationConfig {
        DeclarationConfig::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Canonical resource table, in declaration order
    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
    }

    pub fn override_rules(&self) -> Option<&OverrideRules> {
        self.override_rules.as_ref()
    }

    /// Same pass under a different mode
    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(json: serde_json::Value) -> Value {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_defaults() {
        let decl = Declaration::builder("foo")
            .resource_type("package")
            .resources(vec!["mypackage"])
            .build()
            .unwrap();

        assert_eq!(decl.name(), "foo");
        assert_eq!(decl.resource_type().as_str(), "Package");
        assert_eq!(decl.mode(), Mode::Warning);
        assert_eq!(decl.log_level(), LogLevel::Warning);
        assert!(decl.override_rules().is_none());
        assert_eq!(
            decl.resources()["mypackage"].get("name"),
            Some(&Value::from("mypackage"))
        );
    }

    #[test]
    fn test_missing_resource_type() {
        let err = Declaration::builder("foo")
            .resources(vec!["foo"])
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingResourceType);
        assert!(err.to_string().contains("must specify a resource type"));
    }

    #[test]
    fn test_missing_resources() {
        let err = Declaration::builder("foo")
            .resource_type("package")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingResources);
    }

    #[test]
    fn test_string_resources_fail_before_anything_else() {
        let err = Declaration::builder("foo")
            .resource_type("package")
            .resources("mypackage")
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidSpecShape { found: "a string" });
    }

    #[test]
    fn test_invalid_default_options() {
        let err = Declaration::builder("foo")
            .resource_type("package")
            .resources(vec!["mypackage"])
            .default_options("foo")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDefaultOptions { .. }));
    }

    #[test]
    fn test_invalid_override_rules() {
        let err = Declaration::builder("foo")
            .resource_type("file")
            .mode(Mode::Enforcing)
            .resources(v(serde_json::json!({"/tmp/test": {"mode": "0777"}})))
            .override_existing_attributes(v(serde_json::json!({
                "owner": null,
                "content": {"invalidates": "cheese"}
            })))
            .build()
            .unwrap_err();
        assert!(
            err.to_string()
                .contains("you must pass a list of attributes to invalidate for 'content'")
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let config: DeclarationConfig = serde_json::from_value(serde_json::json!({
            "name": "deferred Package remove",
            "resource_type": "package",
            "resources": ["telnet"],
            "default_options": {"ensure": "absent"},
            "mode": "enforcing",
            "log_level": "debug"
        }))
        .unwrap();

        let decl = config.build().unwrap();
        assert_eq!(decl.mode(), Mode::Enforcing);
        assert_eq!(decl.log_level(), LogLevel::Debug);
        assert_eq!(
            decl.resources()["telnet"].get("ensure"),
            Some(&Value::from("absent"))
        );
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_value::<DeclarationConfig>(serde_json::json!({
            "resource_type": "package",
            "resourcez": ["telnet"]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_with_mode() {
        let decl = Declaration::builder("foo")
            .resource_type("package")
            .resources(vec!["a"])
            .build()
            .unwrap();
        let enforcing = decl.with_mode(Mode::Enforcing);
        assert_eq!(enforcing.mode(), Mode::Enforcing);
        assert_eq!(enforcing.resources(), decl.resources());
    }
}
