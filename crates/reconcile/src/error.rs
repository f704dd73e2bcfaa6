//! Error types for the reconcile crate
//!
//! Every error here is raised while a declaration is being constructed or a
//! catalog is being loaded. Once a [`Declaration`](crate::Declaration) exists,
//! reconciling it cannot fail.

use thiserror::Error;

/// Errors raised while validating a declaration's configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No resource type was given
    #[error("you must specify a resource type")]
    MissingResourceType,

    /// The resource type is empty or not a valid type name
    #[error("invalid resource type '{0}'")]
    InvalidResourceType(String),

    /// No desired resources were given
    #[error("you must specify the resources to reconcile")]
    MissingResources,

    /// The desired resources are neither a list nor a mapping
    #[error("expecting a mapping or a list for resources, got {found}")]
    InvalidSpecShape {
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// A bare resource name in a list is not a string
    #[error("resource names must be strings, got {found}")]
    InvalidResourceName {
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// The default options are not a mapping
    #[error("expecting a mapping for default options, got {found}")]
    InvalidDefaultOptions {
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// Override rules were given but contain nothing
    #[error("expecting a list or mapping with contents for override_existing_attributes")]
    EmptyOverrideRules,

    /// Override rules are neither a list nor a mapping
    #[error("expecting a list or mapping for override_existing_attributes, got {found}")]
    InvalidOverrideShape {
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// A rule is neither empty nor a mapping
    #[error("override rule for '{attribute}' must be a mapping, got {found}")]
    InvalidRule {
        /// Attribute the rule belongs to
        attribute: String,
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// A rule carries keys other than `invalidates`
    #[error(
        "unknown control options '{}' passed for '{attribute}' in override_existing_attributes",
        keys.join("', '")
    )]
    UnknownControlOptions {
        /// Attribute the rule belongs to
        attribute: String,
        /// The offending keys
        keys: Vec<String>,
    },

    /// A rule's `invalidates` value is not a list
    #[error("you must pass a list of attributes to invalidate for '{attribute}'")]
    InvalidatesNotList {
        /// Attribute the rule belongs to
        attribute: String,
    },

    /// A rule's `invalidates` list contains a non-string
    #[error("invalidated attribute names for '{attribute}' must be strings, got {found}")]
    InvalidInvalidatedAttribute {
        /// Attribute the rule belongs to
        attribute: String,
        /// Kind of value that was supplied
        found: &'static str,
    },

    /// Unknown reconciliation mode
    #[error("unknown mode '{0}', expected 'enforcing' or 'warning'")]
    InvalidMode(String),

    /// Unknown log level
    #[error(
        "unknown log level '{0}', expected one of debug, info, notice, warning, err, alert, crit, emerg"
    )]
    InvalidLogLevel(String),
}

/// Errors raised by catalog implementations owned by this crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two entries share a type and title
    #[error("duplicate declaration: {0} is already declared")]
    Duplicate(String),
}

/// Result type for configuration validation
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_control_options_lists_every_key() {
        let err = ConfigError::UnknownControlOptions {
            attribute: "content".to_string(),
            keys: vec!["watermelons".to_string(), "cheese".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown control options 'watermelons', 'cheese' passed for 'content' in override_existing_attributes"
        );
    }

    #[test]
    fn test_invalidates_not_list_names_attribute() {
        let err = ConfigError::InvalidatesNotList {
            attribute: "content".to_string(),
        };
        assert!(err.to_string().contains("'content'"));
    }
}
