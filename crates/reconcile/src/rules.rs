//! Override rules for existing catalog entries
//!
//! A rule names an attribute that reconciliation may overwrite on an entry
//! somebody else already declared, plus the attributes that become invalid
//! once it is overwritten (a file's `source` once `content` is set, say).

use crate::error::{ConfigError, Result};
use crate::types::Value;
use indexmap::IndexMap;

const INVALIDATES: &str = "invalidates";

/// Policy for one overridable attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideRule {
    /// Attributes removed from the existing entry before the override
    pub invalidates: Vec<String>,
}

impl OverrideRule {
    pub fn invalidating<I, S>(attrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            invalidates: attrs.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered, validated set of override rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideRules {
    rules: IndexMap<String, OverrideRule>,
}

impl OverrideRules {
    /// Build from already-typed rules; at least one is required
    pub fn new(rules: IndexMap<String, OverrideRule>) -> Result<Self> {
        if rules.is_empty() {
            return Err(ConfigError::EmptyOverrideRules);
        }
        Ok(Self { rules })
    }

    /// Rules with empty invalidation lists for each attribute
    pub fn from_attributes<I, S>(attrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            attrs
                .into_iter()
                .map(|a| (a.into(), OverrideRule::default()))
                .collect(),
        )
    }

    pub fn get(&self, attr: &str) -> Option<&OverrideRule> {
        self.rules.get(attr)
    }

    /// Rules in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OverrideRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl TryFrom<&Value> for OverrideRules {
    type Error = ConfigError;

    /// Accepts a list of attribute names or a mapping of attribute to
    /// `null` / `{invalidates: [...]}`.
    fn try_from(value: &Value) -> Result<Self> {
        let rules = match value {
            Value::List(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(attr) => Ok((attr.clone(), OverrideRule::default())),
                    other => Err(ConfigError::InvalidOverrideShape {
                        found: other.kind(),
                    }),
                })
                .collect::<Result<IndexMap<_, _>>>()?,
            Value::Map(map) => map
                .iter()
                .map(|(attr, rule)| Ok((attr.clone(), parse_rule(attr, rule)?)))
                .collect::<Result<IndexMap<_, _>>>()?,
            other => {
                return Err(ConfigError::InvalidOverrideShape {
                    found: other.kind(),
                });
            }
        };

        Self::new(rules)
    }
}

impl TryFrom<Value> for OverrideRules {
    type Error = ConfigError;

    fn try_from(value: Value) -> Result<Self> {
        Self::try_from(&value)
    }
}

fn parse_rule(attribute: &str, value: &Value) -> Result<OverrideRule> {
    let map = match value {
        Value::Null => return Ok(OverrideRule::default()),
        Value::Map(map) => map,
        other => {
            return Err(ConfigError::InvalidRule {
                attribute: attribute.to_string(),
                found: other.kind(),
            });
        }
    };

    let unknown: Vec<String> = map
        .keys()
        .filter(|k| k.as_str() != INVALIDATES)
        .cloned()
        .collect();
    if !unknown.is_empty() {
        return Err(ConfigError::UnknownControlOptions {
            attribute: attribute.to_string(),
            keys: unknown,
        });
    }

    let invalidates = match map.get(INVALIDATES) {
        None => Vec::new(),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(name.clone()),
                other => Err(ConfigError::InvalidInvalidatedAttribute {
                    attribute: attribute.to_string(),
                    found: other.kind(),
                }),
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => {
            return Err(ConfigError::InvalidatesNotList {
                attribute: attribute.to_string(),
            });
        }
    };

    Ok(OverrideRule { invalidates })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(json: serde_json::Value) -> Value {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_list_form() {
        let rules = OverrideRules::try_from(v(serde_json::json!(["owner", "group", "content"])))
            .unwrap();
        assert_eq!(
            rules.attributes().collect::<Vec<_>>(),
            vec!["owner", "group", "content"]
        );
        assert!(rules.iter().all(|(_, r)| r.invalidates.is_empty()));
    }

    #[test]
    fn test_mapping_form() {
        let rules = OverrideRules::try_from(v(serde_json::json!({
            "owner": null,
            "group": {},
            "content": {"invalidates": ["source"]}
        })))
        .unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules.get("owner"), Some(&OverrideRule::default()));
        assert_eq!(
            rules.get("content"),
            Some(&OverrideRule::invalidating(["source"]))
        );
    }

    #[test]
    fn test_unknown_control_option() {
        let err = OverrideRules::try_from(v(serde_json::json!({
            "owner": null,
            "content": {"watermelons": ["cheese"]}
        })))
        .unwrap_err();
        assert!(err.to_string().contains("unknown control options 'watermelons'"));
    }

    #[test]
    fn test_invalidates_must_be_a_list() {
        let err = OverrideRules::try_from(v(serde_json::json!({
            "content": {"invalidates": "cheese"}
        })))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidatesNotList {
                attribute: "content".to_string()
            }
        );
    }

    #[test]
    fn test_empty_rules_are_rejected() {
        assert_eq!(
            OverrideRules::try_from(v(serde_json::json!([]))).unwrap_err(),
            ConfigError::EmptyOverrideRules
        );
        assert_eq!(
            OverrideRules::try_from(v(serde_json::json!({}))).unwrap_err(),
            ConfigError::EmptyOverrideRules
        );
    }

    #[test]
    fn test_scalar_shapes_are_rejected() {
        assert!(OverrideRules::try_from(Value::from("owner")).is_err());
        assert!(OverrideRules::try_from(v(serde_json::json!({"owner": "yes"}))).is_err());
        assert!(OverrideRules::try_from(v(serde_json::json!([1]))).is_err());
        assert!(
            OverrideRules::try_from(v(serde_json::json!({"content": {"invalidates": [1]}})))
                .is_err()
        );
    }
}
