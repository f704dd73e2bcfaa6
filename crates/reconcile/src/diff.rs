//! Drift detection between desired options and an existing entry

use crate::types::{OptionSet, Value};

/// One desired attribute the existing entry does not match
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDrift {
    pub attribute: String,
    pub desired: Value,
    /// `None` when the attribute is not set on the existing entry
    pub existing: Option<Value>,
}

/// Whether `desired` differs from `existing`
///
/// Containment, not equality: there is no drift when every desired
/// `(key, value)` pair is also set on the existing entry. Attributes only the
/// existing entry carries never count.
pub fn has_drift(desired: &OptionSet, existing: &OptionSet) -> bool {
    desired
        .iter()
        .any(|(key, value)| existing.get(key) != Some(value))
}

/// Every desired attribute that is missing from or different on `existing`
pub fn drifted_attributes(desired: &OptionSet, existing: &OptionSet) -> Vec<AttributeDrift> {
    desired
        .iter()
        .filter(|(key, value)| existing.get(key) != Some(*value))
        .map(|(key, value)| AttributeDrift {
            attribute: key.clone(),
            desired: value.clone(),
            existing: existing.get(key).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> OptionSet {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_extra_existing_attributes_are_not_drift() {
        let desired = set(&[("name", "vim"), ("ensure", "installed")]);
        let existing = set(&[
            ("name", "vim"),
            ("ensure", "installed"),
            ("provider", "yum"),
        ]);
        assert!(!has_drift(&desired, &existing));
        assert!(drifted_attributes(&desired, &existing).is_empty());
    }

    #[test]
    fn test_missing_desired_attribute_is_drift() {
        let desired = set(&[("name", "vim"), ("ensure", "installed")]);
        let existing = set(&[("name", "vim")]);
        assert!(has_drift(&desired, &existing));

        let drift = drifted_attributes(&desired, &existing);
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].attribute, "ensure");
        assert_eq!(drift[0].existing, None);
    }

    #[test]
    fn test_different_value_is_drift() {
        let desired = set(&[("name", "mypackage"), ("ensure", "installed")]);
        let existing = set(&[("name", "mypackage"), ("ensure", "absent")]);
        assert!(has_drift(&desired, &existing));
        assert_eq!(
            drifted_attributes(&desired, &existing)[0].existing,
            Some(Value::from("absent"))
        );
    }

    #[test]
    fn test_empty_desired_never_drifts() {
        assert!(!has_drift(&OptionSet::new(), &set(&[("name", "x")])));
    }

    #[test]
    fn test_null_is_a_value() {
        let mut desired = OptionSet::new();
        desired.insert("source", Value::Null);
        assert!(has_drift(&desired, &OptionSet::new()));
    }
}
