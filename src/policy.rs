//! Expands a policy file into reconciliation passes

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use reconcile::{Declaration, DeclarationConfig, LogLevel, Mode, Value};

use crate::schema::{CategoryPolicy, PolicyConfig};

/// A built-in resource category of the policy file
struct Category {
    resource_type: &'static str,
    install_ensure: &'static str,
    builtin_rules: Option<fn() -> Value>,
}

const PACKAGES: Category = Category {
    resource_type: "package",
    install_ensure: "installed",
    builtin_rules: None,
};

const USERS: Category = Category {
    resource_type: "user",
    install_ensure: "present",
    builtin_rules: None,
};

const GROUPS: Category = Category {
    resource_type: "group",
    install_ensure: "present",
    builtin_rules: None,
};

const FILES: Category = Category {
    resource_type: "file",
    install_ensure: "present",
    builtin_rules: Some(file_rules),
};

/// Rules used by `[files] update_existing_resources` when none are given
fn file_rules() -> Value {
    let invalidates = |attr: &str| {
        let mut rule = IndexMap::new();
        rule.insert("invalidates".to_string(), Value::from(vec![attr]));
        Value::Map(rule)
    };

    let mut rules = IndexMap::new();
    rules.insert("owner".to_string(), Value::Null);
    rules.insert("group".to_string(), Value::Null);
    rules.insert("mode".to_string(), Value::Null);
    rules.insert("content".to_string(), invalidates("source"));
    rules.insert("source".to_string(), invalidates("content"));
    Value::Map(rules)
}

/// Settings that replace whatever the policy file says, for every pass
#[derive(Debug, Clone, Copy, Default)]
pub struct PassOverrides {
    pub mode: Option<Mode>,
    pub log_level: Option<LogLevel>,
}

/// Unvalidated passes in execution order
///
/// Categories come first (packages, users, groups, files), each with its
/// remove pass before its install pass, then the custom declarations.
pub fn pass_configs(
    policy: &PolicyConfig,
    overrides: PassOverrides,
) -> Result<Vec<DeclarationConfig>> {
    let categories = [
        (&PACKAGES, &policy.packages),
        (&USERS, &policy.users),
        (&GROUPS, &policy.groups),
        (&FILES, &policy.files),
    ];

    let mut passes = Vec::new();
    for (category, settings) in categories {
        if let Some(settings) = settings {
            passes.extend(category_passes(category, settings)?);
        }
    }
    passes.extend(policy.custom.iter().cloned());

    for pass in &mut passes {
        pass.mode = overrides.mode.or(pass.mode).or(policy.mode);
        pass.log_level = overrides.log_level.or(pass.log_level).or(policy.log_level);
    }

    Ok(passes)
}

fn category_passes(category: &Category, settings: &CategoryPolicy) -> Result<Vec<DeclarationConfig>> {
    let kind = reconcile::ResourceType::new(category.resource_type)?;
    let mut passes = Vec::new();

    if let Some(remove) = non_empty(settings.remove.as_ref()) {
        passes.push(
            DeclarationConfig::new(format!("deferred {kind} remove"))
                .resource_type(category.resource_type)
                .resources(remove.clone())
                .default_options(ensure(Value::from("absent"))),
        );
    }

    if let Some(install) = non_empty(settings.install.as_ref()) {
        let install_ensure = settings
            .install_ensure
            .as_deref()
            .unwrap_or(category.install_ensure);

        let mut pass = DeclarationConfig::new(format!("deferred {kind} install"))
            .resource_type(category.resource_type)
            .resources(install.clone())
            .default_options(ensure(Value::from(install_ensure)));

        if settings.update_existing_resources {
            let rules = match (&settings.override_existing_attributes, category.builtin_rules) {
                (Some(rules), _) => rules.clone(),
                (None, Some(builtin)) => builtin(),
                (None, None) => bail!(
                    "update_existing_resources for {kind} needs override_existing_attributes"
                ),
            };
            pass = pass.override_existing_attributes(rules);
        } else if settings.override_existing_attributes.is_some() {
            log::warn!(
                "override_existing_attributes for {kind} is ignored without update_existing_resources"
            );
        }

        passes.push(pass);
    }

    for pass in &mut passes {
        pass.mode = settings.mode;
        pass.log_level = settings.log_level;
    }

    Ok(passes)
}

fn ensure(value: Value) -> Value {
    let mut options = IndexMap::new();
    options.insert("ensure".to_string(), value);
    Value::Map(options)
}

/// `None` for absent, null, or empty collections
fn non_empty(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::List(items) => !items.is_empty(),
        Value::Map(map) => !map.is_empty(),
        _ => true,
    })
}

/// Build and validate every pass of a policy
///
/// Fails on the first invalid pass, before anything is reconciled.
pub fn declarations(policy: &PolicyConfig, overrides: PassOverrides) -> Result<Vec<Declaration>> {
    pass_configs(policy, overrides)?
        .into_iter()
        .enumerate()
        .map(|(index, config)| {
            let label = if config.name.is_empty() {
                format!("pass #{}", index + 1)
            } else {
                format!("'{}'", config.name)
            };
            config
                .build()
                .with_context(|| format!("Invalid deferred resources in {label}"))
        })
        .collect()
}
