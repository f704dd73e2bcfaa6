use anyhow::{Context, Result};
use reconcile::{DeclarationConfig, LogLevel, Mode, Value};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// Policy Schema
// ============================================================================

/// The deferred policy file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    /// Mode for every pass that does not set its own
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Log level for every pass that does not set its own
    #[serde(default)]
    pub log_level: Option<LogLevel>,

    /// Default catalog path when none is given on the command line
    #[serde(default)]
    pub catalog: Option<String>,

    /// Packages to remove or install
    #[serde(default)]
    pub packages: Option<CategoryPolicy>,

    /// Users to remove or install
    #[serde(default)]
    pub users: Option<CategoryPolicy>,

    /// Groups to remove or install
    #[serde(default)]
    pub groups: Option<CategoryPolicy>,

    /// Files to remove or install
    #[serde(default)]
    pub files: Option<CategoryPolicy>,

    /// Raw declarations of any resource type
    #[serde(default)]
    pub custom: Vec<DeclarationConfig>,
}

impl PolicyConfig {
    /// Load a policy file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read policy file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid policy file: {}", path.display()))
    }

    /// Parse policy TOML
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid TOML format in deferred policy")
    }

    /// Expanded default catalog path, if the policy names one
    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog
            .as_deref()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
    }
}

/// Removal and installation policy for one resource category
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPolicy {
    /// Resources to make absent: list of names or mapping of name to options
    #[serde(default)]
    pub remove: Option<Value>,

    /// Resources to make present: list of names or mapping of name to options
    #[serde(default)]
    pub install: Option<Value>,

    /// `ensure` value for installed resources
    #[serde(default)]
    pub install_ensure: Option<String>,

    /// Allow the install pass to override attributes of existing entries
    #[serde(default)]
    pub update_existing_resources: bool,

    /// Override rules for the install pass
    #[serde(default)]
    pub override_existing_attributes: Option<Value>,

    /// Mode for this category's passes
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Log level for this category's passes
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}
