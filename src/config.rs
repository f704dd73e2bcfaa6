use anyhow::{Context, Result};
use reconcile::MemoryCatalog;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::PolicyConfig;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("deferred"))
}

/// Expand `~` in a user-supplied path
pub fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref())
}

/// Resolve the policy file path
///
/// `--config` (which clap also fills from `$DEFERRED_CONFIG`) wins over the
/// default location.
pub fn policy_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(expand(path)),
        None => Ok(config_dir()?.join("config.toml")),
    }
}

/// Load the policy file
///
/// An explicitly named file must exist; a missing default file means an
/// empty policy.
pub fn load_policy(explicit: Option<&Path>) -> Result<(PolicyConfig, PathBuf)> {
    let path = policy_path(explicit)?;

    if explicit.is_none() && !path.exists() {
        log::info!("No policy file at {}, nothing to reconcile", path.display());
        return Ok((PolicyConfig::default(), path));
    }

    let policy = PolicyConfig::load(&path)?;
    log::debug!("Loaded policy from {}", path.display());
    Ok((policy, path))
}

/// Pick the catalog path from the command line or the policy file
pub fn catalog_path(explicit: Option<&Path>, policy: &PolicyConfig) -> Result<PathBuf> {
    explicit
        .map(expand)
        .or_else(|| policy.catalog_path())
        .context("No catalog given: pass --catalog or set `catalog` in the policy file")
}

/// Load a catalog exported as JSON
pub fn load_catalog(path: &Path) -> Result<MemoryCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read catalog: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid catalog format: {}", path.display()))
}

/// Render a catalog the way it is written to disk
pub fn render_catalog(catalog: &MemoryCatalog) -> Result<String> {
    let mut content = serde_json::to_string_pretty(catalog).context("Failed to serialize catalog")?;
    content.push('\n');
    Ok(content)
}

/// Write a catalog as JSON, creating parent directories
pub fn save_catalog(catalog: &MemoryCatalog, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create directory: {}", parent.display()))?;
    }
    fs::write(path, render_catalog(catalog)?)
        .with_context(|| format!("Could not write catalog: {}", path.display()))
}
