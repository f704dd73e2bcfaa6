use anyhow::{Result, bail};
use colored::Colorize;
use reconcile::{CatalogResource, MemoryCatalog, ResourceType};

use crate::Context;
use crate::cli::ShowArgs;
use crate::config;
use crate::ui;

pub fn run(ctx: &Context, args: ShowArgs) -> Result<()> {
    let path = config::expand(&args.catalog);
    let catalog = config::load_catalog(&path)?;
    let kind = args
        .resource_type
        .as_deref()
        .map(ResourceType::new)
        .transpose()?;

    let entries = select(&catalog, kind.as_ref(), args.name.as_deref());

    if entries.is_empty() {
        match (&kind, &args.name) {
            (_, Some(name)) => bail!("No catalog entry titled '{name}'"),
            (Some(kind), None) => ui::info(&format!("No {kind} entries in {}", path.display())),
            (None, None) => ui::info(&format!("{} is empty", path.display())),
        }
        return Ok(());
    }

    if args.name.is_some() {
        for entry in &entries {
            display_entry(entry);
        }
        return Ok(());
    }

    ui::header(&format!("Catalog entries ({})", entries.len()));
    for entry in &entries {
        let options = entry.attributes.without("name").to_string();
        println!(
            "  {} {:<40} {}",
            "•".cyan(),
            entry.label(),
            ui::truncate(&options, 60).dimmed()
        );
    }

    if ctx.verbose > 0 {
        println!();
        ui::dim(&format!("Loaded from {}", path.display()));
    }

    Ok(())
}

/// Entries matching an optional type and title, in catalog order
fn select<'a>(
    catalog: &'a MemoryCatalog,
    kind: Option<&ResourceType>,
    name: Option<&str>,
) -> Vec<&'a CatalogResource> {
    catalog
        .iter()
        .filter(|r| kind.is_none_or(|k| &r.kind == k))
        .filter(|r| name.is_none_or(|n| r.title == n))
        .collect()
}

fn display_entry(entry: &CatalogResource) {
    ui::section(&entry.label());
    if entry.origin.file.is_some() || entry.origin.line.is_some() {
        ui::kv("declared at", &entry.origin.to_string());
    }
    for (attr, value) in &entry.attributes {
        ui::kv(attr, &value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog {
        serde_json::from_str(
            r#"[
                {"type": "package", "title": "vim"},
                {"type": "file", "title": "/etc/issue"},
                {"type": "package", "title": "aide"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_select_by_type() {
        let catalog = catalog();
        let package = ResourceType::new("Package").unwrap();
        let titles: Vec<_> = select(&catalog, Some(&package), None)
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["vim", "aide"]);
    }

    #[test]
    fn test_select_by_name() {
        let catalog = catalog();
        assert_eq!(select(&catalog, None, Some("/etc/issue")).len(), 1);
        assert!(select(&catalog, None, Some("emacs")).is_empty());
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "[]").unwrap();

        let ctx = Context {
            verbose: 0,
            quiet: true,
        };
        let args = ShowArgs {
            catalog: path,
            resource_type: None,
            name: Some("vim".to_string()),
        };
        assert!(run(&ctx, args).is_err());
    }
}
