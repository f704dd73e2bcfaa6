//! Execution engine - runs passes with confirmation and reporting

use anyhow::Result;
use colored::Colorize;
use reconcile::{Declaration, LogSink, MemoryCatalog, MessageSink, ReconcileSummary, reconcile};

use super::differ::{display_plan, preview};

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Skip confirmation prompts
    pub yes: bool,
    /// Show decisions that leave entries unchanged
    pub verbose: bool,
}

/// Reconcile every pass in order, reporting through `sink`
pub fn run_passes(
    decls: &[Declaration],
    catalog: &mut MemoryCatalog,
    sink: &mut dyn MessageSink,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    for decl in decls {
        let pass = reconcile(decl, catalog, sink);
        log::info!(
            "{}: {} created, {} overridden, {} drifted",
            decl.name(),
            pass.created,
            pass.overridden,
            pass.drifted
        );
        summary.merge(&pass);
    }
    summary
}

/// Preview, confirm, and reconcile every pass
///
/// Returns `None` when the user declined.
pub fn execute(
    decls: &[Declaration],
    catalog: &mut MemoryCatalog,
    opts: &ApplyOptions,
) -> Result<Option<ReconcileSummary>> {
    // 1. Show what enforcing passes will change
    let plans = preview(decls, catalog);
    let mutations: usize = plans.iter().map(|p| p.mutations()).sum();

    if mutations > 0 {
        display_plan(&plans, opts.verbose);

        // 2. Confirm (unless --yes)
        if !opts.yes && !confirm_proceed()? {
            println!();
            println!("  {} Aborted", "✗".red());
            return Ok(None);
        }
    }

    // 3. Reconcile
    let summary = run_passes(decls, catalog, &mut LogSink);

    // 4. Summary
    print_summary(&summary);

    Ok(Some(summary))
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Apply these changes to the catalog?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(summary: &ReconcileSummary) {
    println!();
    if summary.total_changes() > 0 {
        println!("  {} Deferred resources applied", "✓".green().bold());
    } else if summary.total_projected() > 0 {
        println!(
            "  {} Warning mode - catalog left unchanged",
            "ℹ".blue().bold()
        );
    } else {
        println!("  {} Catalog already satisfies the policy", "✓".green().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.overridden > 0 {
        println!("    • {} resources overridden", summary.overridden);
    }
    if summary.would_create > 0 {
        println!("    • {} resources would have been created", summary.would_create);
    }
    if summary.would_override > 0 {
        println!(
            "    • {} resources would have been overridden",
            summary.would_override
        );
    }
    if summary.drifted > 0 {
        println!("    • {} {} drifted", summary.drifted, "resources".yellow());
    }
    if summary.unchanged > 0 {
        println!("    • {} resources unchanged", summary.unchanged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Catalog, MessageLog, Mode, ResourceType};

    fn removal(mode: Mode) -> Declaration {
        Declaration::builder("deferred User remove")
            .resource_type("user")
            .resources(vec!["ftp", "games"])
            .mode(mode)
            .build()
            .unwrap()
    }

    #[test]
    fn test_run_passes_merges_summaries() {
        let installs = Declaration::builder("deferred Package install")
            .resource_type("package")
            .resources(vec!["aide"])
            .mode(Mode::Enforcing)
            .build()
            .unwrap();
        let mut catalog = MemoryCatalog::new();
        let mut log = MessageLog::new();

        let summary = run_passes(
            &[removal(Mode::Enforcing), installs],
            &mut catalog,
            &mut log,
        );

        assert_eq!(summary.created, 3);
        assert_eq!(catalog.len(), 3);
        assert_eq!(log.messages().len(), 3);
    }

    #[test]
    fn test_execute_with_yes_applies() {
        let mut catalog = MemoryCatalog::new();
        let opts = ApplyOptions {
            yes: true,
            ..Default::default()
        };

        let summary = execute(&[removal(Mode::Enforcing)], &mut catalog, &opts)
            .unwrap()
            .unwrap();

        assert_eq!(summary.created, 2);
        assert!(catalog.find(&ResourceType::new("user").unwrap(), "ftp").is_some());
    }

    #[test]
    fn test_execute_warning_needs_no_confirmation() {
        let mut catalog = MemoryCatalog::new();

        let summary = execute(&[removal(Mode::Warning)], &mut catalog, &ApplyOptions::default())
            .unwrap()
            .unwrap();

        assert_eq!(summary.would_create, 2);
        assert!(catalog.is_empty());
    }
}
