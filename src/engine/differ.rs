//! Plan computation and display

use colored::Colorize;
use reconcile::{
    Action, Decision, Declaration, MemoryCatalog, Mode, NoMessages, OverrideStep, plan, reconcile,
};

use crate::ui;

/// Decisions for one pass, as they would be taken in sequence
#[derive(Debug, Clone)]
pub struct PassPlan {
    pub name: String,
    pub mode: Mode,
    pub decisions: Vec<Decision>,
}

impl PassPlan {
    /// Decisions that would mutate the catalog
    pub fn mutations(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.action.is_mutation())
            .count()
    }

    /// Decisions held back by warning mode
    pub fn projections(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.action.is_projection())
            .count()
    }

    /// Decisions that report drift
    pub fn drifts(&self) -> usize {
        self.decisions
            .iter()
            .filter(|d| matches!(d.action, Action::Drift { .. }))
            .count()
    }
}

/// Decide every pass without touching `catalog`
///
/// Passes run against a scratch copy so that later passes see what earlier
/// enforcing passes would have added or changed.
pub fn preview(decls: &[Declaration], catalog: &MemoryCatalog) -> Vec<PassPlan> {
    let mut scratch = catalog.clone();
    decls
        .iter()
        .map(|decl| {
            let decisions = plan(decl, &scratch);
            reconcile(decl, &mut scratch, &mut NoMessages);
            PassPlan {
                name: decl.name().to_string(),
                mode: decl.mode(),
                decisions,
            }
        })
        .collect()
}

/// Display a list of pass plans in a user-friendly format
pub fn display_plan(plans: &[PassPlan], verbose: bool) {
    let changes: usize = plans.iter().map(|p| p.mutations() + p.projections()).sum();
    let drifts: usize = plans.iter().map(PassPlan::drifts).sum();

    if changes == 0 && drifts == 0 {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Deferred Resources".bold()
    );
    println!("│");

    for pass in plans {
        let shown: Vec<&Decision> = pass
            .decisions
            .iter()
            .filter(|d| verbose || d.action != Action::Ignore)
            .collect();
        if shown.is_empty() {
            continue;
        }

        let mode = match pass.mode {
            Mode::Enforcing => "enforcing".green(),
            Mode::Warning => "warning".yellow(),
        };
        println!("│ {} {}", pass.name.bold(), format!("({mode})").dimmed());

        for decision in shown {
            display_decision(decision);
        }
        println!("│");
    }

    let mutations: usize = plans.iter().map(PassPlan::mutations).sum();
    let projections: usize = plans.iter().map(PassPlan::projections).sum();

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} ({} enforced, {} warning only), {} drifted",
        ui::count(changes, "change").bold(),
        mutations.to_string().green(),
        projections.to_string().yellow(),
        drifts.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

fn display_decision(decision: &Decision) {
    match &decision.action {
        Action::Create | Action::WouldCreate => {
            let options = decision.options.without("name").to_string();
            println!(
                "│   {} {:<30} {}",
                "+".green(),
                decision.label,
                ui::truncate(&options, 60).dimmed()
            );
        }
        Action::Override { steps } => {
            println!("│   {} {}", "~".yellow(), decision.label);
            for step in steps {
                match step {
                    OverrideStep::Invalidate(attr) => {
                        println!("│       {} {}", "-".red(), attr.dimmed());
                    }
                    OverrideStep::Set(attr, value) => {
                        println!("│       {} {} => {}", "~".yellow(), attr, value);
                    }
                }
            }
        }
        Action::WouldOverride { attributes } => {
            println!(
                "│   {} {:<30} {}",
                "~".yellow(),
                decision.label,
                attributes.join(", ").dimmed()
            );
        }
        Action::Drift { origin, attributes } => {
            println!(
                "│   {} {:<30} {}",
                "!".red(),
                decision.label,
                format!("declared at {origin}").dimmed()
            );
            for drift in attributes {
                let existing = drift
                    .existing
                    .as_ref()
                    .map_or_else(|| "(unset)".to_string(), ToString::to_string);
                println!(
                    "│       {} {} → {}",
                    drift.attribute,
                    existing.dimmed(),
                    drift.desired
                );
            }
        }
        Action::Ignore => {
            println!("│   {} {}", "=".dimmed(), decision.label.dimmed());
        }
    }
}

/// Show a line diff between two renderings of the catalog
pub fn display_catalog_diff(before: &str, after: &str) {
    let diff = similar::TextDiff::from_lines(before, after);
    let mut has_changes = false;

    println!();
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => {
                has_changes = true;
                print!("    {}", format!("- {change}").red());
            }
            similar::ChangeTag::Insert => {
                has_changes = true;
                print!("    {}", format!("+ {change}").green());
            }
            similar::ChangeTag::Equal => {}
        }
    }

    if !has_changes {
        println!("    {}", "(catalog is unchanged)".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::{Catalog, OptionSet, ResourceType};

    fn packages(names: Vec<&str>, ensure: &str, mode: Mode) -> Declaration {
        let mut defaults = OptionSet::new();
        defaults.insert("ensure", ensure);
        Declaration::builder(format!("deferred Package {ensure}"))
            .resource_type("package")
            .resources(names)
            .default_options(defaults)
            .mode(mode)
            .build()
            .unwrap()
    }

    #[test]
    fn test_preview_leaves_catalog_alone() {
        let catalog = MemoryCatalog::new();
        let plans = preview(&[packages(vec!["aide"], "installed", Mode::Enforcing)], &catalog);

        assert!(catalog.is_empty());
        assert_eq!(plans[0].mutations(), 1);
        assert_eq!(plans[0].decisions[0].action, Action::Create);
    }

    #[test]
    fn test_preview_is_sequential() {
        let catalog = MemoryCatalog::new();
        let plans = preview(
            &[
                packages(vec!["aide"], "installed", Mode::Enforcing),
                packages(vec!["aide"], "absent", Mode::Enforcing),
            ],
            &catalog,
        );

        assert_eq!(plans[0].mutations(), 1);
        assert_eq!(plans[1].drifts(), 1);
    }

    #[test]
    fn test_preview_counts_projections() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(
            &ResourceType::new("package").unwrap(),
            "telnet",
            OptionSet::new(),
        );
        let plans = preview(
            &[packages(vec!["telnet", "rsh"], "absent", Mode::Warning)],
            &catalog,
        );

        assert_eq!(plans[0].projections(), 1);
        assert_eq!(plans[0].drifts(), 1);
        assert_eq!(plans[0].mutations(), 0);
    }
}
