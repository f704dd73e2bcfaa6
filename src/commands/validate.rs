use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::ValidateArgs;
use crate::config;
use crate::policy::{self, PassOverrides};
use crate::ui;

pub fn run(ctx: &Context, args: ValidateArgs) -> Result<()> {
    let (policy, policy_path) = config::load_policy(args.config.as_deref())?;
    let decls = policy::declarations(&policy, PassOverrides::default())?;

    if ctx.quiet {
        return Ok(());
    }

    ui::header("Policy");
    ui::kv("File", &policy_path.display().to_string());

    if decls.is_empty() {
        ui::dim("(no passes)");
    }

    for decl in &decls {
        let rules = decl.override_rules().map_or_else(String::new, |rules| {
            format!(
                " overrides {}",
                rules.attributes().collect::<Vec<_>>().join(", ")
            )
        });
        println!(
            "  {} {} {}{}",
            "•".cyan(),
            decl.name().bold(),
            format!(
                "{} {}, {}, {}",
                ui::count(decl.resources().len(), "resource"),
                decl.resource_type(),
                decl.mode(),
                decl.log_level()
            )
            .dimmed(),
            rules.dimmed()
        );
    }

    println!();
    ui::success(&format!(
        "Policy is valid ({})",
        ui::count(decls.len(), "pass")
    ));

    Ok(())
}
