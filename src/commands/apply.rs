use anyhow::Result;

use crate::Context;
use crate::cli::ApplyArgs;
use crate::config;
use crate::engine::{self, ApplyOptions};
use crate::policy::{self, PassOverrides};
use crate::ui;

pub fn run(ctx: &Context, args: ApplyArgs) -> Result<()> {
    let (policy, policy_path) = config::load_policy(args.config.as_deref())?;
    let overrides = PassOverrides {
        mode: args.mode.map(Into::into),
        log_level: args.log_level.map(Into::into),
    };
    let decls = policy::declarations(&policy, overrides)?;

    if decls.is_empty() {
        ui::info(&format!(
            "No deferred resources in {}",
            policy_path.display()
        ));
        return Ok(());
    }

    let catalog_path = config::catalog_path(args.catalog.as_deref(), &policy)?;
    let mut catalog = config::load_catalog(&catalog_path)?;
    let before = config::render_catalog(&catalog)?;

    if !ctx.quiet {
        ui::header("Deferred Resources");
        ui::kv("Policy", &policy_path.display().to_string());
        ui::kv("Catalog", &catalog_path.display().to_string());
        ui::kv("Passes", &decls.len().to_string());
    }

    let opts = ApplyOptions {
        yes: args.yes,
        verbose: ctx.verbose > 0,
    };
    let Some(summary) = engine::execute(&decls, &mut catalog, &opts)? else {
        return Ok(());
    };

    let after = config::render_catalog(&catalog)?;
    if args.diff {
        engine::display_catalog_diff(&before, &after);
    }

    let target = args.output.as_deref().map(config::expand);
    match target {
        Some(output) => {
            config::save_catalog(&catalog, &output)?;
            ui::success(&format!("Wrote catalog to {}", output.display()));
        }
        None if summary.total_changes() > 0 => {
            config::save_catalog(&catalog, &catalog_path)?;
            ui::success(&format!("Updated {}", catalog_path.display()));
        }
        None => log::debug!("Catalog unchanged, not writing {}", catalog_path.display()),
    }

    Ok(())
}
