use anyhow::Result;

use crate::Context;
use crate::cli::PlanArgs;
use crate::config;
use crate::engine;
use crate::policy::{self, PassOverrides};
use crate::ui;
use reconcile::Mode;

/// Show what enforcing every pass would do, without writing anything
pub fn run(ctx: &Context, args: PlanArgs) -> Result<()> {
    let (policy, policy_path) = config::load_policy(args.config.as_deref())?;
    let overrides = PassOverrides {
        mode: Some(Mode::Enforcing),
        log_level: None,
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
    let catalog = config::load_catalog(&catalog_path)?;

    let plans = engine::preview(&decls, &catalog);
    engine::display_plan(&plans, ctx.verbose > 0);

    Ok(())
}
