//! Info command - show what upload or download would act on

use crate::cache::{self, Plan};
use crate::cli::args::{InfoArgs, OutputFormat};
use crate::config::Settings;
use crate::error::CacheResult;
use crate::ui::{self, UiContext};

/// Execute the info command
pub async fn execute(args: InfoArgs, settings: &Settings) -> CacheResult<()> {
    let plan = cache::plan(settings)?;

    match args.format {
        OutputFormat::Plain => print_plain(&plan, settings),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
    }

    Ok(())
}

fn print_plain(plan: &Plan, settings: &Settings) {
    let ctx = UiContext::detect();

    ui::heading(&ctx, "Bundle cache");
    ui::field(&ctx, "Project", &settings.path.display().to_string());
    ui::field(&ctx, "Prefix", &plan.prefix);
    ui::field(&ctx, "Lockfile", &plan.digest);
    ui::field(&ctx, "Arch", &plan.arch);
    ui::field(&ctx, "Key", &plan.key);
    ui::field(&ctx, "Location", &plan.location);
    ui::field(&ctx, "Staging", &plan.staging.display().to_string());
    ui::bundle_state(&ctx, plan.state);
}
