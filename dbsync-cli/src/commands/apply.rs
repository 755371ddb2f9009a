//! `dbsync apply` command - Merge a database snapshot into a model file.

use dbsync_merge::{
    MergeDirection, MergeExecutor, MergePlan, MergerContext, ModelChangeLog, SchemaDiffer,
};

use crate::cli::ApplyArgs;
use crate::commands::diff::load_schema;
use crate::config;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the apply command
pub async fn run(args: ApplyArgs) -> CliResult<()> {
    output::header("Apply To Model");

    let cwd = std::env::current_dir()?;
    let config = config::load(args.config.as_deref(), &cwd)?;

    let mut model = load_schema(&args.model)?;
    let target = load_schema(&args.target)?;
    let output_path = args.output.clone().unwrap_or_else(|| args.model.clone());

    output::kv("Model", &args.model.display().to_string());
    output::kv("Target", &args.target.display().to_string());
    output::kv("Output", &output_path.display().to_string());
    output::newline();

    let factory = config.factory();
    let plan = MergePlan::new(
        SchemaDiffer::new(&factory)
            .with_options(config.diff.clone())
            .diff(&model, &target, MergeDirection::ToModel),
    );

    if plan.is_empty() {
        success("Model is up to date");
        return Ok(());
    }

    output::section("Changes");
    for (i, token) in plan.tokens().iter().enumerate() {
        output::numbered_item(i + 1, &format!("{} {}", token.token_name(), token.token_value()));
    }
    output::newline();

    if args.dry_run {
        output::info(&format!("Dry run: {}", plan.summary()));
        return Ok(());
    }

    let adapter = config.adapter(model.quote_sql_identifiers);
    let mut log = ModelChangeLog::default();
    {
        let context = MergerContext::new(&adapter)
            .with_data_map(&mut model)
            .with_delegate(&mut log);
        MergeExecutor::new(context).execute(plan.tokens()).await?;
    }

    model.save(&output_path)?;

    output::section("Model updates");
    for change in log.changes() {
        output::list_item(&change.to_string());
    }
    output::newline();
    success(&format!(
        "Applied {} to {}",
        plan.summary(),
        output_path.display()
    ));

    Ok(())
}
