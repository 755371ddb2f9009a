//! `dbsync diff` command - Compare two schema files.

use serde::Serialize;

use dbsync_merge::{MergeDirection, MergePlan, PlannedToken, SchemaDiffer};
use dbsync_schema::DataMap;

use crate::cli::{DiffArgs, OutputFormat};
use crate::config;
use crate::error::{CliError, CliResult};
use crate::output::{self, success};

/// JSON document printed by `--format json`
#[derive(Debug, Serialize)]
struct DiffReport {
    dialect: String,
    direction: MergeDirection,
    summary: String,
    tokens: Vec<PlannedToken>,
}

/// Run the diff command
pub async fn run(args: DiffArgs) -> CliResult<()> {
    let cwd = std::env::current_dir()?;
    let mut config = config::load(args.config.as_deref(), &cwd)?;
    if let Some(dialect) = args.dialect {
        config.dialect = dialect.into();
    }

    let from = load_schema(&args.from)?;
    let to = load_schema(&args.to)?;
    let direction: MergeDirection = args.direction.into();

    let factory = config.factory();
    let tokens = SchemaDiffer::new(&factory)
        .with_value_for_null(config.value_for_null_provider())
        .with_options(config.diff.clone())
        .diff(&from, &to, direction);
    let plan = MergePlan::new(tokens);

    // The model side decides quoting when the config leaves it open.
    let model = match direction {
        MergeDirection::ToDb => &to,
        MergeDirection::ToModel => &from,
    };
    let adapter = config.adapter(model.quote_sql_identifiers);

    match args.format {
        OutputFormat::Sql => {
            print!("{}", plan.to_sql(&adapter)?);
        }
        OutputFormat::Json => {
            let report = DiffReport {
                dialect: config.dialect.to_string(),
                direction,
                summary: plan.summary(),
                tokens: plan.render(&adapter)?,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            output::header("Schema Diff");
            output::kv("From", &args.from.display().to_string());
            output::kv("To", &args.to.display().to_string());
            output::kv("Direction", direction.as_str());
            output::kv("Dialect", config.dialect.as_str());
            output::newline();

            if plan.is_empty() {
                success("Schemas are in sync");
                return Ok(());
            }

            output::section("Changes");
            for (i, planned) in plan.render(&adapter)?.iter().enumerate() {
                output::numbered_item(i + 1, &format!("{} {}", planned.name, planned.value));
                for statement in &planned.statements {
                    output::statement(statement);
                }
            }
            output::newline();
            output::info(&plan.summary());
        }
    }

    Ok(())
}

pub(crate) fn load_schema(path: &std::path::Path) -> CliResult<DataMap> {
    if !path.exists() {
        return Err(CliError::Schema(format!(
            "Schema file not found: {}",
            path.display()
        )));
    }
    Ok(DataMap::from_file(path)?)
}
