//! `dbsync validate` command - Validate schema files.

use std::path::Path;

use dbsync_schema::{DataMap, SchemaError, validate_map};

use crate::cli::ValidateArgs;
use crate::error::{CliError, CliResult};
use crate::output::{self, success};

/// Run the validate command
pub async fn run(args: ValidateArgs) -> CliResult<()> {
    output::header("Validate Schema");

    let mut failed = 0;
    for path in &args.files {
        match check_file(path) {
            Ok(map) => {
                success(&format!(
                    "{} ({} tables, {} object entities)",
                    path.display(),
                    map.db_entity_count(),
                    map.obj_entities().count()
                ));
            }
            Err(errors) => {
                failed += 1;
                output::error(&format!("{}", path.display()));
                for error in &errors {
                    output::list_item(error);
                }
            }
        }
    }

    output::newline();

    if failed > 0 {
        return Err(CliError::Validation(format!(
            "{} of {} files failed validation",
            failed,
            args.files.len()
        )));
    }

    output::info(&format!("{} files valid", args.files.len()));
    Ok(())
}

/// Load and validate one file, returning every problem found.
fn check_file(path: &Path) -> Result<DataMap, Vec<String>> {
    let map = DataMap::from_file(path).map_err(|e| vec![e.to_string()])?;

    match validate_map(&map) {
        Ok(()) => Ok(map),
        Err(SchemaError::ValidationFailed { errors, .. }) => {
            Err(errors.iter().map(ToString::to_string).collect())
        }
        Err(other) => Err(vec![other.to_string()]),
    }
}
