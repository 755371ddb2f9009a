//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use dbsync_merge::{Dialect, MergeDirection};
use std::path::PathBuf;

/// dbsync - Synchronize relational schema models with databases
#[derive(Parser, Debug)]
#[command(name = "dbsync")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(about = "dbsync - Diff and merge relational schemas", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare two schema files and print the ordered merge tokens
    Diff(DiffArgs),

    /// Merge a database snapshot into a model file
    Apply(ApplyArgs),

    /// Validate schema files
    Validate(ValidateArgs),

    /// Display version information
    Version,
}

// =============================================================================
// Diff Command
// =============================================================================

/// Arguments for the `diff` command
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Schema the changes start from
    #[arg(long)]
    pub from: PathBuf,

    /// Schema the changes lead to
    #[arg(long)]
    pub to: PathBuf,

    /// Side the tokens change
    #[arg(short, long, default_value = "db")]
    pub direction: DirectionArg,

    /// SQL dialect (overrides the config file)
    #[arg(long, env = "DBSYNC_DIALECT")]
    pub dialect: Option<DialectArg>,

    /// Path to the config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Which side of the merge a diff targets
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectionArg {
    /// Generate DDL that brings the database to the model
    #[default]
    Db,
    /// Generate model edits that bring the model to the database
    Model,
}

impl From<DirectionArg> for MergeDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Db => MergeDirection::ToDb,
            DirectionArg::Model => MergeDirection::ToModel,
        }
    }
}

/// Supported SQL dialects
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectArg {
    Generic,
    Postgres,
    Mysql,
    Sqlite,
    Sqlserver,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Generic => Dialect::Generic,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Sqlserver => Dialect::SqlServer,
        }
    }
}

/// Diff output formats
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human readable token list
    #[default]
    Text,
    /// JSON document with every token and its statements
    Json,
    /// SQL script
    Sql,
}

// =============================================================================
// Apply Command
// =============================================================================

/// Arguments for the `apply` command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Model file to update
    #[arg(short, long)]
    pub model: PathBuf,

    /// Database snapshot the model should match
    #[arg(short, long)]
    pub target: PathBuf,

    /// Where to write the merged model (defaults to the model file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to the config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show the changes without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

// =============================================================================
// Validate Command
// =============================================================================

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema files to check (.toml or .json)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
