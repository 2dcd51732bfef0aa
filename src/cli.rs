//! Command-line interface definitions for the `snapkeep` binary.
//!
//! This module isolates the clap parser structures so the build script can
//! reuse them when generating the manual page.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI for the `snapkeep` binary.
#[derive(Debug, Parser)]
#[command(
    name = "snapkeep",
    about = "Guarded lifecycle management for EC2 backup resources",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Manage disk snapshots scoped to volumes.
    #[command(subcommand)]
    Snapshot(ResourceCommand),
    /// Manage machine images scoped to instances.
    #[command(subcommand)]
    Image(ResourceCommand),
    /// Manage snapshot lifecycle policies scoped to instances.
    #[command(subcommand)]
    Policy(ResourceCommand),
}

/// Uniform lifecycle verbs shared by every managed resource kind.
#[derive(Debug, Subcommand)]
pub(crate) enum ResourceCommand {
    /// Create a resource under a parent, tagged with its logical name.
    Create(CreateArgs),
    /// Delete a resource by its logical name.
    Delete(NameArgs),
    /// Report whether a resource with the given name exists.
    Exists(NameArgs),
    /// List every resource scoped to a parent.
    List(ListArgs),
    /// Delete every resource scoped to a parent, one at a time.
    Purge(ParentArgs),
    /// Check whether a parent has at least a given number of children.
    Check(CheckArgs),
}

/// Arguments for `create`.
#[derive(Debug, Args)]
pub(crate) struct CreateArgs {
    /// Logical name for the new resource (stored as its Name tag).
    #[arg(long)]
    pub(crate) name: String,
    /// Name of the parent volume or instance.
    #[arg(long)]
    pub(crate) parent: String,
    /// Description recorded on the provider side.
    #[arg(long)]
    pub(crate) description: Option<String>,
}

/// Arguments for verbs addressing one resource by name.
#[derive(Debug, Args)]
pub(crate) struct NameArgs {
    /// Logical name of the resource.
    #[arg(long)]
    pub(crate) name: String,
}

/// Arguments for verbs addressing all children of one parent.
#[derive(Debug, Args)]
pub(crate) struct ParentArgs {
    /// Name of the parent volume or instance.
    #[arg(long)]
    pub(crate) parent: String,
}

/// Arguments for `list`.
#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Name of the parent volume or instance.
    #[arg(long)]
    pub(crate) parent: String,
    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    pub(crate) output: OutputFormat,
}

/// Arguments for `check`.
#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    /// Name of the parent volume or instance.
    #[arg(long)]
    pub(crate) parent: String,
    /// Minimum number of children expected.
    #[arg(long)]
    pub(crate) at_least: i64,
}

/// Output renderings supported by `list`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One tab-separated line per resource.
    Text,
    /// Pretty-printed JSON array of descriptors.
    Json,
}
