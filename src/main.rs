//! Binary entry point for the snapkeep CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;

use snapkeep::{
    AwsProvider, LifecycleError, LifecycleManager, Provider, ResourceDescriptor, SnapkeepConfig,
};

mod cli;

use cli::{
    CheckArgs, Cli, CreateArgs, ListArgs, NameArgs, OutputFormat, ParentArgs, ResourceCommand,
};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("failed to render output: {0}")]
    Render(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> Result<i32, CliError> {
    let config =
        SnapkeepConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let provider = AwsProvider::connect(&config)
        .await
        .map_err(|err| CliError::Provider(err.to_string()))?;

    match cli {
        Cli::Snapshot(command) => {
            run_command(
                &LifecycleManager::snapshots(provider),
                command,
                &config.default_description,
            )
            .await
        }
        Cli::Image(command) => {
            run_command(
                &LifecycleManager::images(provider),
                command,
                &config.default_description,
            )
            .await
        }
        Cli::Policy(command) => {
            run_command(
                &LifecycleManager::policies(provider),
                command,
                &config.default_description,
            )
            .await
        }
    }
}

async fn run_command<P: Provider>(
    manager: &LifecycleManager<P>,
    command: ResourceCommand,
    default_description: &str,
) -> Result<i32, CliError> {
    match command {
        ResourceCommand::Create(args) => create(manager, &args, default_description).await,
        ResourceCommand::Delete(args) => delete(manager, &args).await,
        ResourceCommand::Exists(args) => exists(manager, &args).await,
        ResourceCommand::List(args) => list(manager, &args).await,
        ResourceCommand::Purge(args) => purge(manager, &args).await,
        ResourceCommand::Check(args) => check(manager, &args).await,
    }
}

async fn create<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &CreateArgs,
    default_description: &str,
) -> Result<i32, CliError> {
    let description = args.description.as_deref().unwrap_or(default_description);
    let created = manager
        .create(&args.parent, &args.name, Some(description))
        .await?;
    emit(&format!(
        "created {} '{}' ({})",
        created.kind, created.name, created.id
    ));
    Ok(0)
}

async fn delete<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &NameArgs,
) -> Result<i32, CliError> {
    let deleted = manager.delete(&args.name).await?;
    emit(&format!(
        "deleted {} '{}' ({})",
        deleted.kind, deleted.name, deleted.id
    ));
    Ok(0)
}

async fn exists<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &NameArgs,
) -> Result<i32, CliError> {
    let present = manager.exists(&args.name).await?;
    emit(if present { "true" } else { "false" });
    Ok(if present { 0 } else { 1 })
}

async fn list<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &ListArgs,
) -> Result<i32, CliError> {
    let children = manager.find_all_by_parent(&args.parent).await?;
    match args.output {
        OutputFormat::Text => {
            for descriptor in &children {
                emit(&format_descriptor_line(descriptor));
            }
        }
        OutputFormat::Json => {
            let rendered = serde_json::to_string_pretty(&children)
                .map_err(|err| CliError::Render(err.to_string()))?;
            emit(&rendered);
        }
    }
    Ok(0)
}

async fn purge<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &ParentArgs,
) -> Result<i32, CliError> {
    let deleted = manager.delete_all_by_parent(&args.parent).await?;
    emit(&format!(
        "deleted {} {} resource(s) scoped to '{}'",
        deleted.len(),
        manager.kind(),
        args.parent
    ));
    Ok(0)
}

async fn check<P: Provider>(
    manager: &LifecycleManager<P>,
    args: &CheckArgs,
) -> Result<i32, CliError> {
    let enough = manager
        .has_more_than_by_parent(&args.parent, args.at_least)
        .await?;
    emit(if enough { "true" } else { "false" });
    Ok(if enough { 0 } else { 1 })
}

fn format_descriptor_line(descriptor: &ResourceDescriptor) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        descriptor.id,
        descriptor.name.as_deref().unwrap_or("-"),
        descriptor.state.as_deref().unwrap_or("-"),
        descriptor.source_id.as_deref().unwrap_or("-"),
    )
}

fn emit(line: &str) {
    writeln!(io::stdout(), "{line}").ok();
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
