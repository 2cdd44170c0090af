mod checkpoint;
mod cli;
mod config;
mod dynamodb;
mod prelude;

use std::path::Path;

use anyhow::{Context, Result};
use tablecopy_core::copy::{CheckpointStore, CopyStats, NoCheckpoint};
use tablecopy_core::orchestrator::{Orchestrator, Phases, RunOptions, RunReport};
use tablecopy_core::provision::ProvisionOutcome;
use tablecopy_core::schema::AttributeTemplate;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::checkpoint::FileCheckpointStore;
use crate::cli::Cli;
use crate::config::Config;
use crate::dynamodb::{DynamoDbService, Item};
use crate::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_or_exit();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablecopy=info,tablecopy_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("Invalid configuration")?;
    tracing::debug!(?config, "Loaded configuration");

    aprintln!(
        "{} {} {} {}",
        p_b("Copying"),
        p_c(&cli.source),
        p_b("to"),
        p_c(&cli.destination)
    );
    aprintln!("{} {}", p_b("Target:"), config.target_display());
    aprintln!("{} {}", p_b("Credentials:"), config.credentials);
    aprintln!();

    let template = match &config.template_file {
        Some(path) => load_template(path).await?,
        None => AttributeTemplate::table_creation(),
    };

    let service = DynamoDbService::new(dynamodb::create_client(&config).await);

    let file_store;
    let checkpoints: &dyn CheckpointStore<Item> = match &config.checkpoint_file {
        Some(path) => {
            file_store = FileCheckpointStore::new(path, &cli.source, &cli.destination);
            aprintln!("{} {}", p_b("Checkpoint:"), file_store.path().display());
            &file_store
        }
        None => &NoCheckpoint,
    };

    let options = RunOptions {
        phases: Phases {
            provision: !config.disable_creation,
            copy: !config.disable_datacopy,
        },
        poll: config.poll,
        retry: config.retry,
    };

    let report = Orchestrator::new(&service, &template)
        .with_options(options)
        .run(&cli.source, &cli.destination, checkpoints)
        .await
        .with_context(|| {
            format!(
                "Failed to copy table '{}' to '{}'",
                cli.source, cli.destination
            )
        })?;

    print_report(&report);
    Ok(())
}

/// Reads a JSON attribute template from `path`.
async fn load_template(path: &Path) -> Result<AttributeTemplate> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read attribute template {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse attribute template {}", path.display()))?;
    let template = AttributeTemplate::from_json(&value)
        .with_context(|| format!("Invalid attribute template {}", path.display()))?;

    tracing::info!(path = %path.display(), "Loaded attribute template");
    Ok(template)
}

fn print_report(report: &RunReport) {
    match report.provision {
        Some(ProvisionOutcome::Created { waited }) => aprintln!(
            "{} ACTIVE after {:.1}s",
            p_g("Destination table created,"),
            waited.as_secs_f64()
        ),
        Some(ProvisionOutcome::AlreadyActive) => {
            aprintln!("{}", p_g("Destination table already exists and is ACTIVE."))
        }
        None => aprintln!("{}", p_y("Table creation disabled.")),
    }

    match report.copy {
        Some(CopyStats {
            pages,
            records,
            resumed,
        }) => aprintln!(
            "{} {} records in {} pages{}",
            p_g("Copied"),
            records,
            pages,
            if resumed { " (resumed)" } else { "" }
        ),
        None => aprintln!("{}", p_y("Data copy disabled.")),
    }

    aprintln!();
    aprintln!("{}", p_g("Table copy completed."));
}
