//! Runs provisioning and copying for one source/destination pair.

use crate::copy::{CheckpointStore, CopyEngine, CopyStats};
use crate::error::{CopyError, Result};
use crate::provision::{PollConfig, ProvisionOutcome, Provisioner};
use crate::retry::{with_backoff, RetryPolicy};
use crate::schema::AttributeTemplate;
use crate::table::{TableControl, TableData, TableStatus};

/// Which phases of a run are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phases {
    pub provision: bool,
    pub copy: bool,
}

impl Default for Phases {
    fn default() -> Self {
        Self {
            provision: true,
            copy: true,
        }
    }
}

/// Tunables of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub phases: Phases,
    pub poll: PollConfig,
    pub retry: RetryPolicy,
}

/// What a run did. A `None` field means the phase was disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub provision: Option<ProvisionOutcome>,
    pub copy: Option<CopyStats>,
}

/// Sequences the provisioner and the copy engine over one service.
pub struct Orchestrator<'a, S: TableControl + TableData + ?Sized> {
    service: &'a S,
    template: &'a AttributeTemplate,
    options: RunOptions,
}

impl<'a, S: TableControl + TableData + ?Sized> Orchestrator<'a, S> {
    pub fn new(service: &'a S, template: &'a AttributeTemplate) -> Self {
        Self {
            service,
            template,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Provisions `destination` from `source`, then copies every record.
    ///
    /// Copying only starts once both tables are observed ACTIVE. A destination
    /// created by this run starts empty, so any stored checkpoint is discarded
    /// before copying.
    pub async fn run<K>(
        &self,
        source: &str,
        destination: &str,
        checkpoints: &K,
    ) -> Result<RunReport>
    where
        K: CheckpointStore<S::Cursor> + ?Sized,
    {
        let mut report = RunReport::default();

        if self.options.phases.provision {
            let outcome = Provisioner::new(self.service, self.template)
                .with_poll(self.options.poll)
                .with_retry(self.options.retry)
                .provision(source, destination)
                .await?;
            report.provision = Some(outcome);
        } else {
            tracing::info!("Table creation disabled");
        }

        if self.options.phases.copy {
            self.ensure_active(source).await?;
            self.ensure_active(destination).await?;

            if matches!(report.provision, Some(ProvisionOutcome::Created { .. })) {
                tracing::info!(destination, "Destination was just created, discarding checkpoint");
                checkpoints.clear().await?;
            }

            let stats = CopyEngine::new(self.service)
                .with_retry(self.options.retry)
                .copy_table(source, destination, checkpoints)
                .await?;
            report.copy = Some(stats);
        } else {
            tracing::info!("Data copy disabled");
        }

        tracing::info!(source, destination, "completed");
        Ok(report)
    }

    async fn ensure_active(&self, table_name: &str) -> Result<()> {
        let table = with_backoff(&self.options.retry, "DescribeTable", || {
            self.service.describe_table(table_name)
        })
        .await
        .map_err(|source| CopyError::DescribeFailure {
            table_name: table_name.to_string(),
            source,
        })?;

        let observed = match table.and_then(|t| t.status()) {
            Some(TableStatus::Active) => return Ok(()),
            Some(status) => status.to_string(),
            None => "missing".to_string(),
        };
        Err(CopyError::TableNotActive {
            table_name: table_name.to_string(),
            observed,
        })
    }
}
