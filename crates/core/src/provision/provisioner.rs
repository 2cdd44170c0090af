//! Destination table provisioning (Imperative Shell over `TableControl`).

use std::time::Duration;

use tokio::time::Instant;

use super::planning::{format_plan, plan_provisioning, status_of, ProvisionPlan};
use crate::error::{CopyError, Result};
use crate::retry::{with_backoff, RetryPolicy};
use crate::schema::AttributeTemplate;
use crate::table::{TableControl, TableDescriptor, TableStatus};

/// Timing of the wait for a created table to become ACTIVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay before the first status check.
    pub initial_delay: Duration,
    /// Delay between status checks.
    pub interval: Duration,
    /// Maximum total wait before giving up with `PollTimeout`.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            interval: Duration::from_secs(3),
            timeout: Duration::from_secs(600),
        }
    }
}

/// How provisioning ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The destination was already ACTIVE; nothing was created.
    AlreadyActive,
    /// The destination was created and became ACTIVE after `waited`.
    Created { waited: Duration },
}

/// Ensures the destination table exists and is ACTIVE.
pub struct Provisioner<'a, C: TableControl + ?Sized> {
    control: &'a C,
    template: &'a AttributeTemplate,
    poll: PollConfig,
    retry: RetryPolicy,
}

impl<'a, C: TableControl + ?Sized> Provisioner<'a, C> {
    pub fn new(control: &'a C, template: &'a AttributeTemplate) -> Self {
        Self {
            control,
            template,
            poll: PollConfig::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Describes both tables and decides what to do with the destination.
    pub async fn plan(&self, source: &str, destination: &str) -> Result<ProvisionPlan> {
        let source_table = self.describe(source).await?;
        if source_table.is_none() {
            tracing::info!(table = source, "Source table not found");
            return Err(CopyError::SourceNotFound {
                table_name: source.to_string(),
            });
        }
        tracing::info!(table = source, "Source table found");

        let destination_table = self.describe(destination).await?;
        match &destination_table {
            Some(table) => tracing::info!(
                table = destination,
                status = %table.status().map(|s| s.to_string()).unwrap_or_default(),
                "Destination table found"
            ),
            None => tracing::info!(table = destination, "Destination table not found"),
        }

        plan_provisioning(
            self.template,
            source,
            source_table.as_ref(),
            destination,
            destination_table.as_ref(),
        )
    }

    /// Carries out a plan: creates the table and waits for it if needed.
    pub async fn execute(&self, plan: &ProvisionPlan) -> Result<ProvisionOutcome> {
        match plan {
            ProvisionPlan::AlreadyActive { table_name } => {
                tracing::info!(
                    table = %table_name,
                    "Destination table is ACTIVE, skipping creation"
                );
                Ok(ProvisionOutcome::AlreadyActive)
            }
            ProvisionPlan::Create { request } => {
                let table_name = request.table_name().unwrap_or_default();
                tracing::info!(table = table_name, "Creating table");
                tracing::debug!(request = %request.to_value(), "CreateTable request");

                with_backoff(&self.retry, "CreateTable", || {
                    self.control.create_table(request)
                })
                .await
                .map_err(|source| CopyError::CreateFailure {
                    table_name: table_name.to_string(),
                    source,
                })?;

                let waited = self.wait_for_active(table_name).await?;
                Ok(ProvisionOutcome::Created { waited })
            }
        }
    }

    /// Plans and executes provisioning of `destination` from `source`.
    pub async fn provision(&self, source: &str, destination: &str) -> Result<ProvisionOutcome> {
        let plan = self.plan(source, destination).await?;
        for line in format_plan(&plan) {
            tracing::info!("{line}");
        }
        self.execute(&plan).await
    }

    /// Polls `table_name` until it is ACTIVE.
    ///
    /// Fails with `PollFailure` as soon as the table reports a status other
    /// than CREATING or ACTIVE, and with `PollTimeout` once the configured
    /// maximum wait has elapsed. A table that is briefly not yet visible
    /// counts as CREATING.
    pub async fn wait_for_active(&self, table_name: &str) -> Result<Duration> {
        let started = Instant::now();
        tracing::info!(
            table = table_name,
            initial_delay_ms = self.poll.initial_delay.as_millis() as u64,
            "Waiting for table to become ACTIVE"
        );
        tokio::time::sleep(self.poll.initial_delay).await;

        loop {
            let status = self.describe(table_name).await?.map(|table| status_of(&table));

            match status {
                Some(TableStatus::Active) => {
                    let waited = started.elapsed();
                    tracing::info!(
                        table = table_name,
                        waited_ms = waited.as_millis() as u64,
                        "Table is ACTIVE"
                    );
                    return Ok(waited);
                }
                Some(TableStatus::Creating) | None => {
                    tracing::info!(table = table_name, "Table is still being created");
                }
                Some(status) => {
                    return Err(CopyError::PollFailure {
                        table_name: table_name.to_string(),
                        status,
                    })
                }
            }

            let waited = started.elapsed();
            if waited >= self.poll.timeout {
                return Err(CopyError::PollTimeout {
                    table_name: table_name.to_string(),
                    waited,
                });
            }
            let remaining = self.poll.timeout - waited;
            tokio::time::sleep(self.poll.interval.min(remaining)).await;
        }
    }

    async fn describe(&self, table_name: &str) -> Result<Option<TableDescriptor>> {
        with_backoff(&self.retry, "DescribeTable", || {
            self.control.describe_table(table_name)
        })
        .await
        .map_err(|source| CopyError::DescribeFailure {
            table_name: table_name.to_string(),
            source,
        })
    }
}
