use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::prelude::*;

/// Copy a DynamoDB table's schema and records into another table
#[derive(Debug, Parser)]
#[command(name = "tablecopy")]
#[command(version, about)]
#[command(long_about = "Copy a DynamoDB table's schema and records into another table.

The destination table is created from the source table's key schema,
attribute definitions, secondary indexes, billing mode and capacity, unless
it already exists and is ACTIVE. Every record of the source is then scanned
page by page and written to the destination.

Environment variables (names are case-insensitive):
  AWS_DEFAULT_REGION       - AWS region (defaults to us-west-2)
  PROFILE_NAME             - AWS credentials profile
  AWS_ACCESS_KEY_ID        - Static access key, used without a profile
  AWS_SECRET_ACCESS_KEY    - Static secret key, used without a profile
  AWS_ENDPOINT_URL         - Use local DynamoDB (e.g., http://localhost:8000)
  DISABLE_CREATION         - Skip creating the destination table
  DISABLE_DATACOPY         - Skip copying records
  POLL_INITIAL_DELAY_SECS  - Delay before the first status check (5)
  POLL_INTERVAL_SECS       - Delay between status checks (3)
  POLL_TIMEOUT_SECS        - Maximum wait for the new table (600)
  MAX_RETRIES              - Attempts per throttled request (8)
  CHECKPOINT_FILE          - Persist copy progress to resume later
  ATTRIBUTE_TEMPLATE_FILE  - JSON template of the CreateTable fields
  RUST_LOG                 - Log filter (tablecopy=info,tablecopy_core=info)")]
pub struct Cli {
    /// Table to copy from.
    #[arg(value_name = "source_table_name")]
    pub source: String,

    /// Table to create if needed and copy into.
    #[arg(value_name = "destination_table_name")]
    pub destination: String,
}

impl Cli {
    /// Parses the command line.
    ///
    /// `--help` and `--version` exit with status 0. Any other parse error
    /// prints the usage line to stdout and exits with status 1.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                err.exit()
            }
            Err(_) => {
                aprintln!("{}", Self::usage());
                std::process::exit(1)
            }
        }
    }

    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}
