//! AWS SDK client setup (Imperative Shell).

use aws_sdk_dynamodb::Client;

use crate::config::{Config, Credentials};

/// Creates a DynamoDB client for the configured region, credentials and
/// endpoint.
pub async fn create_client(config: &Config) -> Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    match &config.credentials {
        Credentials::Profile(name) => {
            sdk_config_loader = sdk_config_loader.profile_name(name);
        }
        Credentials::Static {
            access_key_id,
            secret_access_key,
        } => {
            sdk_config_loader =
                sdk_config_loader.credentials_provider(aws_sdk_dynamodb::config::Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    "environment",
                ));
        }
        Credentials::Default => {}
    }

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    Client::new(&sdk_config)
}
