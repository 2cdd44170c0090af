mod planning;
mod provisioner;
mod request;

pub use planning::{format_plan, plan_provisioning, ProvisionPlan};
pub use provisioner::{PollConfig, ProvisionOutcome, Provisioner};
pub use request::build_creation_request;
