mod error;
mod traits;
mod types;

pub use error::{ServiceError, ServiceResult};
pub use traits::{TableControl, TableData};
pub use types::{
    BillingMode, CreationRequest, ScanPage, TableClass, TableDescriptor, TableStatus,
};
