mod error;
mod filter;
mod template;

pub use error::{Result, SchemaError};
pub use filter::{filter, filter_object};
pub use template::AttributeTemplate;
