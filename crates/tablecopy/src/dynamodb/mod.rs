//! DynamoDB adapters for the core table services.

mod client;
mod create;
mod cursor;
mod describe;
mod error;
mod service;

pub use client::create_client;
pub use cursor::{decode_key, encode_key, Item};
pub use service::DynamoDbService;
