// forge-client: Typed async client for the provisioning service REST API
// Depends on forge-core only.

pub mod client;
pub mod error;
pub mod upload;

pub use client::ConsoleClient;
pub use error::{ClientError, Result};
pub use upload::UploadProgress;
