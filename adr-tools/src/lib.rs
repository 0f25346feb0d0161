pub mod confluence;
pub mod medication_db;
pub mod secrets;
pub mod tool_error;
pub mod tool_executor;
pub mod types;

pub use secrets::{SecretManagerClient, SecretStore, SecretVersion, StaticSecretStore};
pub use tool_error::ToolError;
pub use tool_executor::{ToolExecutor, ToolExecutorBuilder};
pub use types::*;
