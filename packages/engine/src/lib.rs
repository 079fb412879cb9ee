pub mod client;
pub mod config;
pub mod encoder;
pub mod error;
pub mod models;

pub use client::{ExecutionClient, HttpExecutionClient};
pub use config::EngineConfig;
pub use encoder::{SandboxLimits, decode_text, encode_batch};
pub use error::EngineError;
pub use models::{BatchJob, EngineStatus, EngineSubmission};
