//! Common utilities shared by the client and the scheduler

pub mod error;
pub mod retry;
pub mod shutdown;

pub use error::ApiError;
pub use retry::{with_retry_if, RetryConfig, RetryStack};
pub use shutdown::{shutdown_channel, ShutdownHandle, ShutdownSignal};
