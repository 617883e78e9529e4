// Public modules
pub mod chat;
pub mod client;
pub mod error;
pub mod observability;
pub mod render;
pub mod types;

// Re-exports
pub use client::{API_KEY_ENV, Gemini, HttpResponse, ReqwestTransport, RetryPolicy, Transport};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use types::*;
