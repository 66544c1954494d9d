pub mod client;
pub mod error;
pub mod prompts;
pub mod types;

pub use client::{InferenceClient, InferenceConfig};
pub use error::InferenceError;
pub use types::{ScreenContext, ScreenStatus};
