//! Google Gemini completion client.

pub mod provider;
pub mod types;

pub use provider::GoogleProvider;
pub use types::GoogleConfig;
