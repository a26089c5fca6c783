// Remote API module.
// Provides the transport seam, the reqwest client and the entity types.

pub mod client;
#[cfg(test)]
pub mod testing;
pub mod types;

pub use client::{ApiClient, ApiRequest, ApiResponse, Transport};
pub use types::*;
