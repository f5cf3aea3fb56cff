//! # Delivery Stream Backend
//!
//! Client abstractions for the managed delivery-stream service.
//!
//! The reconciliation handler never talks to the service directly; it goes
//! through the [`DeliveryStreamBackend`] trait, which exposes exactly the three
//! point-in-time calls a reconciliation chain needs:
//!
//! - [`DeliveryStreamBackend::create_stream`] - submit a create
//! - [`DeliveryStreamBackend::delete_stream`] - submit a delete
//! - [`DeliveryStreamBackend::describe_stream`] - read the current status
//!
//! ## Example
//!
//! ```ignore
//! use conveyor_backend::prelude::*;
//!
//! let config = BackendConfig::new("https://firehose.eu-west-1.example.com")
//!     .with_bearer_token("token");
//! let backend = HttpBackend::new(config)?;
//!
//! let name = StreamName::parse("clickstream")?;
//! let description = backend.describe_stream(&name).await?;
//! println!("{} is {}", description.name, description.status);
//! ```
//!
//! ## Crate Organization
//!
//! - [`ids`] - Validated identifiers (`StreamName`, `StreamArn`)
//! - [`types`] - Status and description types
//! - [`error`] - Typed backend errors
//! - [`traits`] - The backend client trait
//! - [`config`] - HTTP client configuration
//! - [`http`] - JSON-over-HTTP backend
//! - [`memory`] - In-memory simulated backend

pub mod config;
pub mod error;
pub mod http;
pub mod ids;
pub mod memory;
pub mod traits;
pub mod types;

/// Prelude module for convenient imports.
///
/// ```
/// use conveyor_backend::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::BackendConfig;
    pub use crate::error::{BackendError, BackendResult};
    pub use crate::http::HttpBackend;
    pub use crate::ids::{NameError, StreamArn, StreamName};
    pub use crate::memory::{BackendCall, InMemoryBackend, SimulationConfig};
    pub use crate::traits::DeliveryStreamBackend;
    pub use crate::types::{CreatedStream, StreamDescription, StreamStatus};
}

// Re-export async_trait for backend implementors
pub use async_trait::async_trait;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_imports() {
        let _name = StreamName::parse("orders").unwrap();
        let _status = StreamStatus::active();
        let _config = BackendConfig::new("https://firehose.example.com");
        let _sim = SimulationConfig::default();
    }
}
