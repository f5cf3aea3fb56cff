//! # Delivery Stream Reconciliation Handler
//!
//! A stateless engine that drives a delivery stream from submission to a
//! terminal outcome across repeated invocations.
//!
//! Each call to [`ReconciliationEngine::reconcile`] performs at most one unit
//! of work: the existence guard and mutating call on the first invocation,
//! then one status query per polling invocation. Anything the chain needs to
//! continue is returned to the caller in a [`ContinuationToken`] along with
//! the delay to wait before invoking again.
//!
//! ## Example
//!
//! ```ignore
//! use conveyor_handler::prelude::*;
//! use conveyor_backend::memory::InMemoryBackend;
//!
//! let backend = InMemoryBackend::default();
//! let engine = ReconciliationEngine::new(EngineConfig::default());
//! let mut operation = Operation::Create {
//!     resource: ResourceModel::new(serde_json::json!({"DeliveryStreamType": "DirectPut"})),
//!     naming: NamingInputs::new("Orders", "req-1"),
//! };
//! let mut token = None;
//!
//! loop {
//!     match engine.reconcile(&backend, &operation, token.as_ref()).await {
//!         ReconciliationResult::InProgress { token: next, delay_seconds, resource } => {
//!             operation = operation.with_resource(resource);
//!             token = Some(next);
//!             tokio::time::sleep(Duration::from_secs(delay_seconds)).await;
//!         }
//!         terminal => break terminal,
//!     }
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`engine`] - The reconciliation state machine
//! - [`model`] - Operations, resource models and results
//! - [`token`] - Continuation tokens
//! - [`classifier`] - Backend error classification
//! - [`naming`] - Deterministic stream name derivation
//! - [`config`] - Engine configuration

pub mod classifier;
pub mod config;
pub mod engine;
pub mod model;
pub mod naming;
pub mod token;

pub use classifier::{classify, ErrorKind};
pub use config::{ConfigError, EngineConfig};
pub use engine::ReconciliationEngine;
pub use model::{NamingInputs, Operation, ReconciliationResult, ResourceModel};
pub use token::{ContinuationToken, TokenError};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classifier::{classify, ErrorKind};
    pub use crate::config::{ConfigError, EngineConfig};
    pub use crate::engine::ReconciliationEngine;
    pub use crate::model::{NamingInputs, Operation, ReconciliationResult, ResourceModel};
    pub use crate::naming::{derive_stream_name, resolve_name};
    pub use crate::token::{ContinuationToken, TokenError};
}
