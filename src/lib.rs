//! meow-config library
//!
//! A small HTTP service that manages named endpoint monitoring
//! configurations. Configurations live in an in-memory store guarded by a
//! single reader/writer lock and are mirrored to a flat CSV file on every
//! write.
//!
//! # Usage
//!
//! ```rust,no_run
//! use meow_config::{build_router, AppState, ConfigStore};
//! use std::net::SocketAddr;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ConfigStore::open("config.csv")?;
//! let app = build_router(AppState::new(store), true);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//! axum::serve(
//!     listener,
//!     app.into_make_service_with_connect_info::<SocketAddr>(),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod duration;
pub mod endpoint;
pub mod handlers;
pub mod liveness;
pub mod persistence;
pub mod state;
pub mod stats;
pub mod store;

// Re-export main types for convenience
pub use endpoint::{Endpoint, EndpointError, EndpointPayload};
pub use handlers::{build_router, ApiError};
pub use liveness::{LivenessCheck, LivenessError};
pub use persistence::{CsvFile, PersistenceError};
pub use state::{AppState, SharedState};
pub use stats::ServiceStats;
pub use store::{ConfigStore, PutOutcome, StoreError};
