//! Analysis API router.
//!
//! Thin inbound adapter over the diagnostic pipeline: one analysis endpoint
//! and a health snapshot. The router is composable — `analysis_router()`
//! returns a `Router` that can be mounted on any axum server instance.
//! Handlers call the blocking pipeline through `spawn_blocking`.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod types;

pub use error::ApiError;
pub use router::analysis_router;
pub use types::ApiContext;
