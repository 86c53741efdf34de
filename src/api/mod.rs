//! API layer
//!
//! HTTP handlers for:
//! - Neynar proxy endpoints (followers, following, username search)
//! - Compatibility analysis
//! - Metrics (Prometheus)

mod compatibility;
pub mod metrics;
mod neynar;
mod params;

pub use compatibility::compatibility_router;
pub use metrics::metrics_router;
pub use neynar::neynar_router;
