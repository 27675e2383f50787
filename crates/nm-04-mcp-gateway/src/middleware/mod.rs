//! HTTP middleware.
//!
//! Layer order: CORS → Trace → Timeout → Body limit → Handler. The layers
//! themselves come from `tower-http`; this module configures them.

pub mod cors;
pub mod metrics;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer};
