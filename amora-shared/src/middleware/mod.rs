mod auth_extractor;
mod request_meta;
mod tracing_layer;
mod metrics_layer;

pub use auth_extractor::*;
pub use request_meta::*;
pub use tracing_layer::*;
pub use metrics_layer::*;
