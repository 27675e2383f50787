//! Domain layer: configuration, errors, method registry, parameters.

pub mod config;
pub mod error;
pub mod methods;
pub mod params;

pub use config::{ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig};
pub use error::{codes, ApiError, ApiResult, GatewayError};
pub use methods::{get_method_info, is_method_supported, tool_list, MethodInfo, ParamInfo, METHODS};
pub use params::Params;
