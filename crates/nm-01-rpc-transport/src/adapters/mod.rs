//! Adapters for the transport's outbound port.

pub mod http;

pub use http::ReqwestConnector;
