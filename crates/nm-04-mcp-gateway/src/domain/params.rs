//! Parameter extraction.
//!
//! Tools take named parameters (`{"address": ...}`); plain JSON-RPC callers
//! may pass the same values positionally in registry order.

use super::error::ApiError;
use super::methods::MethodInfo;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parameters of one call, resolved against the method's registry entry.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    raw: Option<&'a Value>,
    method: Option<&'static MethodInfo>,
}

impl<'a> Params<'a> {
    pub fn new(raw: Option<&'a Value>, method: Option<&'static MethodInfo>) -> Self {
        Self { raw, method }
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        let value = match self.raw? {
            Value::Object(map) => map.get(name),
            Value::Array(items) => {
                let index = self.method?.param_names().position(|n| n == name)?;
                items.get(index)
            }
            _ => None,
        };
        value.filter(|v| !v.is_null())
    }

    /// A parameter that must be present.
    pub fn required<T: DeserializeOwned>(&self, name: &str) -> Result<T, ApiError> {
        let value = self
            .lookup(name)
            .ok_or_else(|| ApiError::invalid_params(format!("missing parameter '{}'", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ApiError::invalid_params(format!("invalid parameter '{}': {}", name, e)))
    }

    /// A parameter that may be absent; present but malformed is an error.
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, ApiError> {
        self.lookup(name)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    ApiError::invalid_params(format!("invalid parameter '{}': {}", name, e))
                })
            })
            .transpose()
    }
}
