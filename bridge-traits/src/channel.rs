//! Method-call channel between the core and the embedding application.
//!
//! Inbound requests arrive as [`MethodCall`] values (method name plus a JSON
//! argument map) and are answered with a [`MethodResponse`]. Outbound
//! callbacks to the application go through [`MethodChannel::invoke_method`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{BridgeError, Result};

/// Inbound request from the application layer.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// Call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }

    /// Decode a single named argument. Missing keys and explicit `null`
    /// both yield `Ok(None)`.
    pub fn argument<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.arguments.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|err| BridgeError::InvalidArgument {
                    key: key.to_string(),
                    message: err.to_string(),
                }),
        }
    }
}

/// Reply to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(Value),
    NotImplemented,
    Error { code: String, message: String },
}

impl MethodResponse {
    pub fn success_empty() -> Self {
        Self::Success(Value::Null)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Outbound side of the channel.
#[async_trait::async_trait]
pub trait MethodChannel: Send + Sync {
    /// Channel name shared with the application layer.
    fn name(&self) -> &str;

    /// Fire-and-forget invocation of an application-side handler.
    async fn invoke_method(&self, method: &str, arguments: Value) -> Result<()>;
}
