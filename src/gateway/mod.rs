//! Remote service gateway.
//!
//! Every outbound call to the Geminizer service goes through the [`Gateway`]
//! trait. Implementations always send JSON, always parse the response body
//! as JSON, and report every failure as a [`ServiceError`] value so callers
//! branch on results instead of unwinding.

pub mod client;
pub mod endpoints;
pub mod http_client;
pub mod scrub;
pub mod types;

pub use client::HttpGateway;
pub use endpoints::Endpoint;
pub use http_client::build_service_client;

use crate::error::ServiceError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`Gateway::call`].
pub type GatewayFuture<'a> = Pin<Box<dyn Future<Output = Result<Value, ServiceError>> + Send + 'a>>;

pub trait Gateway: Send + Sync {
    /// Issue one call against `endpoint`. `payload` is serialized as the
    /// JSON request body when present.
    fn call(&self, endpoint: Endpoint, payload: Option<Value>) -> GatewayFuture<'_>;
}

/// Call a body-less endpoint and decode the response into `Resp`.
pub async fn fetch<Resp>(gateway: &dyn Gateway, endpoint: Endpoint) -> Result<Resp, ServiceError>
where
    Resp: DeserializeOwned,
{
    let value = gateway.call(endpoint, None).await?;
    decode(value)
}

/// Encode `request`, call `endpoint`, and decode the response into `Resp`.
pub async fn send<Req, Resp>(
    gateway: &dyn Gateway,
    endpoint: Endpoint,
    request: &Req,
) -> Result<Resp, ServiceError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let payload = serde_json::to_value(request)
        .map_err(|e| ServiceError::Parse(format!("request encoding failed: {e}")))?;
    let value = gateway.call(endpoint, Some(payload)).await?;
    decode(value)
}

fn decode<Resp: DeserializeOwned>(value: Value) -> Result<Resp, ServiceError> {
    serde_json::from_value(value).map_err(|e| ServiceError::Parse(e.to_string()))
}
