use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// Fixed fallback shown when an error body carries no detail field.
pub const GENERIC_FAILURE: &str = "request failed";

/// Pull the `detail` message out of an error body, if present.
pub fn detail_of(body: &Value) -> Option<String> {
    body.get("detail").and_then(|d| d.as_str()).map(|s| s.to_string())
}

/// Uniform mapping for any non-2xx response: status plus the body's detail
/// when the server provided one.
pub fn status_error(status: u16, body: &Value) -> ClientError {
    ClientError::status(status, detail_of(body).unwrap_or_else(|| GENERIC_FAILURE.to_string()))
}

/// Unwrap the `{ "status": "ok", "data": ... }` success envelope, yielding
/// the payload. Only the login endpoint sits outside this convention.
pub fn unwrap_data(mut body: Value) -> ClientResult<Value> {
    match body.get_mut("data") {
        Some(data) => Ok(data.take()),
        None => Err(ClientError::payload("response envelope has no data field")),
    }
}

/// Decode a payload into its typed model.
pub fn decode<T: DeserializeOwned>(data: Value) -> ClientResult<T> {
    serde_json::from_value(data).map_err(|e| ClientError::payload(format!("unexpected payload shape: {}", e)))
}

/// Decode with a fail-safe default: views that render a numeric field from a
/// missing or malformed object show zeroes instead of an error.
pub fn decode_or_default<T: DeserializeOwned + Default>(data: Value) -> T {
    serde_json::from_value(data).unwrap_or_default()
}
