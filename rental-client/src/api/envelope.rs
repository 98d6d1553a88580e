//! Response envelope normalisation.
//!
//! Endpoints answer in one of three shapes, sometimes differing between list
//! and detail routes of the same resource:
//!
//! ```text
//! {"id_plan": 1, ...}                              bare resource
//! {"data": {...}}                                  data wrapper
//! {"success": true, "data": {...}, "message": ""}  full envelope
//! ```
//!
//! [`ApiEnvelope`] accepts all three, and lists may arrive as a single object
//! ([`OneOrMany`]).

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    error::{RentalError, Result},
    transport::TransportResponse,
};

/// Any of the response shapes the API uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiEnvelope<T> {
    /// `{success, data, message}`.
    Wrapped {
        /// Whether the server considers the call successful.
        success: bool,
        /// Payload, absent on failure.
        #[serde(default = "Option::default")]
        data: Option<T>,
        /// Server message.
        #[serde(default)]
        message: Option<String>,
    },
    /// `{data}` without a success flag.
    Data {
        /// Payload.
        data: T,
    },
    /// The resource itself.
    Bare(T),
}

impl<T> ApiEnvelope<T> {
    /// Unwraps the payload.
    ///
    /// # Errors
    ///
    /// - [`RentalError::Api`] when `success` is false
    /// - [`RentalError::InvalidResponse`] when a successful envelope carries no data
    pub fn into_result(self, status: u16) -> Result<T> {
        self.into_option(status)?
            .ok_or_else(|| RentalError::InvalidResponse("response envelope has no data".to_owned()))
    }

    /// Unwraps the payload, treating a missing one as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Api`] when `success` is false.
    pub fn into_option(self, status: u16) -> Result<Option<T>> {
        match self {
            Self::Wrapped { success: true, data, .. } => Ok(data),
            Self::Wrapped { success: false, message, .. } => {
                Err(RentalError::Api { status, message: message.filter(|m| !m.is_empty()) })
            }
            Self::Data { data } | Self::Bare(data) => Ok(Some(data)),
        }
    }
}

/// A list that may be delivered as a single object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    /// JSON array.
    Many(Vec<T>),
    /// Single object.
    One(T),
}

impl<T> OneOrMany<T> {
    /// Flattens into a vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

fn is_blank(body: &[u8]) -> bool {
    body.iter().all(u8::is_ascii_whitespace) || body == b"null"
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<ApiEnvelope<T>> {
    serde_json::from_slice(body)
        .map_err(|e| RentalError::InvalidResponse(format!("failed to parse response: {e}")))
}

/// Decodes a single resource.
///
/// # Errors
///
/// Returns [`RentalError::InvalidResponse`] if the body is not a recognised
/// shape, or [`RentalError::Api`] for a `success: false` envelope.
pub fn decode<T: DeserializeOwned>(response: &TransportResponse) -> Result<T> {
    parse::<T>(&response.body)?.into_result(response.status)
}

/// Decodes an optional resource; an empty body, `null` or missing data is `None`.
///
/// The envelope is peeled off as untyped JSON first, so a bare resource is
/// never mistaken for a `{data}` wrapper whose payload is absent.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_optional<T: DeserializeOwned>(response: &TransportResponse) -> Result<Option<T>> {
    if is_blank(&response.body) {
        return Ok(None);
    }
    let value: Value = serde_json::from_slice(&response.body)
        .map_err(|e| RentalError::InvalidResponse(format!("failed to parse response: {e}")))?;

    let payload = match value {
        Value::Object(mut map) => match map.get("success").and_then(Value::as_bool) {
            Some(true) => map.remove("data").unwrap_or(Value::Null),
            Some(false) => {
                let message = map
                    .remove("message")
                    .and_then(|m| m.as_str().map(str::to_owned))
                    .filter(|m| !m.is_empty());
                return Err(RentalError::Api { status: response.status, message });
            }
            None if map.len() == 1 && map.contains_key("data") => {
                map.remove("data").unwrap_or(Value::Null)
            }
            None => Value::Object(map),
        },
        other => other,
    };

    if payload.is_null() {
        return Ok(None);
    }
    serde_json::from_value(payload)
        .map(Some)
        .map_err(|e| RentalError::InvalidResponse(format!("failed to parse response: {e}")))
}

/// Decodes a list, accepting a single object as a one-element list.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_list<T: DeserializeOwned>(response: &TransportResponse) -> Result<Vec<T>> {
    if is_blank(&response.body) {
        return Ok(Vec::new());
    }
    Ok(parse::<OneOrMany<T>>(&response.body)?
        .into_option(response.status)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default())
}

/// Pulls a human-readable message out of an error body.
///
/// Looks at `message`, then `error`, then the first entry of a validation
/// `errors` map.
#[must_use]
pub fn extract_error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let text = |v: Option<&Value>| {
        v.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned)
    };

    text(value.get("message"))
        .or_else(|| text(value.get("error")))
        .or_else(|| {
            value
                .get("errors")?
                .as_object()?
                .values()
                .find_map(|v| text(v.as_array().and_then(|a| a.first())).or_else(|| text(Some(v))))
        })
}
