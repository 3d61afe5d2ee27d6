//! The uniform response envelope returned by every pfSense API call.

use crate::Error;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::type_name;

/// Status codes the API is allowed to report in the envelope's `code` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum ResponseCode {
    /// 200
    Ok,
    /// 400
    BadRequest,
    /// 401
    Unauthorized,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 500
    ServerError,
}

impl ResponseCode {
    /// Numeric value of the code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }
}

impl TryFrom<u16> for ResponseCode {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self, Error> {
        match value {
            200 => Ok(Self::Ok),
            400 => Ok(Self::BadRequest),
            401 => Ok(Self::Unauthorized),
            403 => Ok(Self::Forbidden),
            404 => Ok(Self::NotFound),
            500 => Ok(Self::ServerError),
            other => Err(Error::api(format!("Got an invalid status code ({other})"))),
        }
    }
}

impl From<ResponseCode> for u16 {
    fn from(code: ResponseCode) -> Self {
        code.as_u16()
    }
}

/// Payload of an envelope: either a single object or a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// A single JSON object
    Object(Map<String, Value>),
    /// A JSON array
    List(Vec<Value>),
}

impl Default for ResponseData {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl ResponseData {
    /// The object payload, if this is one.
    #[must_use]
    pub const fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(map) => Some(map),
            Self::List(_) => None,
        }
    }

    /// The list payload, if this is one.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            Self::Object(_) => None,
        }
    }

    /// True for an empty list or an empty object.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Object(map) => map.is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Look up a key in an object payload.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Convert back into a plain JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Object(map) => Value::Object(map),
            Self::List(items) => Value::Array(items),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<ResponseData, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ResponseData>::deserialize(deserializer)?.unwrap_or_default())
}

/// A decoded API response.
///
/// Unknown top-level fields are ignored. A missing or `null` `data` field is
/// treated as an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP-like status text (e.g. `"ok"`)
    pub status: String,
    /// Status code reported in the body
    pub code: ResponseCode,
    /// API-specific return code
    #[serde(rename = "return")]
    pub return_code: i64,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Payload
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: ResponseData,
}

impl ApiResponse {
    /// Build an envelope by hand, checking the code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ApiError`] if `code` is not one of the allowed values.
    pub fn new(
        status: impl Into<String>,
        code: u16,
        return_code: i64,
        message: impl Into<String>,
        data: ResponseData,
    ) -> Result<Self, Error> {
        Ok(Self {
            status: status.into(),
            code: ResponseCode::try_from(code)?,
            return_code,
            message: message.into(),
            data,
        })
    }

    /// Convert the payload into a single domain model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if the payload does not fit `T`.
    pub fn into_model<T: DeserializeOwned>(self) -> Result<T, Error> {
        serde_json::from_value(self.data.into_value()).map_err(conversion_error::<T>)
    }

    /// Convert the payload into a list of domain models.
    ///
    /// An object payload is read as a single item, except an empty object,
    /// which is read as no items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationError`] if any item does not fit `T`.
    pub fn into_models<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        match self.data {
            ResponseData::List(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).map_err(conversion_error::<T>))
                .collect(),
            ResponseData::Object(map) if map.is_empty() => Ok(Vec::new()),
            ResponseData::Object(map) => serde_json::from_value(Value::Object(map))
                .map(|item| vec![item])
                .map_err(conversion_error::<T>),
        }
    }
}

fn conversion_error<T>(err: serde_json::Error) -> Error {
    Error::validation(format!(
        "Failed to convert response data into {}: {err}",
        type_name::<T>()
    ))
}
