//! Request methods, encoding types and the rules that decide where a
//! payload travels.
//!
//! GET requests never carry a body: their payload is flattened into the
//! query string. Every other method sends the payload as the body, encoded
//! according to the request's [`EncodingType`], and leaves the URL alone.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use super::body::{FetchRequestBody, FormDataValue, FormFile};
use crate::error::{NetworkError, Result};

const TARGET: &str = "wicket_net::http::encoding";

/// HTTP request methods a fetch request can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchMethod {
    /// HTTP GET method.
    Get,
    /// HTTP POST method.
    Post,
    /// HTTP PUT method.
    Put,
    /// HTTP PATCH method.
    Patch,
    /// HTTP DELETE method.
    Delete,
}

impl FetchMethod {
    /// The lowercase selector, e.g. `"patch"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Patch => "patch",
            Self::Delete => "delete",
        }
    }

    /// Whether the payload belongs in the query string. Only true for GET.
    pub fn is_idempotent(self) -> bool {
        self == Self::Get
    }

    /// Convert to reqwest method.
    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Patch => write!(f, "PATCH"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

impl FromStr for FetchMethod {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            _ => Err(NetworkError::UnsupportedMethod(s.to_string())),
        }
    }
}

/// How a request payload is encoded on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EncodingType {
    /// `application/json`
    ApplicationJson,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    #[default]
    MultipartFormData,
}

impl EncodingType {
    /// The `Content-Type` header value for this encoding.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::ApplicationJson => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::MultipartFormData => "multipart/form-data",
        }
    }

    /// Parse a content type, case-insensitively.
    ///
    /// Anything unrecognized resolves to [`EncodingType::MultipartFormData`].
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "application/json" => Self::ApplicationJson,
            "application/x-www-form-urlencoded" => Self::FormUrlEncoded,
            "multipart/form-data" => Self::MultipartFormData,
            other => {
                tracing::trace!(
                    target: TARGET,
                    encoding = other,
                    "unknown encoding, using multipart/form-data"
                );
                Self::MultipartFormData
            }
        }
    }
}

impl fmt::Display for EncodingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

impl FromStr for EncodingType {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Infallible> {
        Ok(Self::from_str_lossy(s))
    }
}

impl From<&str> for EncodingType {
    fn from(s: &str) -> Self {
        Self::from_str_lossy(s)
    }
}

/// Serialize payload fields as an `application/x-www-form-urlencoded` string.
pub fn query_string(entries: &[(String, FormDataValue)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (name, value) in entries {
        serializer.append_pair(name, value.as_text());
    }
    serializer.finish()
}

/// Append an encoded query to `url`.
///
/// Joins with `&` when `url` already contains a `?`, with `?` otherwise.
/// A fragment, if any, stays at the end. An empty query leaves `url` as is.
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let (base, fragment) = match url.find('#') {
        Some(index) => url.split_at(index),
        None => (url, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{query}{fragment}")
}

/// A payload encoded for transmission.
pub(crate) enum WireBody {
    Bytes(Bytes),
    Multipart(reqwest::multipart::Form),
}

/// Encode a payload according to `encoding`.
///
/// A raw text payload is sent unchanged whatever the encoding.
pub(crate) fn encode_body(encoding: EncodingType, body: &FetchRequestBody) -> Result<WireBody> {
    let form = match body {
        FetchRequestBody::Text(text) => return Ok(WireBody::Bytes(Bytes::from(text.clone()))),
        FetchRequestBody::Form(form) => form,
    };

    match encoding {
        EncodingType::ApplicationJson => {
            let value = json_object(form.entries());
            Ok(WireBody::Bytes(Bytes::from(serde_json::to_vec(&value)?)))
        }
        EncodingType::FormUrlEncoded => Ok(WireBody::Bytes(Bytes::from(query_string(
            form.entries(),
        )))),
        EncodingType::MultipartFormData => {
            let mut multipart = reqwest::multipart::Form::new();
            for (name, value) in form.entries() {
                multipart = match value {
                    FormDataValue::Text(text) => multipart.text(name.clone(), text.clone()),
                    FormDataValue::File(file) => multipart.part(name.clone(), file_part(file)),
                };
            }
            Ok(WireBody::Multipart(multipart))
        }
    }
}

/// A multipart part for `file`; an unparsable MIME type is dropped.
fn file_part(file: &FormFile) -> reqwest::multipart::Part {
    let part = || {
        reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
    };
    match file.mime_type.as_deref() {
        Some(mime) => part().mime_str(mime).unwrap_or_else(|e| {
            tracing::warn!(target: TARGET, "Invalid MIME type '{}': {}", mime, e);
            part()
        }),
        None => part(),
    }
}

/// Fold form fields into a JSON object; repeated names become arrays.
fn json_object(entries: &[(String, FormDataValue)]) -> serde_json::Value {
    let mut object = serde_json::Map::new();
    for (name, value) in entries {
        let value = serde_json::Value::String(value.as_text().to_string());
        match object.get_mut(name) {
            Some(serde_json::Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = serde_json::Value::Array(vec![first, value]);
            }
            None => {
                object.insert(name.clone(), value);
            }
        }
    }
    serde_json::Value::Object(object)
}
