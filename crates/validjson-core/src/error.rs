//! Body error types.
//!
//! This module provides [`BodyError`], the single error value a failing decode
//! call returns. Every error carries:
//! - One of three fixed [`ErrorCode`]s
//! - The HTTP status for that code
//! - A human-readable message
//! - The merged diagnostic field map of the [`RequestContext`] it was built from
//! - The wrapped parser, I/O or validation error, if any
//!
//! | `ErrorCode` | Code string | Status | `"body"` field |
//! |---|---|---|---|
//! | `MissingBody` | `MISSING_BODY` | 400 | absent |
//! | `MalformedBody` | `MALFORMED_BODY` | 400 | raw input string |
//! | `InvalidBody` | `INVALID_BODY` | 400 | redacted or decoded value |

use crate::context::{Fields, RequestContext};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Field key under which the raw or redacted request body is attached.
pub const BODY_FIELD: &str = "body";

/// Result type alias using [`BodyError`].
pub type BodyResult<T> = Result<T, BodyError>;

/// The fixed set of body error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request body was empty.
    MissingBody,
    /// The request body could not be read or parsed.
    MalformedBody,
    /// The request body parsed but failed validation.
    InvalidBody,
}

impl ErrorCode {
    /// Returns the machine-readable code string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingBody => "MISSING_BODY",
            Self::MalformedBody => "MALFORMED_BODY",
            Self::InvalidBody => "INVALID_BODY",
        }
    }

    /// Returns the HTTP status code for this error kind.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingBody | Self::MalformedBody | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured, HTTP-annotated error produced by a failing decode call.
///
/// # Example
///
/// ```
/// use validjson_core::{BodyError, ErrorCode, RequestContext};
/// use http::StatusCode;
///
/// let ctx = RequestContext::new().with_field("pathParam", "id");
/// let err = BodyError::missing_body(&ctx, "missing request body");
///
/// assert_eq!(err.code(), ErrorCode::MissingBody);
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.to_string(), "missing request body");
/// assert!(err.body().is_none());
/// assert_eq!(err.fields()["pathParam"], "id");
/// ```
#[derive(Error, Debug)]
#[error("{message}")]
pub struct BodyError {
    code: ErrorCode,
    message: String,
    fields: Fields,
    /// The underlying parser, I/O or validation error.
    #[source]
    source: Option<anyhow::Error>,
}

impl BodyError {
    /// Creates an error whose field map is a snapshot of `ctx`.
    #[must_use]
    pub fn new(code: ErrorCode, ctx: &RequestContext, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: ctx.fields(),
            source: None,
        }
    }

    /// Creates an error wrapping `source`, whose field map is a snapshot of `ctx`.
    pub fn wrap(
        code: ErrorCode,
        ctx: &RequestContext,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            fields: ctx.fields(),
            source: Some(source.into()),
        }
    }

    /// Creates a [`ErrorCode::MissingBody`] error.
    #[must_use]
    pub fn missing_body(ctx: &RequestContext, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingBody, ctx, message)
    }

    /// Creates a [`ErrorCode::MalformedBody`] error wrapping the read or parse failure.
    pub fn malformed_body(
        ctx: &RequestContext,
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::wrap(ErrorCode::MalformedBody, ctx, message, source)
    }

    /// Creates a [`ErrorCode::InvalidBody`] error.
    ///
    /// The message is the validation error's own message, verbatim.
    #[must_use]
    pub fn invalid_body(ctx: &RequestContext, validation: anyhow::Error) -> Self {
        let message = validation.to_string();
        Self::wrap(ErrorCode::InvalidBody, ctx, message, validation)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns every diagnostic field, including those set upstream.
    #[must_use]
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Returns a single diagnostic field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the raw or redacted body attached to this error.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.field(BODY_FIELD)
    }

    /// Consumes the error and returns its field map.
    #[must_use]
    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            code: self.code,
            http_status: self.status_code().as_u16(),
            message: self.message.clone(),
            fields: self.fields.clone(),
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error envelope.
///
/// This is the wire shape other systems match against:
/// `{"code": "...", "httpStatus": 400, "message": "...", "fields": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    /// Machine-readable error code.
    pub code: ErrorCode,
    /// HTTP status code.
    pub http_status: u16,
    /// Human-readable error message.
    pub message: String,
    /// Diagnostic fields.
    pub fields: Fields,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<String>,
}
