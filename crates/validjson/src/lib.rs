//! # validjson
//!
//! Decodes JSON request bodies into caller-owned values, then normalizes,
//! validates and, when validation fails, redacts them before returning a
//! structured, HTTP-annotated [`BodyError`].
//!
//! ## Pipeline
//!
//! | Step | Runs when | Failure |
//! |------|-----------|---------|
//! | Acquire | always | stream error → `MALFORMED_BODY` |
//! | Parse | body is non-empty | empty → `MISSING_BODY`, parse error → `MALFORMED_BODY` |
//! | Normalize | body is a [`Normalizer`] / [`ContextNormalizer`] | cannot fail |
//! | Validate | body is a [`Validator`] / [`ContextValidator`] | → `INVALID_BODY` |
//! | Redact | validation failed and body is a [`Redactor`] / [`ContextRedactor`] | - |
//!
//! When a body has both flavors of a capability, only the context-aware one
//! runs. All three error kinds map to HTTP 400.
//!
//! ## Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use validjson::{decode_body, request_body, ContextRedactor, ErrorCode, Normalizer, RequestContext, Validator};
//!
//! #[derive(Debug, Clone, Default, Serialize, Deserialize)]
//! struct Signup {
//!     email: String,
//!     password: String,
//!     accept_terms: bool,
//! }
//!
//! impl Normalizer for Signup {
//!     fn normalize(&mut self) {
//!         self.email = self.email.trim().to_lowercase();
//!     }
//! }
//!
//! impl Validator for Signup {
//!     fn validate(&self) -> anyhow::Result<()> {
//!         anyhow::ensure!(self.accept_terms, "terms must be accepted");
//!         Ok(())
//!     }
//! }
//!
//! impl ContextRedactor for Signup {
//!     fn redacted_with(&self, _ctx: &RequestContext) -> serde_json::Value {
//!         serde_json::json!({ "email": self.email, "password": "*****" })
//!     }
//! }
//!
//! request_body!(Signup: Normalizer, Validator, ContextRedactor);
//!
//! let ctx = RequestContext::new().with_field("route", "/signup");
//! let mut signup = Signup::default();
//!
//! let body = br#"{"email": " Ann@Example.com ", "password": "hunter2", "accept_terms": false}"#;
//! let err = decode_body(&ctx, body, &mut signup).unwrap_err();
//!
//! assert_eq!(err.code(), ErrorCode::InvalidBody);
//! assert_eq!(err.to_string(), "terms must be accepted");
//! assert_eq!(err.fields()["route"], "/signup");
//! assert_eq!(err.body().unwrap()["password"], "*****");
//! assert_eq!(signup.email, "ann@example.com");
//! ```

#![doc(html_root_url = "https://docs.rs/validjson/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod capability;
mod decode;

pub use body::{collect_body, read_body, BodyReadError, BoxError};
pub use capability::{
    normalize, try_redact, validate, ContextNormalizer, ContextRedactor, ContextValidator,
    Dispatch, Normalizer, Redactor, RequestBody, Validator,
};
pub use decode::{decode_body, decode_http_body, decode_reader, from_slice, Decoder};

// Re-export the shared types callers need alongside the pipeline
pub use validjson_core::{
    BodyError, BodyResult, ErrorCode, ErrorEnvelope, Fields, RequestContext, RequestId, BODY_FIELD,
};
