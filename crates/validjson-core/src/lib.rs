//! # validjson core
//!
//! Shared types for the validjson request-body pipeline:
//!
//! - [`RequestContext`] - Immutable, layered carrier of request-scoped diagnostic fields
//! - [`RequestId`] - UUID v7 request identifier
//! - [`BodyError`] - Structured, HTTP-annotated body error
//! - [`ErrorCode`] - The fixed set of body error kinds

#![doc(html_root_url = "https://docs.rs/validjson-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;

pub use context::{Fields, RequestContext, RequestId};
pub use error::{BodyError, BodyResult, ErrorCode, ErrorEnvelope, BODY_FIELD};
