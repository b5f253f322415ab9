//! # validjson test
//!
//! Test utilities for validjson:
//!
//! - [`fixtures`]: request bodies covering every capability combination
//! - [`DecodeHarness`]: runs one input through every decode entry point
//!   (bytes, reader, HTTP body) and asserts the outcomes are identical
//! - [`Outcome`]: assertion helpers for a decode result
//!
//! ## Example
//!
//! ```
//! use validjson::ErrorCode;
//! use validjson_test::{fixtures::Redact, DecodeHarness};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let outcome = DecodeHarness::new().run::<Redact>(br#"{"v": "a"}"#).await;
//!
//! outcome
//!     .assert_code(ErrorCode::InvalidBody)
//!     .assert_body(serde_json::json!({"v": "redacted"}));
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/validjson-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod fixtures;
mod harness;

pub use harness::{DecodeHarness, EntryPoint, Outcome};
