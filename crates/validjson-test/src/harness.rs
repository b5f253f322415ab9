//! Entry-point equivalence harness.

use bytes::Bytes;
use http_body_util::Full;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::io::Cursor;
use validjson::{BodyError, BodyResult, Decoder, ErrorCode, Fields, RequestBody, RequestContext};

/// A decode entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    /// [`Decoder::decode_body`].
    Bytes,
    /// [`Decoder::decode_reader`].
    Reader,
    /// [`Decoder::decode_http_body`].
    HttpBody,
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes => write!(f, "bytes"),
            Self::Reader => write!(f, "reader"),
            Self::HttpBody => write!(f, "http body"),
        }
    }
}

/// The result of one decode call together with the target it wrote to.
#[derive(Debug)]
pub struct Outcome<T> {
    entry_point: EntryPoint,
    target: T,
    result: BodyResult<()>,
}

impl<T: fmt::Debug> Outcome<T> {
    /// Returns the entry point that produced this outcome.
    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Returns the target value after the call.
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Returns the error, if the call failed.
    pub fn error(&self) -> Option<&BodyError> {
        self.result.as_ref().err()
    }

    /// Asserts that the call succeeded.
    ///
    /// # Panics
    ///
    /// Panics if the call failed.
    pub fn assert_ok(&self) -> &Self {
        if let Err(err) = &self.result {
            panic!(
                "Expected {} decode to succeed, got {} ({err})",
                self.entry_point,
                err.code()
            );
        }
        self
    }

    /// Asserts that the target equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the target differs.
    pub fn assert_target(&self, expected: &T) -> &Self
    where
        T: PartialEq,
    {
        assert_eq!(
            &self.target, expected,
            "Unexpected target after {} decode",
            self.entry_point
        );
        self
    }

    /// Asserts that the call failed with `code`.
    ///
    /// # Panics
    ///
    /// Panics if the call succeeded or failed with another code.
    pub fn assert_code(&self, code: ErrorCode) -> &Self {
        let err = self.expect_error();
        assert_eq!(
            err.code(),
            code,
            "Expected {} decode to fail with {code}, got {} ({err})",
            self.entry_point,
            err.code()
        );
        self
    }

    /// Asserts that the error message contains `needle`.
    ///
    /// # Panics
    ///
    /// Panics if the call succeeded or the message does not contain `needle`.
    pub fn assert_message_contains(&self, needle: &str) -> &Self {
        let err = self.expect_error();
        assert!(
            err.message().contains(needle),
            "Expected message containing '{needle}', got '{}'",
            err.message()
        );
        self
    }

    /// Asserts that the error's `"body"` field equals `expected`.
    ///
    /// # Panics
    ///
    /// Panics if the call succeeded or the field differs.
    pub fn assert_body(&self, expected: Value) -> &Self {
        let err = self.expect_error();
        assert_eq!(
            err.body(),
            Some(&expected),
            "Unexpected body field after {} decode",
            self.entry_point
        );
        self
    }

    /// Asserts that the error has no `"body"` field.
    ///
    /// # Panics
    ///
    /// Panics if the call succeeded or the field is present.
    pub fn assert_no_body(&self) -> &Self {
        let err = self.expect_error();
        assert!(
            err.body().is_none(),
            "Expected no body field, got {:?}",
            err.body()
        );
        self
    }

    fn expect_error(&self) -> &BodyError {
        match &self.result {
            Ok(()) => panic!("Expected {} decode to fail, but it succeeded", self.entry_point),
            Err(err) => err,
        }
    }
}

/// Comparable summary of a result: `None` on success.
type Signature = Option<(ErrorCode, String, Fields)>;

fn signature(result: &BodyResult<()>) -> Signature {
    result
        .as_ref()
        .err()
        .map(|err| (err.code(), err.message().to_string(), err.fields().clone()))
}

/// Runs one input through every decode entry point.
///
/// Each entry point decodes into its own fresh `T::default()`. The harness
/// asserts that all of them agree on success/failure, error code, message,
/// field map and resulting target, then returns the bytes outcome.
#[derive(Debug, Clone, Default)]
pub struct DecodeHarness {
    decoder: Decoder,
    ctx: RequestContext,
}

impl DecodeHarness {
    /// Creates a harness with the default decoder and an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `decoder` for every call.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Decoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Uses `ctx` for every call.
    #[must_use]
    pub fn with_context(mut self, ctx: RequestContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Decodes `body` through a single entry point.
    pub async fn run_one<T>(&self, entry_point: EntryPoint, body: &[u8]) -> Outcome<T>
    where
        T: RequestBody + DeserializeOwned + Default,
    {
        let mut target = T::default();
        let result = match entry_point {
            EntryPoint::Bytes => self.decoder.decode_body(&self.ctx, body, &mut target),
            EntryPoint::Reader => {
                self.decoder
                    .decode_reader(&self.ctx, Cursor::new(body.to_vec()), &mut target)
            }
            EntryPoint::HttpBody => {
                let http_body = Full::new(Bytes::copy_from_slice(body));
                self.decoder
                    .decode_http_body(&self.ctx, http_body, &mut target)
                    .await
            }
        };

        Outcome {
            entry_point,
            target,
            result,
        }
    }

    /// Decodes `body` through every entry point and asserts they agree.
    ///
    /// # Panics
    ///
    /// Panics if any entry point disagrees with the bytes entry point.
    pub async fn run<T>(&self, body: &[u8]) -> Outcome<T>
    where
        T: RequestBody + DeserializeOwned + Default + PartialEq + fmt::Debug,
    {
        let expected = self.run_one::<T>(EntryPoint::Bytes, body).await;

        for entry_point in [EntryPoint::Reader, EntryPoint::HttpBody] {
            let other = self.run_one::<T>(entry_point, body).await;
            assert_eq!(
                signature(&other.result),
                signature(&expected.result),
                "{entry_point} and bytes decode disagree on the result"
            );
            assert_eq!(
                other.target, expected.target,
                "{entry_point} and bytes decode disagree on the target"
            );
        }

        expected
    }
}
