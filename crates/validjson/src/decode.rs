//! The decode pipeline.
//!
//! ```text
//! bytes ─► empty? ──yes──► MISSING_BODY
//!            │no
//!            ▼
//!          parse ──err──► MALFORMED_BODY   (body = raw input)
//!            │ok
//!            ▼
//!        normalize
//!            │
//!            ▼
//!         validate ──err──► redact ──► INVALID_BODY   (body = redacted value)
//!            │ok
//!            ▼
//!           Ok(())
//! ```
//!
//! Every failure is logged once through [`log_body_rejected!`] at the
//! configured level; the body itself is never logged.

use crate::body::{collect_body, read_body, BoxError};
use crate::capability::{self, RequestBody};
use http_body::Body;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::sync::OnceLock;
use tracing::{debug, debug_span};
use validjson_config::{DecodeConfig, RejectionLogLevel, ValidJsonConfig};
use validjson_core::{BodyError, BodyResult, RequestContext, BODY_FIELD};
use validjson_telemetry::log_body_rejected;

/// Decodes, normalizes and validates request bodies.
///
/// A `Decoder` only holds configuration; it keeps no state between calls and
/// can be shared freely across threads.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use validjson::{request_body, Decoder, ErrorCode, RequestContext};
/// use validjson_config::DecodeConfig;
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct CreateUser {
///     name: String,
/// }
/// request_body!(CreateUser);
///
/// let decoder = Decoder::new(DecodeConfig {
///     missing_body_message: "a user is required".to_string(),
///     ..DecodeConfig::default()
/// });
/// let ctx = RequestContext::new();
///
/// let mut user = CreateUser::default();
/// decoder.decode_body(&ctx, br#"{"name": "Alice"}"#, &mut user).unwrap();
/// assert_eq!(user.name, "Alice");
///
/// let err = decoder.decode_body(&ctx, b"", &mut user).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::MissingBody);
/// assert_eq!(err.message(), "a user is required");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecodeConfig,
}

impl Decoder {
    /// Creates a decoder with the given configuration.
    #[must_use]
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Creates a decoder from the `decode` section of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &ValidJsonConfig) -> Self {
        Self::new(config.decode.clone())
    }

    /// Returns the decoder's configuration.
    #[must_use]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decodes `bytes` into `target`, then normalizes and validates it.
    ///
    /// `target` is only overwritten once the bytes parse; on a missing or
    /// malformed body it is left untouched. On a validation failure it holds
    /// the decoded, normalized value.
    ///
    /// # Errors
    ///
    /// - [`ErrorCode::MissingBody`](crate::ErrorCode::MissingBody) if `bytes` is empty
    /// - [`ErrorCode::MalformedBody`](crate::ErrorCode::MalformedBody) if `bytes` is not a JSON `T`
    /// - [`ErrorCode::InvalidBody`](crate::ErrorCode::InvalidBody) if validation fails
    pub fn decode_body<T>(&self, ctx: &RequestContext, bytes: &[u8], target: &mut T) -> BodyResult<()>
    where
        T: RequestBody + DeserializeOwned,
    {
        let span = debug_span!("decode_body", request_id = %ctx.request_id(), body.len = bytes.len());
        let _enter = span.enter();

        *target = self.parse(ctx, bytes)?;
        self.check(ctx, target)
    }

    /// Decodes `bytes` into a new `T`, then normalizes and validates it.
    ///
    /// # Errors
    ///
    /// Same as [`Decoder::decode_body`].
    pub fn from_slice<T>(&self, ctx: &RequestContext, bytes: &[u8]) -> BodyResult<T>
    where
        T: RequestBody + DeserializeOwned,
    {
        let span = debug_span!("decode_body", request_id = %ctx.request_id(), body.len = bytes.len());
        let _enter = span.enter();

        let mut value = self.parse(ctx, bytes)?;
        self.check(ctx, &mut value)?;
        Ok(value)
    }

    /// Drains `reader`, then behaves as [`Decoder::decode_body`].
    ///
    /// # Errors
    ///
    /// A read failure is [`ErrorCode::MalformedBody`](crate::ErrorCode::MalformedBody)
    /// with the I/O error as its source and no `"body"` field. Otherwise the
    /// same as [`Decoder::decode_body`].
    pub fn decode_reader<R, T>(&self, ctx: &RequestContext, reader: R, target: &mut T) -> BodyResult<()>
    where
        R: Read,
        T: RequestBody + DeserializeOwned,
    {
        let bytes = read_body(reader).map_err(|e| {
            self.reject(
                ctx,
                BodyError::malformed_body(ctx, self.config.malformed_body_message.as_str(), e),
            )
        })?;

        self.decode_body(ctx, &bytes, target)
    }

    /// Collects an HTTP body, then behaves as [`Decoder::decode_body`].
    ///
    /// # Errors
    ///
    /// A stream failure is [`ErrorCode::MalformedBody`](crate::ErrorCode::MalformedBody)
    /// with the stream error as its source and no `"body"` field. Otherwise
    /// the same as [`Decoder::decode_body`].
    pub async fn decode_http_body<B, T>(
        &self,
        ctx: &RequestContext,
        body: B,
        target: &mut T,
    ) -> BodyResult<()>
    where
        B: Body,
        B::Error: Into<BoxError>,
        T: RequestBody + DeserializeOwned,
    {
        let bytes = collect_body(body).await.map_err(|e| {
            self.reject(
                ctx,
                BodyError::malformed_body(ctx, self.config.malformed_body_message.as_str(), e),
            )
        })?;

        self.decode_body(ctx, &bytes, target)
    }

    fn parse<T: DeserializeOwned>(&self, ctx: &RequestContext, bytes: &[u8]) -> BodyResult<T> {
        if bytes.is_empty() {
            let err = BodyError::missing_body(ctx, self.config.missing_body_message.as_str());
            return Err(self.reject(ctx, err));
        }

        serde_json::from_slice(bytes).map_err(|e| {
            // Nothing was decoded, so there is nothing to redact.
            let ctx = ctx.with_field(BODY_FIELD, String::from_utf8_lossy(bytes).into_owned());
            let err = BodyError::malformed_body(&ctx, self.config.malformed_body_message.as_str(), e);
            self.reject(&ctx, err)
        })
    }

    fn check<T: RequestBody>(&self, ctx: &RequestContext, body: &mut T) -> BodyResult<()> {
        capability::normalize(ctx, body);

        if let Err(validation) = capability::validate(ctx, body) {
            let ctx = ctx.with_field(BODY_FIELD, capability::try_redact(ctx, body));
            let err = BodyError::invalid_body(&ctx, validation);
            return Err(self.reject(&ctx, err));
        }

        debug!("request body accepted");
        Ok(())
    }

    fn reject(&self, ctx: &RequestContext, err: BodyError) -> BodyError {
        match self.config.rejection_log_level {
            RejectionLogLevel::Off => {}
            RejectionLogLevel::Debug => log_body_rejected!(debug, ctx.request_id(), err),
            RejectionLogLevel::Info => log_body_rejected!(info, ctx.request_id(), err),
            RejectionLogLevel::Warn => log_body_rejected!(warn, ctx.request_id(), err),
        }
        err
    }
}

fn default_decoder() -> &'static Decoder {
    static DEFAULT: OnceLock<Decoder> = OnceLock::new();
    DEFAULT.get_or_init(Decoder::default)
}

/// [`Decoder::decode_body`] with the default configuration.
///
/// # Errors
///
/// See [`Decoder::decode_body`].
pub fn decode_body<T>(ctx: &RequestContext, bytes: &[u8], target: &mut T) -> BodyResult<()>
where
    T: RequestBody + DeserializeOwned,
{
    default_decoder().decode_body(ctx, bytes, target)
}

/// [`Decoder::decode_reader`] with the default configuration.
///
/// # Errors
///
/// See [`Decoder::decode_reader`].
pub fn decode_reader<R, T>(ctx: &RequestContext, reader: R, target: &mut T) -> BodyResult<()>
where
    R: Read,
    T: RequestBody + DeserializeOwned,
{
    default_decoder().decode_reader(ctx, reader, target)
}

/// [`Decoder::decode_http_body`] with the default configuration.
///
/// # Errors
///
/// See [`Decoder::decode_http_body`].
pub async fn decode_http_body<B, T>(ctx: &RequestContext, body: B, target: &mut T) -> BodyResult<()>
where
    B: Body,
    B::Error: Into<BoxError>,
    T: RequestBody + DeserializeOwned,
{
    default_decoder().decode_http_body(ctx, body, target).await
}

/// [`Decoder::from_slice`] with the default configuration.
///
/// # Errors
///
/// See [`Decoder::from_slice`].
pub fn from_slice<T>(ctx: &RequestContext, bytes: &[u8]) -> BodyResult<T>
where
    T: RequestBody + DeserializeOwned,
{
    default_decoder().from_slice(ctx, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{request_body, Validator};
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::error::Error as _;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;
    use validjson_core::ErrorCode;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Account {
        user: String,
        password: String,
    }

    impl Validator for Account {
        fn validate(&self) -> anyhow::Result<()> {
            if self.user.is_empty() {
                anyhow::bail!("user is required");
            }
            Ok(())
        }
    }

    request_body!(Account: Validator);

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_logs(f: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.contents()
    }

    #[test]
    fn test_custom_messages() {
        let decoder = Decoder::new(DecodeConfig {
            missing_body_message: "body required".to_string(),
            malformed_body_message: "not json".to_string(),
            ..DecodeConfig::default()
        });
        let ctx = RequestContext::new();
        let mut account = Account::default();

        let err = decoder.decode_body(&ctx, b"", &mut account).unwrap_err();
        assert_eq!(err.message(), "body required");

        let err = decoder.decode_body(&ctx, b"{", &mut account).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MalformedBody);
        assert_eq!(err.message(), "not json");
    }

    #[test]
    fn test_from_config() {
        let mut config = ValidJsonConfig::production();
        config.decode.missing_body_message = "empty".to_string();

        let decoder = Decoder::from_config(&config);
        assert_eq!(decoder.config().missing_body_message, "empty");
        assert_eq!(decoder.config().rejection_log_level, RejectionLogLevel::Info);
    }

    #[test]
    fn test_from_slice() {
        let ctx = RequestContext::new();
        let account: Account = from_slice(&ctx, br#"{"user": "u", "password": "p"}"#).unwrap();
        assert_eq!(account.user, "u");

        let err = from_slice::<Account>(&ctx, br#"{"user": "", "password": "p"}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidBody);
    }

    #[test]
    fn test_parse_error_is_source() {
        let mut account = Account::default();
        let err = decode_body(&RequestContext::new(), b"[1, 2]", &mut account).unwrap_err();

        let source = err.source().expect("parse error should be kept");
        assert!(source.to_string().contains("invalid type"));
        assert_eq!(account, Account::default());
    }

    #[test]
    fn test_invalid_utf8_body_is_lossy_string() {
        let mut account = Account::default();
        let err = decode_body(&RequestContext::new(), &[0x7b, 0xff], &mut account).unwrap_err();

        assert_eq!(err.code(), ErrorCode::MalformedBody);
        assert_eq!(err.body(), Some(&json!("{\u{fffd}")));
    }

    #[test]
    fn test_rejection_logged_without_body() {
        let logs = capture_logs(|| {
            let mut account = Account::default();
            let _ = decode_body(
                &RequestContext::new(),
                br#"{"user": "", "password": "hunter2"}"#,
                &mut account,
            );
        });

        assert!(logs.contains("Request body rejected"), "{logs}");
        assert!(logs.contains("INVALID_BODY"), "{logs}");
        assert!(!logs.contains("hunter2"), "{logs}");
    }

    #[test]
    fn test_rejection_logging_off() {
        let decoder = Decoder::new(DecodeConfig {
            rejection_log_level: RejectionLogLevel::Off,
            ..DecodeConfig::default()
        });

        let logs = capture_logs(|| {
            let mut account = Account::default();
            let _ = decoder.decode_body(&RequestContext::new(), b"", &mut account);
        });

        assert!(!logs.contains("Request body rejected"), "{logs}");
    }

    proptest::proptest! {
        #[test]
        fn prop_malformed_body_echoes_input(input in "[a-z ]{1,32}") {
            let mut account = Account::default();
            let err = decode_body(&RequestContext::new(), input.as_bytes(), &mut account).unwrap_err();
            let raw = json!(input);

            proptest::prop_assert_eq!(err.code(), ErrorCode::MalformedBody);
            proptest::prop_assert_eq!(err.body(), Some(&raw));
            proptest::prop_assert_eq!(account, Account::default());
        }
    }
}
