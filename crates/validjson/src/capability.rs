//! Optional behaviors a decoded body may carry.
//!
//! Each role (normalize, validate, redact) comes in a context-free and a
//! context-aware flavor. A body declares which ones it has through the
//! capability hooks on [`RequestBody`]; the pipeline queries those hooks at
//! call time and runs at most one flavor per role, preferring the
//! context-aware one.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use validjson_core::RequestContext;

/// Mutates a decoded body in place (trimming, case folding, ...). Cannot fail.
pub trait Normalizer {
    /// Normalizes `self` in place.
    fn normalize(&mut self);
}

/// Context-aware [`Normalizer`].
pub trait ContextNormalizer {
    /// Normalizes `self` in place.
    fn normalize_with(&mut self, ctx: &RequestContext);
}

/// Checks a decoded, normalized body.
pub trait Validator {
    /// Returns the domain error describing why the body is invalid.
    ///
    /// # Errors
    ///
    /// Any error; its `Display` output becomes the rejection message.
    fn validate(&self) -> anyhow::Result<()>;
}

/// Context-aware [`Validator`].
pub trait ContextValidator {
    /// Returns the domain error describing why the body is invalid.
    ///
    /// # Errors
    ///
    /// Any error; its `Display` output becomes the rejection message.
    fn validate_with(&self, ctx: &RequestContext) -> anyhow::Result<()>;
}

/// Produces a copy of a body that is safe to log. Must not mutate `self`.
pub trait Redactor {
    /// Returns the sanitized stand-in for `self`.
    fn redacted(&self) -> Value;
}

/// Context-aware [`Redactor`].
pub trait ContextRedactor {
    /// Returns the sanitized stand-in for `self`.
    fn redacted_with(&self, ctx: &RequestContext) -> Value;
}

/// A type that request bodies can be decoded into.
///
/// The capability hooks all default to `None`. Override the ones whose
/// capability the type implements, or let [`request_body!`](crate::request_body)
/// write them:
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use validjson::{request_body, Normalizer};
///
/// #[derive(Default, Serialize, Deserialize)]
/// struct Tag {
///     name: String,
/// }
///
/// impl Normalizer for Tag {
///     fn normalize(&mut self) {
///         self.name = self.name.trim().to_lowercase();
///     }
/// }
///
/// request_body!(Tag: Normalizer);
/// ```
///
/// A type with no capabilities only needs an empty impl:
/// `request_body!(Plain);`
pub trait RequestBody: Serialize {
    /// Returns `self` as a [`Normalizer`], if it is one.
    fn as_normalizer(&mut self) -> Option<&mut dyn Normalizer> {
        None
    }

    /// Returns `self` as a [`ContextNormalizer`], if it is one.
    fn as_context_normalizer(&mut self) -> Option<&mut dyn ContextNormalizer> {
        None
    }

    /// Returns `self` as a [`Validator`], if it is one.
    fn as_validator(&self) -> Option<&dyn Validator> {
        None
    }

    /// Returns `self` as a [`ContextValidator`], if it is one.
    fn as_context_validator(&self) -> Option<&dyn ContextValidator> {
        None
    }

    /// Returns `self` as a [`Redactor`], if it is one.
    fn as_redactor(&self) -> Option<&dyn Redactor> {
        None
    }

    /// Returns `self` as a [`ContextRedactor`], if it is one.
    fn as_context_redactor(&self) -> Option<&dyn ContextRedactor> {
        None
    }
}

/// Implements [`RequestBody`] for one or more types, wiring the listed
/// capability hooks.
///
/// Capability names are the trait names: `Normalizer`, `ContextNormalizer`,
/// `Validator`, `ContextValidator`, `Redactor`, `ContextRedactor`. Each listed
/// trait must be implemented by the type.
///
/// ```
/// # use serde::{Deserialize, Serialize};
/// # use validjson::{request_body, ContextValidator, Redactor};
/// # use validjson::RequestContext;
/// # #[derive(Serialize, Deserialize)] struct Login { user: String, password: String }
/// # #[derive(Serialize, Deserialize)] struct Ping {}
/// # impl ContextValidator for Login {
/// #     fn validate_with(&self, _: &RequestContext) -> anyhow::Result<()> { Ok(()) }
/// # }
/// # impl Redactor for Login {
/// #     fn redacted(&self) -> serde_json::Value { serde_json::json!({"user": self.user}) }
/// # }
/// request_body! {
///     Login: ContextValidator, Redactor;
///     Ping;
/// }
/// ```
#[macro_export]
macro_rules! request_body {
    ($($ty:ty $(: $($capability:ident),+ $(,)?)?);+ $(;)?) => {
        $(
            impl $crate::RequestBody for $ty {
                $($($crate::__capability_hook!($capability);)+)?
            }
        )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capability_hook {
    (Normalizer) => {
        fn as_normalizer(&mut self) -> ::core::option::Option<&mut dyn $crate::Normalizer> {
            ::core::option::Option::Some(self)
        }
    };
    (ContextNormalizer) => {
        fn as_context_normalizer(
            &mut self,
        ) -> ::core::option::Option<&mut dyn $crate::ContextNormalizer> {
            ::core::option::Option::Some(self)
        }
    };
    (Validator) => {
        fn as_validator(&self) -> ::core::option::Option<&dyn $crate::Validator> {
            ::core::option::Option::Some(self)
        }
    };
    (ContextValidator) => {
        fn as_context_validator(&self) -> ::core::option::Option<&dyn $crate::ContextValidator> {
            ::core::option::Option::Some(self)
        }
    };
    (Redactor) => {
        fn as_redactor(&self) -> ::core::option::Option<&dyn $crate::Redactor> {
            ::core::option::Option::Some(self)
        }
    };
    (ContextRedactor) => {
        fn as_context_redactor(&self) -> ::core::option::Option<&dyn $crate::ContextRedactor> {
            ::core::option::Option::Some(self)
        }
    };
}

/// Which flavor of a capability ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The context-aware flavor ran.
    ContextAware,
    /// The context-free flavor ran.
    ContextFree,
    /// The body does not have the capability.
    Absent,
}

/// Runs the body's normalizer, if any.
pub fn normalize<T: RequestBody>(ctx: &RequestContext, body: &mut T) -> Dispatch {
    let dispatch = if let Some(normalizer) = body.as_context_normalizer() {
        normalizer.normalize_with(ctx);
        Dispatch::ContextAware
    } else if let Some(normalizer) = body.as_normalizer() {
        normalizer.normalize();
        Dispatch::ContextFree
    } else {
        Dispatch::Absent
    };

    debug!(request_id = %ctx.request_id(), ?dispatch, "normalize");
    dispatch
}

/// Runs the body's validator, if any. A body without one is valid.
///
/// # Errors
///
/// Returns the validator's domain error unchanged.
pub fn validate<T: RequestBody>(ctx: &RequestContext, body: &T) -> anyhow::Result<()> {
    let (dispatch, result) = if let Some(validator) = body.as_context_validator() {
        (Dispatch::ContextAware, validator.validate_with(ctx))
    } else if let Some(validator) = body.as_validator() {
        (Dispatch::ContextFree, validator.validate())
    } else {
        (Dispatch::Absent, Ok(()))
    };

    debug!(request_id = %ctx.request_id(), ?dispatch, valid = result.is_ok(), "validate");
    result
}

/// Returns the body's redacted stand-in, or the body itself when it has no
/// redactor.
///
/// Usable outside the failure path, e.g. to log a body elsewhere.
///
/// # Example
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use validjson::{request_body, try_redact};
/// use validjson::RequestContext;
///
/// #[derive(Serialize, Deserialize)]
/// struct Plain {
///     v: String,
/// }
/// request_body!(Plain);
///
/// let value = try_redact(&RequestContext::new(), &Plain { v: "a".into() });
/// assert_eq!(value, serde_json::json!({"v": "a"}));
/// ```
pub fn try_redact<T: RequestBody>(ctx: &RequestContext, body: &T) -> Value {
    if let Some(redactor) = body.as_context_redactor() {
        return redactor.redacted_with(ctx);
    }
    if let Some(redactor) = body.as_redactor() {
        return redactor.redacted();
    }

    serde_json::to_value(body).unwrap_or_else(|e| {
        warn!(request_id = %ctx.request_id(), error = %e, "body is not representable as JSON");
        Value::Null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Both {
        v: String,
    }

    impl Normalizer for Both {
        fn normalize(&mut self) {
            self.v = "plain".to_string();
        }
    }

    impl ContextNormalizer for Both {
        fn normalize_with(&mut self, _ctx: &RequestContext) {
            self.v = "context".to_string();
        }
    }

    impl Validator for Both {
        fn validate(&self) -> anyhow::Result<()> {
            anyhow::bail!("plain")
        }
    }

    impl ContextValidator for Both {
        fn validate_with(&self, _ctx: &RequestContext) -> anyhow::Result<()> {
            anyhow::bail!("context")
        }
    }

    impl Redactor for Both {
        fn redacted(&self) -> Value {
            json!("plain")
        }
    }

    impl ContextRedactor for Both {
        fn redacted_with(&self, ctx: &RequestContext) -> Value {
            ctx.field("redaction").cloned().unwrap_or(json!("context"))
        }
    }

    request_body!(Both: Normalizer, ContextNormalizer, Validator, ContextValidator, Redactor, ContextRedactor);

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct PlainOnly {
        v: String,
    }

    impl Normalizer for PlainOnly {
        fn normalize(&mut self) {
            self.v = self.v.to_uppercase();
        }
    }

    impl Validator for PlainOnly {
        fn validate(&self) -> anyhow::Result<()> {
            if self.v.is_empty() {
                anyhow::bail!("v is required");
            }
            Ok(())
        }
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Bare {
        v: String,
    }

    request_body! {
        PlainOnly: Normalizer, Validator;
        Bare;
    }

    #[test]
    fn test_context_normalizer_preferred() {
        let mut body = Both::default();
        let dispatch = normalize(&RequestContext::new(), &mut body);
        assert_eq!(dispatch, Dispatch::ContextAware);
        assert_eq!(body.v, "context");
    }

    #[test]
    fn test_plain_normalizer_used_alone() {
        let mut body = PlainOnly { v: "abc".to_string() };
        assert_eq!(normalize(&RequestContext::new(), &mut body), Dispatch::ContextFree);
        assert_eq!(body.v, "ABC");
    }

    #[test]
    fn test_normalize_absent_is_noop() {
        let mut body = Bare { v: " keep ".to_string() };
        assert_eq!(normalize(&RequestContext::new(), &mut body), Dispatch::Absent);
        assert_eq!(body.v, " keep ");
    }

    #[test]
    fn test_context_validator_preferred() {
        let err = validate(&RequestContext::new(), &Both::default()).unwrap_err();
        assert_eq!(err.to_string(), "context");
    }

    #[test]
    fn test_plain_validator() {
        let ctx = RequestContext::new();
        assert!(validate(&ctx, &PlainOnly { v: "x".to_string() }).is_ok());
        let err = validate(&ctx, &PlainOnly::default()).unwrap_err();
        assert_eq!(err.to_string(), "v is required");
    }

    #[test]
    fn test_validate_absent_succeeds() {
        assert!(validate(&RequestContext::new(), &Bare::default()).is_ok());
    }

    #[test]
    fn test_context_redactor_preferred_and_sees_context() {
        let ctx = RequestContext::new().with_field("redaction", "from context");
        assert_eq!(try_redact(&ctx, &Both::default()), json!("from context"));
    }

    #[test]
    fn test_try_redact_without_redactor_returns_value() {
        let body = PlainOnly { v: "secret".to_string() };
        assert_eq!(try_redact(&RequestContext::new(), &body), json!({"v": "secret"}));
    }

    #[test]
    fn test_try_redact_unrepresentable_body_is_null() {
        #[derive(Serialize)]
        struct BadKeys(std::collections::HashMap<(u8, u8), u8>);
        request_body!(BadKeys);

        let body = BadKeys(std::collections::HashMap::from([((1, 2), 3)]));
        assert_eq!(try_redact(&RequestContext::new(), &body), Value::Null);
    }
}
