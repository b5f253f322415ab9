//! Request context types.
//!
//! The [`RequestContext`] carries request-scoped diagnostic fields through the
//! decode pipeline and into the errors it produces.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Diagnostic fields keyed by name, in the order they were first set.
pub type Fields = IndexMap<String, Value>;

/// Correlates the log events of one request. A time-ordered UUID v7.
///
/// Generate one per request, or parse the ID an upstream proxy sent:
///
/// ```
/// use validjson_core::RequestId;
///
/// let upstream: RequestId = "0190b6d2-8f4e-7c3a-9b1d-2f6a5e4c3b21".parse().unwrap();
/// assert_eq!(upstream.to_string(), "0190b6d2-8f4e-7c3a-9b1d-2f6a5e4c3b21");
/// assert_ne!(RequestId::new(), upstream);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RequestId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// One layer of the field chain. Frames are shared and never mutated.
#[derive(Debug)]
struct Frame {
    key: String,
    value: Value,
    parent: Option<Arc<Frame>>,
}

/// Immutable, layered carrier of request-scoped diagnostic fields.
///
/// Setting a field returns a new handle layered on top of the old one; the
/// original handle and every other handle derived from it are unaffected.
/// Cloning is cheap (an `Arc` bump), so a parent context can be shared by
/// any number of concurrent decode calls.
///
/// The decode pipeline attaches diagnostic fields to the context and copies
/// the merged field map into every error it produces. It never reads
/// application-specific fields back out.
///
/// # Example
///
/// ```
/// use validjson_core::RequestContext;
///
/// let root = RequestContext::new();
/// let ctx = root.with_field("pathParam", "id");
///
/// assert_eq!(ctx.field("pathParam"), Some(&serde_json::json!("id")));
/// assert!(root.field("pathParam").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    head: Option<Arc<Frame>>,
}

impl RequestContext {
    /// Creates a new, empty context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_request_id(RequestId::new())
    }

    /// Creates a new, empty context with the specified request ID.
    #[must_use]
    pub fn with_request_id(request_id: RequestId) -> Self {
        Self {
            request_id,
            head: None,
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns a new context with `key` set to `value`.
    ///
    /// A later value for the same key shadows the earlier one. `self` is
    /// left untouched.
    #[must_use]
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            request_id: self.request_id,
            head: Some(Arc::new(Frame {
                key: key.into(),
                value: value.into(),
                parent: self.head.clone(),
            })),
        }
    }

    /// Returns a new context with every `(key, value)` pair layered on in order.
    #[must_use]
    pub fn with_fields<K, V, I>(&self, fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        fields
            .into_iter()
            .fold(self.clone(), |ctx, (key, value)| ctx.with_field(key, value))
    }

    /// Returns the most recently set value for `key`.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.frames().find(|frame| frame.key == key).map(|frame| &frame.value)
    }

    /// Returns the merged field map.
    ///
    /// Keys appear in the order they were first set; shadowed keys carry the
    /// newest value.
    #[must_use]
    pub fn fields(&self) -> Fields {
        let mut layers: Vec<&Frame> = self.frames().collect();
        layers.reverse();

        let mut fields = Fields::with_capacity(layers.len());
        for frame in layers {
            fields.insert(frame.key.clone(), frame.value.clone());
        }
        fields
    }

    /// Returns `true` if no field has been set on this context.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Newest frame first.
    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(self.head.as_deref(), |frame| frame.parent.as_deref())
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_request_ids_are_time_ordered() {
        let first = Uuid::from(RequestId::new());
        let second = Uuid::from(RequestId::new());
        assert_eq!(first.get_version_num(), 7);
        assert!(first < second);
    }

    #[test]
    fn test_request_id_parse() {
        let id: RequestId = " 0190b6d2-8f4e-7c3a-9b1d-2f6a5e4c3b21 ".parse().unwrap();
        assert_eq!(id.to_string(), "0190b6d2-8f4e-7c3a-9b1d-2f6a5e4c3b21");
        assert!("not-an-id".parse::<RequestId>().is_err());
    }

    #[test]
    fn test_new_context_is_empty() {
        let ctx = RequestContext::new();
        assert!(ctx.is_empty());
        assert!(ctx.fields().is_empty());
        assert!(ctx.field("body").is_none());
    }

    #[test]
    fn test_with_field_does_not_mutate_parent() {
        let parent = RequestContext::new().with_field("tenant", "acme");
        let child = parent.with_field("pathParam", "id");

        assert_eq!(parent.fields().len(), 1);
        assert_eq!(child.fields().len(), 2);
        assert!(parent.field("pathParam").is_none());
        assert_eq!(child.field("tenant"), Some(&json!("acme")));
    }

    #[test]
    fn test_siblings_are_independent() {
        let parent = RequestContext::new().with_field("shared", 1);
        let left = parent.with_field("side", "left");
        let right = parent.with_field("side", "right");

        assert_eq!(left.field("side"), Some(&json!("left")));
        assert_eq!(right.field("side"), Some(&json!("right")));
        assert_eq!(left.request_id(), right.request_id());
    }

    #[test]
    fn test_shadowed_field_keeps_first_position() {
        let ctx = RequestContext::new()
            .with_field("a", 1)
            .with_field("b", 2)
            .with_field("a", 3);

        let fields = ctx.fields();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b"]);
        assert_eq!(fields["a"], json!(3));
        assert_eq!(ctx.field("a"), Some(&json!(3)));
    }

    #[test]
    fn test_with_fields_layers_in_order() {
        let ctx = RequestContext::new().with_fields([("x", json!(1)), ("y", json!("two"))]);
        assert_eq!(ctx.fields(), Fields::from([
            ("x".to_string(), json!(1)),
            ("y".to_string(), json!("two")),
        ]));
    }

    #[test]
    fn test_context_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RequestContext>();
    }

    proptest! {
        #[test]
        fn prop_child_fields_extend_parent(
            base in proptest::collection::vec(("[a-z]{1,4}", any::<i64>()), 0..8),
            key in "[a-z]{1,4}",
            value in any::<i64>(),
        ) {
            let parent = RequestContext::new().with_fields(base.clone());
            let before = parent.fields();
            let child = parent.with_field(key.clone(), value);

            prop_assert_eq!(parent.fields(), before.clone());
            prop_assert_eq!(child.field(&key), Some(&json!(value)));
            for (k, v) in &before {
                if *k != key {
                    prop_assert_eq!(child.field(k), Some(v));
                }
            }
        }
    }
}
