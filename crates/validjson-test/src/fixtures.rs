//! Fixture request bodies.
//!
//! Each fixture wraps a single string field `v` (JSON key `"v"`) and carries a
//! different combination of capabilities.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validjson::{
    request_body, ContextNormalizer, ContextRedactor, ContextValidator, Normalizer, Redactor,
    RequestContext, Validator,
};

/// Value every fixture normalizer writes into `v`.
pub const NORMALIZED: &str = "normalized";

/// Value every fixture redactor writes into `v`.
pub const REDACTED: &str = "redacted";

/// Context-free normalizer, always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Normal {
    /// Payload.
    pub v: String,
}

impl Normalizer for Normal {
    fn normalize(&mut self) {
        self.v = NORMALIZED.to_string();
    }
}

impl Validator for Normal {
    fn validate(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Context-aware normalizer, always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalContext {
    /// Payload.
    pub v: String,
}

impl ContextNormalizer for NormalContext {
    fn normalize_with(&mut self, _ctx: &RequestContext) {
        self.v = NORMALIZED.to_string();
    }
}

impl ContextValidator for NormalContext {
    fn validate_with(&self, _ctx: &RequestContext) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Always invalid, with a context-free redactor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redact {
    /// Payload.
    pub v: String,
}

impl Validator for Redact {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::bail!("redact validate")
    }
}

impl Redactor for Redact {
    fn redacted(&self) -> Value {
        json!(Redact {
            v: REDACTED.to_string()
        })
    }
}

/// Always invalid, with a context-aware redactor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactContext {
    /// Payload.
    pub v: String,
}

impl ContextValidator for RedactContext {
    fn validate_with(&self, _ctx: &RequestContext) -> anyhow::Result<()> {
        anyhow::bail!("redact context validate")
    }
}

impl ContextRedactor for RedactContext {
    fn redacted_with(&self, _ctx: &RequestContext) -> Value {
        json!(RedactContext {
            v: REDACTED.to_string()
        })
    }
}

/// No capabilities at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoTransforms {
    /// Payload.
    pub v: String,
}

/// Always invalid, without a redactor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoRedact {
    /// Payload.
    pub v: String,
}

impl ContextValidator for NoRedact {
    fn validate_with(&self, _ctx: &RequestContext) -> anyhow::Result<()> {
        anyhow::bail!("no redact validate")
    }
}

/// Implements both flavors of every capability.
///
/// Each flavor leaves a sentinel naming itself: normalizers write `"plain"` or
/// `"context"` into `v`, validators fail with that word, and redactors return
/// it as a JSON string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentinel {
    /// Payload; holds the normalizer sentinel after decoding.
    pub v: String,
}

impl Normalizer for Sentinel {
    fn normalize(&mut self) {
        self.v = "plain".to_string();
    }
}

impl ContextNormalizer for Sentinel {
    fn normalize_with(&mut self, _ctx: &RequestContext) {
        self.v = "context".to_string();
    }
}

impl Validator for Sentinel {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::bail!("plain")
    }
}

impl ContextValidator for Sentinel {
    fn validate_with(&self, _ctx: &RequestContext) -> anyhow::Result<()> {
        anyhow::bail!("context")
    }
}

impl Redactor for Sentinel {
    fn redacted(&self) -> Value {
        json!("plain")
    }
}

impl ContextRedactor for Sentinel {
    fn redacted_with(&self, _ctx: &RequestContext) -> Value {
        json!("context")
    }
}

/// Normalizes by trimming and upper-casing; only valid if validation sees
/// exactly one normalization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordered {
    /// Payload.
    pub v: String,
    /// Number of normalization passes. Not part of the JSON shape.
    #[serde(skip)]
    pub normalize_runs: u32,
}

impl Normalizer for Ordered {
    fn normalize(&mut self) {
        self.v = self.v.trim().to_uppercase();
        self.normalize_runs += 1;
    }
}

impl Validator for Ordered {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.normalize_runs == 1,
            "normalized {} times before validation",
            self.normalize_runs
        );
        anyhow::ensure!(
            self.v == self.v.trim().to_uppercase(),
            "validation saw unnormalized value {:?}",
            self.v
        );
        anyhow::ensure!(!self.v.is_empty(), "v is required");
        Ok(())
    }
}

/// A realistic body: normalized, validated, and redacted using the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Upper-cased by normalization.
    pub upper: String,
    /// Trimmed by normalization.
    pub trimmed: String,
    /// Masked by redaction.
    pub secret: String,
    /// Must be `true` to pass validation.
    pub required: bool,
}

impl Normalizer for Example {
    fn normalize(&mut self) {
        self.upper = self.upper.to_uppercase();
        self.trimmed = self.trimmed.trim().to_string();
    }
}

impl Validator for Example {
    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.required, "'required' attr needs to be true");
        Ok(())
    }
}

impl ContextRedactor for Example {
    fn redacted_with(&self, _ctx: &RequestContext) -> Value {
        json!(Example {
            secret: "*****".to_string(),
            ..self.clone()
        })
    }
}

request_body! {
    Normal: Normalizer, Validator;
    NormalContext: ContextNormalizer, ContextValidator;
    Redact: Validator, Redactor;
    RedactContext: ContextValidator, ContextRedactor;
    NoTransforms;
    NoRedact: ContextValidator;
    Sentinel: Normalizer, ContextNormalizer, Validator, ContextValidator, Redactor, ContextRedactor;
    Ordered: Normalizer, Validator;
    Example: Normalizer, Validator, ContextRedactor;
}
