//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{ConfigError, ValidJsonConfig};

/// Separator between the prefix, section and key of an environment override.
const ENV_SEPARATOR: &str = "__";

/// Document format of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML document.
    Toml,
    /// JSON document.
    Json,
}

impl ConfigFormat {
    /// Infers the format from a file extension (`.toml` or `.json`, any case).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownFormat`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(ConfigError::UnknownFormat(path.display().to_string())),
        }
    }

    fn parse(self, content: &str) -> Result<ValidJsonConfig, ConfigError> {
        Ok(match self {
            Self::Toml => toml::from_str(content)?,
            Self::Json => serde_json::from_str(content)?,
        })
    }
}

/// Builds a [`ValidJsonConfig`] from layered sources.
///
/// Each layer replaces what came before it: a preset, then at most one
/// document (file or string), then environment overrides. [`load`](Self::load)
/// validates the result.
///
/// # Example
///
/// ```
/// use validjson_config::{ConfigFormat, ConfigLoader, RejectionLogLevel};
///
/// let toml = r#"
///     [decode]
///     rejection_log_level = "warn"
/// "#;
///
/// let config = ConfigLoader::new()
///     .with_string(toml, ConfigFormat::Toml)
///     .unwrap()
///     .load()
///     .unwrap();
///
/// assert_eq!(config.decode.rejection_log_level, RejectionLogLevel::Warn);
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: ValidJsonConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Starts from [`ValidJsonConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from [`ValidJsonConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = ValidJsonConfig::development();
        self
    }

    /// Starts from [`ValidJsonConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = ValidJsonConfig::production();
        self
    }

    /// Replaces the configuration with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or unreadable, its extension is not
    /// `toml`/`json`, or it does not match the schema.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        self.with_string(&content, format)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Replaces the configuration with a document held in memory.
    ///
    /// # Errors
    ///
    /// Fails if `content` does not match the schema.
    pub fn with_string(mut self, content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        self.config = format.parse(content)?;
        Ok(self)
    }

    /// Enables overrides from `PREFIX__SECTION__KEY` variables, e.g.
    /// `VALIDJSON__DECODE__MISSING_BODY_MESSAGE`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads `.env` into the process environment, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        // Missing .env is fine.
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies environment overrides and validates the result.
    ///
    /// # Errors
    ///
    /// Fails on an override that cannot be parsed or on an invalid final
    /// configuration.
    pub fn load(mut self) -> Result<ValidJsonConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_overrides(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    fn apply_overrides<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let head = format!("{prefix}{ENV_SEPARATOR}");
        for (var, value) in vars {
            if let Some(path) = var.strip_prefix(&head) {
                self.apply_override(&var, path, &value)?;
            }
        }
        Ok(())
    }

    fn apply_override(&mut self, var: &str, path: &str, value: &str) -> Result<(), ConfigError> {
        let decode = &mut self.config.decode;
        let logging = &mut self.config.logging;

        match path.split_once(ENV_SEPARATOR) {
            Some(("DECODE", "MISSING_BODY_MESSAGE")) => decode.missing_body_message = value.to_string(),
            Some(("DECODE", "MALFORMED_BODY_MESSAGE")) => {
                decode.malformed_body_message = value.to_string();
            }
            Some(("DECODE", "REJECTION_LOG_LEVEL")) => decode.rejection_log_level = keyword(var, value)?,
            Some(("LOGGING", "ENABLED")) => logging.enabled = flag(var, value)?,
            Some(("LOGGING", "LEVEL")) => logging.level = value.to_string(),
            Some(("LOGGING", "FORMAT")) => logging.format = keyword(var, value)?,
            Some(("LOGGING", "ANSI_ENABLED")) => logging.ansi_enabled = flag(var, value)?,
            Some(("LOGGING", "INCLUDE_LOCATION")) => logging.include_location = flag(var, value)?,
            // Unrecognized overrides are ignored.
            _ => {}
        }
        Ok(())
    }
}

/// Parses a lowercase enum keyword through the type's serde representation.
fn keyword<T: DeserializeOwned>(var: &str, value: &str) -> Result<T, ConfigError> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|e| ConfigError::env(var, value, e.to_string()))
}

fn flag(var: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env(var, value, "expected a boolean")),
    }
}
