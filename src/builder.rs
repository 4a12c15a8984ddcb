//! Builder for transport settings.
//!
//! The builder supports layered configuration from multiple sources:
//! 1. Compiled defaults (every field unset)
//! 2. Configuration files (TOML)
//! 3. Environment variables
//! 4. Programmatic overrides
//!
//! Sources are merged in order, with later sources taking precedence.

use crate::ConfigurationError;
use crate::config::TransportSettings;
use crate::transport::Transport;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use std::path::Path;

/// Settings fields holding opaque text, read from the environment unparsed.
const STRING_FIELDS: &[&str] = &["site", "api_key", "api_key_secret_arn", "api_kms_key"];

/// Standard Datadog variables for the string fields.
const STANDARD_STRING_ENV: &[(&str, &str)] = &[
    ("DD_SITE", "site"),
    ("DD_API_KEY", "api_key"),
    ("DD_API_KEY_SECRET_ARN", "api_key_secret_arn"),
    ("DD_KMS_API_KEY", "api_kms_key"),
];

/// Standard Datadog variables for the typed fields.
const STANDARD_TYPED_ENV: &[(&str, &str)] = &[
    ("DD_FLUSH_TO_LOG", "flush_metrics_to_logs"),
    ("DD_EXTENSION_LAYER_VERSION", "extension_layer_version"),
];

/// Merges string fields straight from the process environment.
///
/// figment's `Env` provider parses values, which would turn an API key of
/// `0042` into the integer `42`.
fn merge_verbatim_env<F>(mut figment: Figment, field_for: F) -> Figment
where
    F: Fn(&str) -> Option<&'static str>,
{
    for (var, value) in std::env::vars_os() {
        let (Some(var), Ok(value)) = (var.to_str(), value.into_string()) else {
            continue;
        };
        if let Some(field) = field_for(var) {
            figment = figment.merge(Serialized::default(field, value));
        }
    }
    figment
}

/// Builder for layering transport settings and resolving a [`Transport`].
///
/// # Example
///
/// ```no_run
/// use transport_configuration::{ConfigurationError, TransportBuilder};
///
/// fn main() -> Result<(), ConfigurationError> {
///     // Defaults only: flush to logs, datadoghq.com
///     let _transport = TransportBuilder::new().build()?;
///
///     // Full configuration
///     let _transport = TransportBuilder::new()
///         .with_file("datadog.toml")
///         .with_standard_env()
///         .site("datadoghq.eu")
///         .extension_layer_version(49)
///         .build()?;
///
///     Ok(())
/// }
/// ```
#[must_use = "builders do nothing unless .build() is called"]
pub struct TransportBuilder {
    figment: Figment,
}

impl TransportBuilder {
    /// Creates a new builder with every setting unset.
    pub fn new() -> Self {
        Self {
            figment: Figment::from(Serialized::defaults(TransportSettings::default())),
        }
    }

    /// Creates a builder from an existing figment.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use figment::{Figment, providers::{Env, Format, Toml}};
    /// use transport_configuration::{ConfigurationError, TransportBuilder};
    ///
    /// let figment = Figment::new()
    ///     .merge(Toml::file("/etc/datadog-defaults.toml"))
    ///     .merge(Env::prefixed("DATADOG_"));
    ///
    /// let _transport = TransportBuilder::from_figment(figment)
    ///     .flush_metrics_to_logs(false)
    ///     .build()?;
    /// # Ok::<(), ConfigurationError>(())
    /// ```
    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Merges settings from a TOML file.
    ///
    /// If the file doesn't exist, it's silently skipped. Keys use the field
    /// names of [`TransportSettings`]:
    ///
    /// ```toml
    /// flush_metrics_to_logs = false
    /// site = "datadoghq.eu"
    /// api_kms_key = "AQICAHh..."
    /// ```
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        let path = path.as_ref();
        if path.exists() {
            self.figment = self.figment.merge(Toml::file(path));
        }
        self
    }

    /// Merges settings from environment variables with the given prefix.
    ///
    /// For example, with prefix `DATADOG_`:
    /// - `DATADOG_SITE` → `site`
    /// - `DATADOG_API_KMS_KEY` → `api_kms_key`
    /// - `DATADOG_FLUSH_METRICS_TO_LOGS` → `flush_metrics_to_logs`
    pub fn with_env(mut self, prefix: &str) -> Self {
        self.figment = self
            .figment
            .merge(Env::prefixed(prefix).ignore(STRING_FIELDS));
        self.figment = merge_verbatim_env(self.figment, |var| {
            let key = var
                .get(..prefix.len())
                .filter(|head| head.eq_ignore_ascii_case(prefix))
                .map(|_| &var[prefix.len()..])?;
            STRING_FIELDS
                .iter()
                .find(|field| field.eq_ignore_ascii_case(key))
                .copied()
        });
        self
    }

    /// Merges settings from the standard Datadog environment variables:
    /// - `DD_SITE` → site
    /// - `DD_API_KEY` → plaintext API key
    /// - `DD_API_KEY_SECRET_ARN` → API key secret ARN
    /// - `DD_KMS_API_KEY` → KMS-encrypted API key
    /// - `DD_FLUSH_TO_LOG` → flush metrics to logs
    /// - `DD_EXTENSION_LAYER_VERSION` → extension layer version
    pub fn with_standard_env(mut self) -> Self {
        let vars: Vec<&'static str> = STANDARD_TYPED_ENV.iter().map(|(var, _)| *var).collect();
        let env = Env::raw().only(&vars).map(|key| {
            STANDARD_TYPED_ENV
                .iter()
                .find(|(var, _)| key.as_str().eq_ignore_ascii_case(var))
                .map_or_else(|| key.as_str().to_owned(), |(_, field)| (*field).to_owned())
                .into()
        });
        self.figment = self.figment.merge(env);
        self.figment = merge_verbatim_env(self.figment, |var| {
            STANDARD_STRING_ENV
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(var))
                .map(|(_, field)| *field)
        });
        self
    }

    /// Sets whether metrics are flushed to logs.
    ///
    /// Default: `true`. Ignored when an extension layer version is set.
    pub fn flush_metrics_to_logs(mut self, enabled: bool) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("flush_metrics_to_logs", enabled));
        self
    }

    /// Sets the Datadog site.
    ///
    /// Default: `datadoghq.com`
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("site", site.into()));
        self
    }

    /// Sets a plaintext API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("api_key", key.into()));
        self
    }

    /// Sets the ARN of a Secrets Manager secret holding the API key.
    pub fn api_key_secret_arn(mut self, arn: impl Into<String>) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("api_key_secret_arn", arn.into()));
        self
    }

    /// Sets a KMS-encrypted API key.
    pub fn api_kms_key(mut self, key: impl Into<String>) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("api_kms_key", key.into()));
        self
    }

    /// Sets the Datadog extension layer version.
    ///
    /// Metrics are then submitted by the extension and flushing to logs is
    /// disabled.
    pub fn extension_layer_version(mut self, version: u32) -> Self {
        self.figment = self
            .figment
            .merge(Serialized::default("extension_layer_version", version));
        self
    }

    /// Extracts the raw settings for inspection or debugging.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or if the site is empty.
    pub fn extract_settings(&self) -> Result<TransportSettings, ConfigurationError> {
        let settings: TransportSettings = self.figment.extract()?;

        if settings.site.as_deref().is_some_and(|site| site.trim().is_empty()) {
            return Err(ConfigurationError::EmptySite);
        }

        Ok(settings)
    }

    /// Resolves the layered settings into a [`Transport`].
    ///
    /// # Errors
    ///
    /// Returns an error if extraction fails or if the site is empty.
    pub fn build(self) -> Result<Transport, ConfigurationError> {
        self.extract_settings().map(Transport::new)
    }
}

impl Default for TransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
