//! Raw transport settings and the environment variable names they map to.
//!
//! [`TransportSettings`] is designed to be deserialised from multiple sources
//! using figment. Every field is optional; defaults are applied when the
//! settings are resolved into a [`Transport`](crate::Transport).

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Site used when none is configured.
pub const DEFAULT_SITE: &str = "datadoghq.com";

/// Whether metrics are flushed to logs when nothing says otherwise.
pub const DEFAULT_FLUSH_METRICS_TO_LOGS: bool = true;

/// Environment variable carrying the resolved flush-to-logs flag.
pub const FLUSH_METRICS_TO_LOGS_ENV_VAR: &str = "FLUSH_METRICS_TO_LOGS";

/// Environment variable carrying the Datadog site.
pub const SITE_URL_ENV_VAR: &str = "DD_SITE";

/// Environment variable carrying a plaintext API key.
pub const API_KEY_ENV_VAR: &str = "DD_API_KEY";

/// Environment variable carrying the ARN of a secret holding the API key.
pub const API_KEY_SECRET_ARN_ENV_VAR: &str = "DD_API_KEY_SECRET_ARN";

/// Environment variable carrying a KMS-encrypted API key.
pub const KMS_API_KEY_ENV_VAR: &str = "DD_KMS_API_KEY";

/// Partially specified transport settings, as supplied by the caller.
///
/// Absent fields fall back to documented defaults during resolution:
/// - `flush_metrics_to_logs`: `true` (forced to `false` when an extension is used)
/// - `site`: [`DEFAULT_SITE`]
///
/// Credential fields are kept verbatim; more than one may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Write metrics to the log stream instead of submitting them directly.
    pub flush_metrics_to_logs: Option<bool>,

    /// Datadog site, e.g. `datadoghq.eu`.
    #[serde(deserialize_with = "scalar_string")]
    pub site: Option<String>,

    /// Plaintext API key.
    #[serde(deserialize_with = "scalar_string")]
    pub api_key: Option<String>,

    /// ARN of a Secrets Manager secret holding the API key.
    #[serde(deserialize_with = "scalar_string")]
    pub api_key_secret_arn: Option<String>,

    /// KMS-encrypted API key.
    #[serde(deserialize_with = "scalar_string")]
    pub api_kms_key: Option<String>,

    /// Version of the Datadog Lambda extension layer, if one is attached.
    pub extension_layer_version: Option<u32>,
}

impl TransportSettings {
    /// Creates settings with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates settings for a deployment that attaches the Datadog extension.
    #[must_use]
    pub fn with_extension(version: u32) -> Self {
        Self {
            extension_layer_version: Some(version),
            ..Default::default()
        }
    }
}

/// Accepts any scalar as a string.
///
/// Environment providers parse `1234` as an integer, but credentials and
/// sites are opaque text and must come through unchanged.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string or scalar value")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_option(ScalarString)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::Serialized;

    #[test]
    fn test_settings_default_is_empty() {
        let settings = TransportSettings::default();
        assert_eq!(settings.flush_metrics_to_logs, None);
        assert_eq!(settings.site, None);
        assert_eq!(settings.api_key, None);
        assert_eq!(settings.api_key_secret_arn, None);
        assert_eq!(settings.api_kms_key, None);
        assert_eq!(settings.extension_layer_version, None);
    }

    #[test]
    fn test_settings_with_extension() {
        let settings = TransportSettings::with_extension(49);
        assert_eq!(settings.extension_layer_version, Some(49));
        assert_eq!(settings.flush_metrics_to_logs, None);
    }

    #[test]
    fn numeric_credentials_extract_as_strings() {
        let settings: TransportSettings = Figment::from(Serialized::defaults(
            TransportSettings::default(),
        ))
        .merge(Serialized::default("api_key", 1234))
        .merge(Serialized::default("api_key_secret_arn", 42))
        .merge(Serialized::default("api_kms_key", 7u64))
        .merge(Serialized::default("site", 5))
        .extract()
        .unwrap();

        assert_eq!(settings.api_key, Some("1234".to_string()));
        assert_eq!(settings.api_key_secret_arn, Some("42".to_string()));
        assert_eq!(settings.api_kms_key, Some("7".to_string()));
        assert_eq!(settings.site, Some("5".to_string()));
    }

    #[test]
    fn string_credentials_extract_verbatim() {
        let settings: TransportSettings = Figment::from(Serialized::defaults(
            TransportSettings::default(),
        ))
        .merge(Serialized::default("api_key", "0042"))
        .extract()
        .unwrap();

        assert_eq!(settings.api_key, Some("0042".to_string()));
        assert_eq!(settings.api_kms_key, None);
    }

    #[test]
    fn env_var_names_match_datadog_conventions() {
        assert_eq!(FLUSH_METRICS_TO_LOGS_ENV_VAR, "FLUSH_METRICS_TO_LOGS");
        assert_eq!(SITE_URL_ENV_VAR, "DD_SITE");
        assert_eq!(API_KEY_ENV_VAR, "DD_API_KEY");
        assert_eq!(API_KEY_SECRET_ARN_ENV_VAR, "DD_API_KEY_SECRET_ARN");
        assert_eq!(KMS_API_KEY_ENV_VAR, "DD_KMS_API_KEY");
    }
}
