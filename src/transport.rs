//! Resolved metrics transport and environment variable injection.

use crate::ConfigurationError;
use crate::config::{
    API_KEY_ENV_VAR, API_KEY_SECRET_ARN_ENV_VAR, DEFAULT_FLUSH_METRICS_TO_LOGS, DEFAULT_SITE,
    FLUSH_METRICS_TO_LOGS_ENV_VAR, KMS_API_KEY_ENV_VAR, SITE_URL_ENV_VAR, TransportSettings,
};
use crate::function::{InstrumentedFunction, RuntimeFamily};
use std::collections::BTreeMap;

/// Environment variables computed for a single function.
pub type EnvironmentVariables = BTreeMap<&'static str, String>;

/// Fully resolved metrics transport configuration.
///
/// Defaults are applied once, in [`Transport::new`]. The resolved values never
/// change afterwards; credential combinations are validated per function when
/// the configuration is applied, because the outcome depends on the runtime.
///
/// # Example
///
/// ```
/// use transport_configuration::{FunctionDefinition, RuntimeFamily, Transport, TransportSettings};
///
/// let transport = Transport::new(TransportSettings {
///     flush_metrics_to_logs: Some(false),
///     api_key: Some("my-api-key".to_string()),
///     ..Default::default()
/// });
///
/// let mut functions = vec![FunctionDefinition::new("hello-python", RuntimeFamily::Python)];
/// transport.apply_to_functions(&mut functions)?;
///
/// assert_eq!(functions[0].env("DD_SITE"), Some("datadoghq.com"));
/// # Ok::<(), transport_configuration::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    flush_metrics_to_logs: bool,
    site: String,
    api_key: Option<String>,
    api_key_secret_arn: Option<String>,
    api_kms_key: Option<String>,
    extension_layer_version: Option<u32>,
}

impl Transport {
    /// Resolves raw settings, applying defaults.
    pub fn new(settings: TransportSettings) -> Self {
        let mut flush_metrics_to_logs = match settings.flush_metrics_to_logs {
            Some(flush) => flush,
            None => {
                tracing::debug!(
                    target: "transport_config",
                    default = DEFAULT_FLUSH_METRICS_TO_LOGS,
                    "No value provided for flush_metrics_to_logs, using default"
                );
                DEFAULT_FLUSH_METRICS_TO_LOGS
            }
        };

        // The extension submits metrics itself, so nothing is buffered in logs.
        if let Some(version) = settings.extension_layer_version {
            tracing::debug!(
                target: "transport_config",
                extension_layer_version = version,
                "Metrics will be submitted via the extension"
            );
            flush_metrics_to_logs = false;
        }

        let site = settings.site.unwrap_or_else(|| {
            tracing::debug!(
                target: "transport_config",
                default = DEFAULT_SITE,
                "No value provided for site, using default"
            );
            DEFAULT_SITE.to_string()
        });

        Self {
            flush_metrics_to_logs,
            site,
            api_key: settings.api_key,
            api_key_secret_arn: settings.api_key_secret_arn,
            api_kms_key: settings.api_kms_key,
            extension_layer_version: settings.extension_layer_version,
        }
    }

    /// Whether metrics are written to logs rather than submitted directly.
    #[must_use]
    pub fn flush_metrics_to_logs(&self) -> bool {
        self.flush_metrics_to_logs
    }

    /// The resolved Datadog site.
    pub fn site(&self) -> &str {
        &self.site
    }

    /// Plaintext API key, if configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Secrets Manager ARN of the API key, if configured.
    pub fn api_key_secret_arn(&self) -> Option<&str> {
        self.api_key_secret_arn.as_deref()
    }

    /// KMS-encrypted API key, if configured.
    pub fn api_kms_key(&self) -> Option<&str> {
        self.api_kms_key.as_deref()
    }

    /// Extension layer version, if configured.
    pub fn extension_layer_version(&self) -> Option<u32> {
        self.extension_layer_version
    }

    /// Returns `true` when metrics are submitted in-process over the network:
    /// no extension is attached and flushing to logs is disabled.
    #[must_use]
    pub fn sends_synchronous_metrics(&self) -> bool {
        self.extension_layer_version.is_none() && !self.flush_metrics_to_logs
    }

    /// Computes the environment variables for one function without applying them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::SecretArnUnsupported`] when an API key
    /// secret ARN is configured, the runtime is Node, and metrics are sent
    /// synchronously.
    pub fn environment_for(
        &self,
        function_name: &str,
        runtime: RuntimeFamily,
    ) -> Result<EnvironmentVariables, ConfigurationError> {
        let mut env = EnvironmentVariables::new();

        env.insert(
            FLUSH_METRICS_TO_LOGS_ENV_VAR,
            self.flush_metrics_to_logs.to_string(),
        );
        if !self.flush_metrics_to_logs {
            env.insert(SITE_URL_ENV_VAR, self.site.clone());
        }
        if let Some(api_key) = &self.api_key {
            env.insert(API_KEY_ENV_VAR, api_key.clone());
        }
        if let Some(arn) = &self.api_key_secret_arn {
            if runtime.is_node() && self.sends_synchronous_metrics() {
                tracing::error!(
                    target: "transport_config",
                    function = function_name,
                    "api_key_secret_arn is not supported for Node runtimes with synchronous metrics"
                );
                return Err(ConfigurationError::SecretArnUnsupported {
                    function: function_name.to_string(),
                });
            }
            env.insert(API_KEY_SECRET_ARN_ENV_VAR, arn.clone());
        }
        if let Some(kms_key) = &self.api_kms_key {
            env.insert(KMS_API_KEY_ENV_VAR, kms_key.clone());
        }

        Ok(env)
    }

    /// Applies the transport environment variables to each function in order.
    ///
    /// Processing stops at the first function that cannot be instrumented.
    /// Functions before it keep the variables already applied; the failing
    /// function and those after it are left untouched. Each function's
    /// variables are computed before any are written, so unlike the Datadog
    /// CDK construct, the failing function never receives the flush, site or
    /// plaintext key variables that precede the secret ARN check.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by [`Transport::environment_for`].
    pub fn apply_to_functions<'a, I, F>(&self, functions: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a mut F>,
        F: InstrumentedFunction + ?Sized + 'a,
    {
        tracing::debug!(target: "transport_config", "Setting Datadog transport environment variables");

        for function in functions {
            let env = self.environment_for(function.name(), function.runtime_family())?;
            for (key, value) in &env {
                function.add_environment(key, value);
            }
            tracing::debug!(
                target: "transport_config",
                function = function.name(),
                variables = env.len(),
                "Applied transport environment"
            );
        }

        Ok(())
    }
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(TransportSettings::default())
    }
}

impl From<TransportSettings> for Transport {
    fn from(settings: TransportSettings) -> Self {
        Self::new(settings)
    }
}
