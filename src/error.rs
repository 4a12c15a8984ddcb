//! Error types for transport resolution and environment injection.

use figment::Error as FigmentError;

/// Errors from resolving or applying the metrics transport configuration.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// Failed to extract settings from the configured sources.
    #[error("configuration error: {0}")]
    Extract(#[source] Box<FigmentError>),

    /// The resolved site is an empty string.
    #[error("invalid site: must not be empty")]
    EmptySite,

    /// A secret-manager API key was paired with a Node function that submits
    /// metrics synchronously.
    #[error(
        "`api_key_secret_arn` is not supported for Node runtimes when using synchronous metrics \
         (function `{function}`); use either `api_key` or `api_kms_key`"
    )]
    SecretArnUnsupported {
        /// Name of the function that could not be instrumented.
        function: String,
    },
}

impl From<FigmentError> for ConfigurationError {
    fn from(error: FigmentError) -> Self {
        Self::Extract(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_arn_message_names_function_and_alternatives() {
        let err = ConfigurationError::SecretArnUnsupported {
            function: "hello-node".to_string(),
        };
        let message = err.to_string();

        assert!(message.contains("`api_key_secret_arn`"));
        assert!(message.contains("hello-node"));
        assert!(message.contains("`api_key`"));
        assert!(message.contains("`api_kms_key`"));
    }
}
