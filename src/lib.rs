//! Datadog metrics transport configuration for serverless functions.
//!
//! Resolves partially specified transport settings (flush mode, site, API key
//! sources, extension version) into a single [`Transport`], then applies it as
//! environment variables to a set of function definitions, rejecting
//! combinations the runtime cannot support.
//!
//! # Example
//!
//! ```
//! use transport_configuration::{
//!     ConfigurationError, FunctionDefinition, RuntimeFamily, TransportBuilder,
//! };
//!
//! fn main() -> Result<(), ConfigurationError> {
//!     let transport = TransportBuilder::new()
//!         .extension_layer_version(49)
//!         .api_key_secret_arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:dd")
//!         .build()?;
//!
//!     let mut functions = vec![
//!         FunctionDefinition::new("hello-node", RuntimeFamily::Node),
//!         FunctionDefinition::from_runtime_name("hello-python", "python3.12"),
//!     ];
//!     transport.apply_to_functions(&mut functions)?;
//!
//!     assert_eq!(functions[0].env("FLUSH_METRICS_TO_LOGS"), Some("false"));
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod error;
mod function;
mod transport;

pub use builder::TransportBuilder;
pub use config::{
    API_KEY_ENV_VAR, API_KEY_SECRET_ARN_ENV_VAR, DEFAULT_FLUSH_METRICS_TO_LOGS, DEFAULT_SITE,
    FLUSH_METRICS_TO_LOGS_ENV_VAR, KMS_API_KEY_ENV_VAR, SITE_URL_ENV_VAR, TransportSettings,
};
pub use error::ConfigurationError;
pub use function::{FunctionDefinition, InstrumentedFunction, RuntimeFamily};
pub use transport::{EnvironmentVariables, Transport};

/// Re-exported for users who want to construct custom configuration providers.
pub use figment;
/// Re-exported for version compatibility with this crate's dependencies.
pub use tracing;
