//! Example demonstrating layered configuration.
//!
//! This shows how settings are merged from multiple sources with clear
//! precedence: defaults → files → environment variables → programmatic.
//!
//! Run with: DD_SITE=datadoghq.eu cargo run --example configuration_layers

use tracing_subscriber::EnvFilter;
use transport_configuration::{ConfigurationError, FunctionDefinition, TransportBuilder};

fn main() -> Result<(), ConfigurationError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let builder = TransportBuilder::new()
        // Optional settings file
        .with_file("datadog.toml")
        // Standard DD_* environment variables
        .with_standard_env()
        // Programmatic overrides take precedence over files and env vars
        .extension_layer_version(49)
        .api_key_secret_arn("arn:aws:secretsmanager:us-east-1:123456789012:secret:dd-api-key");

    // Extract settings for inspection (useful for debugging)
    let settings = builder.extract_settings()?;
    println!("Site: {:?}", settings.site);
    println!("Flush metrics to logs: {:?}", settings.flush_metrics_to_logs);
    println!("Extension layer version: {:?}", settings.extension_layer_version);

    let transport = builder.build()?;

    // The extension submits metrics, so the Node function may use the secret ARN.
    let mut functions = vec![
        FunctionDefinition::from_runtime_name("cdk-hello-node", "nodejs18.x"),
        FunctionDefinition::from_runtime_name("cdk-hello-python", "python3.12"),
        FunctionDefinition::from_runtime_name("cdk-hello-go", "provided.al2")
            .with_environment("LOG_LEVEL", "INFO")
            .with_environment("TABLE_NAME", "HelloWorld"),
    ];
    transport.apply_to_functions(&mut functions)?;

    for function in &functions {
        println!("{function:?}");
    }

    Ok(())
}
