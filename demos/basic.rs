//! Basic example: resolve defaults and instrument two functions.
//!
//! Run with: cargo run --example basic

use transport_configuration::{
    ConfigurationError, FunctionDefinition, RuntimeFamily, Transport, TransportSettings,
};

fn main() -> Result<(), ConfigurationError> {
    tracing_subscriber::fmt()
        .with_env_filter("transport_config=debug")
        .init();

    // No settings: metrics are flushed to logs and the site defaults to datadoghq.com.
    let transport = Transport::new(TransportSettings::default());

    let mut functions = vec![
        FunctionDefinition::new("hello-node", RuntimeFamily::Node),
        FunctionDefinition::from_runtime_name("hello-python", "python3.12"),
    ];
    transport.apply_to_functions(&mut functions)?;

    for function in &functions {
        println!("{function:?}");
    }

    Ok(())
}
