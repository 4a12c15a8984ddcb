//! Function handles that receive transport environment variables.

use std::collections::BTreeMap;

/// Runtime family of a serverless function.
///
/// The family is resolved once, when the handle is constructed, so that
/// transport resolution never has to inspect runtime identifier strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RuntimeFamily {
    /// Node.js runtimes (`nodejs*`).
    Node,
    /// Python runtimes (`python*`).
    Python,
    /// Go runtimes (`go*`).
    Go,
    /// Any other runtime, including custom `provided*` runtimes.
    #[default]
    Other,
}

impl RuntimeFamily {
    /// Classifies a Lambda runtime identifier such as `nodejs18.x` or `python3.12`.
    #[must_use]
    pub fn from_runtime_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        if name.starts_with("nodejs") {
            RuntimeFamily::Node
        } else if name.starts_with("python") {
            RuntimeFamily::Python
        } else if name.starts_with("go") {
            RuntimeFamily::Go
        } else {
            RuntimeFamily::Other
        }
    }

    /// Returns `true` for the Node.js family.
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self, RuntimeFamily::Node)
    }
}

/// A function definition that can be instrumented.
///
/// Implement this for the infrastructure framework's function type to let
/// [`Transport::apply_to_functions`](crate::Transport::apply_to_functions)
/// write environment variables onto it.
pub trait InstrumentedFunction {
    /// Name used in logs and errors.
    fn name(&self) -> &str;

    /// Runtime family of the function.
    fn runtime_family(&self) -> RuntimeFamily;

    /// Sets an environment variable, replacing any previous value for `key`.
    fn add_environment(&mut self, key: &str, value: &str);
}

/// In-memory function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDefinition {
    name: String,
    runtime: RuntimeFamily,
    environment: BTreeMap<String, String>,
}

impl FunctionDefinition {
    /// Creates a definition with an empty environment.
    pub fn new(name: impl Into<String>, runtime: RuntimeFamily) -> Self {
        Self {
            name: name.into(),
            runtime,
            environment: BTreeMap::new(),
        }
    }

    /// Creates a definition from a Lambda runtime identifier.
    pub fn from_runtime_name(name: impl Into<String>, runtime_name: &str) -> Self {
        Self::new(name, RuntimeFamily::from_runtime_name(runtime_name))
    }

    /// Adds a pre-existing environment variable.
    #[must_use]
    pub fn with_environment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Returns the environment variables set so far.
    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Returns the value of a single environment variable.
    pub fn env(&self, key: &str) -> Option<&str> {
        self.environment.get(key).map(String::as_str)
    }
}

impl InstrumentedFunction for FunctionDefinition {
    fn name(&self) -> &str {
        &self.name
    }

    fn runtime_family(&self) -> RuntimeFamily {
        self.runtime
    }

    fn add_environment(&mut self, key: &str, value: &str) {
        self.environment.insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_family_from_runtime_name() {
        assert_eq!(
            RuntimeFamily::from_runtime_name("nodejs18.x"),
            RuntimeFamily::Node
        );
        assert_eq!(
            RuntimeFamily::from_runtime_name("nodejs20.x"),
            RuntimeFamily::Node
        );
        assert_eq!(
            RuntimeFamily::from_runtime_name("python3.12"),
            RuntimeFamily::Python
        );
        assert_eq!(RuntimeFamily::from_runtime_name("go1.x"), RuntimeFamily::Go);
        assert_eq!(
            RuntimeFamily::from_runtime_name("provided.al2"),
            RuntimeFamily::Other
        );
        assert_eq!(
            RuntimeFamily::from_runtime_name("java21"),
            RuntimeFamily::Other
        );
    }

    #[test]
    fn runtime_name_classification_ignores_case() {
        assert_eq!(
            RuntimeFamily::from_runtime_name("NodeJS16.x"),
            RuntimeFamily::Node
        );
    }

    #[test]
    fn test_is_node() {
        assert!(RuntimeFamily::Node.is_node());
        assert!(!RuntimeFamily::Python.is_node());
        assert!(!RuntimeFamily::Go.is_node());
        assert!(!RuntimeFamily::Other.is_node());
    }

    #[test]
    fn add_environment_overwrites_existing_key() {
        let mut function = FunctionDefinition::new("hello", RuntimeFamily::Python)
            .with_environment("DD_SITE", "datadoghq.com");

        function.add_environment("DD_SITE", "datadoghq.eu");

        assert_eq!(function.env("DD_SITE"), Some("datadoghq.eu"));
        assert_eq!(function.environment().len(), 1);
    }

    #[test]
    fn add_environment_preserves_unrelated_keys() {
        let mut function = FunctionDefinition::from_runtime_name("hello-go", "go1.x")
            .with_environment("TABLE_NAME", "HelloWorld");

        function.add_environment("DD_API_KEY", "abc123");

        assert_eq!(function.runtime_family(), RuntimeFamily::Go);
        assert_eq!(function.env("TABLE_NAME"), Some("HelloWorld"));
        assert_eq!(function.env("DD_API_KEY"), Some("abc123"));
    }
}
