use crate::project::EnvironmentDomain;

/// Name of the environment that conversion writes variable values into.
pub const DEFAULT_ENVIRONMENT: &str = "Default";

/// Binds template identifiers against a document-scoped environment domain.
/// One binder exists per document under conversion.
pub struct EnvironmentBinder<'a> {
    domain: &'a mut EnvironmentDomain,
}

impl<'a> EnvironmentBinder<'a> {
    pub fn new(domain: &'a mut EnvironmentDomain) -> Self {
        Self { domain }
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.domain.has_variable(name)
    }

    /// Create the variable on first reference.
    pub fn ensure_variable(&mut self, name: &str) {
        self.domain.ensure_variable(name);
    }

    /// Set the variable's current value in the default environment,
    /// creating the variable if needed. With `only_if_empty`, an existing
    /// non-empty value is left alone.
    pub fn set_value(&mut self, name: &str, value: &str, only_if_empty: bool) {
        self.domain.ensure_variable(name);
        let environment = self.domain.environment_mut(DEFAULT_ENVIRONMENT);
        let current = environment.values.get(name);
        if !only_if_empty || current.is_none_or(|v| v.is_empty()) {
            environment
                .values
                .insert(name.to_string(), value.to_string());
        }
    }

    /// The variable's current value in the default environment.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.domain
            .environment(DEFAULT_ENVIRONMENT)
            .and_then(|e| e.values.get(name))
            .map(String::as_str)
    }
}
