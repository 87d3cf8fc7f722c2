//! rewire-test: Test domain for conformance testing
//!
//! Provides a simple context plus an input and a candidate source for
//! exercising rules without an HTTP layer.
//!
//! # Example
//!
//! ```
//! use rewire_test::prelude::*;
//!
//! // TestContext is a key-value map plus ordered multi-valued entries
//! let ctx = TestContext::new()
//!     .with("path", "/de/bibliothek")
//!     .with_entry("tags", ["a", "b"]);
//!
//! // StringInput extracts a value by key
//! let input = StringInput::new("path");
//! assert_eq!(input.get(&ctx), Some("/de/bibliothek".into()));
//!
//! // EntriesSource yields the entries as candidates
//! let candidates = EntriesSource.candidates(&ctx);
//! assert_eq!(candidates[0].values, vec!["a", "b"]);
//! ```

use rewire::prelude::*;
use std::collections::HashMap;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Test context: single values by key, and ordered multi-valued entries.
#[derive(Debug, Clone, Default)]
pub struct TestContext {
    values: HashMap<String, String>,
    entries: Vec<(String, Vec<String>)>,
}

impl TestContext {
    /// Create an empty test context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key-value pair (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Append a multi-valued entry (builder pattern).
    #[must_use]
    pub fn with_entry<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Get a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Multi-valued entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[(String, Vec<String>)] {
        &self.entries
    }
}

/// Extracts a string value from `TestContext` by key.
#[derive(Debug, Clone)]
pub struct StringInput {
    key: String,
}

impl StringInput {
    /// Create a new string input extractor.
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl DataInput<TestContext> for StringInput {
    fn get(&self, ctx: &TestContext) -> Option<String> {
        ctx.get(&self.key).map(str::to_string)
    }
}

/// Yields the multi-valued entries of a `TestContext` as candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntriesSource;

impl CandidateSource<TestContext> for EntriesSource {
    fn candidates<'c>(&self, ctx: &'c TestContext) -> Vec<Candidate<'c>> {
        ctx.entries()
            .iter()
            .map(|(name, values)| Candidate::new(name, values.iter().map(String::as_str).collect()))
            .collect()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{EntriesSource, StringInput, TestContext};
    pub use rewire::prelude::*;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

/// Configuration for [`StringInput`].
#[cfg(feature = "registry")]
#[derive(Debug, Clone, serde::Deserialize)]
pub struct StringInputConfig {
    /// The key to extract from the test context.
    pub key: String,
}

#[cfg(feature = "registry")]
impl rewire::IntoDataInput<TestContext> for StringInput {
    type Config = StringInputConfig;

    fn from_config(
        config: Self::Config,
    ) -> Result<Box<dyn rewire::DataInput<TestContext>>, rewire::ConfigError> {
        Ok(Box::new(StringInput::new(config.key)))
    }
}

#[cfg(feature = "registry")]
impl rewire::IntoCandidateSource<TestContext> for EntriesSource {
    type Config = rewire::UnitConfig;

    fn from_config(
        _: Self::Config,
    ) -> Result<Box<dyn rewire::CandidateSource<TestContext>>, rewire::ConfigError> {
        Ok(Box::new(EntriesSource))
    }
}

/// Register all rewire-test types with the given builder.
///
/// Registers the core transposers and test-domain types:
/// - `rewire.test.v1.StringInput` → [`StringInput`]
/// - `rewire.test.v1.EntriesSource` → [`EntriesSource`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(
    builder: rewire::RegistryBuilder<TestContext>,
) -> rewire::RegistryBuilder<TestContext> {
    rewire::register_core_transposers(builder)
        .input::<StringInput>("rewire.test.v1.StringInput")
        .source::<EntriesSource>("rewire.test.v1.EntriesSource")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = TestContext::new().with("foo", "bar").with("baz", "qux");

        assert_eq!(ctx.get("foo"), Some("bar"));
        assert_eq!(ctx.get("baz"), Some("qux"));
        assert_eq!(ctx.get("missing"), None);
    }

    #[test]
    fn test_string_input_missing_key() {
        let ctx = TestContext::new();
        assert_eq!(StringInput::new("missing").get(&ctx), None);
    }

    #[test]
    fn test_entries_keep_order() {
        let ctx = TestContext::new()
            .with_entry("b", ["1"])
            .with_entry("a", ["2", "3"]);
        let names: Vec<&str> = EntriesSource
            .candidates(&ctx)
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_full_rule() {
        let ctx = TestContext::new().with("path", "/de/bibliothek");

        let condition = PatternCondition::new(
            Box::new(StringInput::new("path")),
            Pattern::compile("/{lang}/{page}").unwrap(),
        );
        let rules: RuleSet<TestContext, &str> =
            RuleSet::new(vec![Rule::new("localized", condition, "forward")]);

        let outcome = rules.evaluate(&ctx).unwrap();
        assert_eq!(outcome.action, "forward");
        assert_eq!(outcome.bindings.first("page"), Some("bibliothek"));
    }
}

#[cfg(all(test, feature = "registry"))]
mod registry_tests {
    use super::*;
    use rewire::RuleSetConfig;

    #[test]
    fn register_builds() {
        let registry = register(rewire::RegistryBuilder::new()).build();
        assert!(registry.contains_input("rewire.test.v1.StringInput"));
        assert!(registry.contains_source("rewire.test.v1.EntriesSource"));
        assert!(registry.contains_transposer("rewire.core.v1.BundleTransposer"));
    }

    #[test]
    fn load_rules_with_string_input() {
        let registry = register(rewire::RegistryBuilder::new()).build();
        let json = serde_json::json!({
            "rules": [{
                "id": "admin",
                "condition": {
                    "type": "pattern",
                    "input": {
                        "type_url": "rewire.test.v1.StringInput",
                        "config": { "key": "role" }
                    },
                    "pattern": "admin-{org}"
                },
                "action": "allow"
            }]
        });
        let config: RuleSetConfig<String> = serde_json::from_value(json).unwrap();
        let rules = registry.load_rules(config).unwrap();

        let ctx = TestContext::new().with("role", "admin-acme");
        let outcome = rules.evaluate(&ctx).unwrap();
        assert_eq!(outcome.action, "allow");
        assert_eq!(outcome.bindings.first("org"), Some("acme"));

        let ctx = TestContext::new().with("role", "viewer");
        assert!(rules.evaluate(&ctx).is_none());
    }
}
