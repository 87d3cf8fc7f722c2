//! Conformance test fixture runner
//!
//! Loads YAML fixtures in the registry config format and runs them:
//! YAML → `RuleSetConfig<String>` → `Registry::load_rules()` → evaluate.
//!
//! ```yaml
//! name: localized path
//! config:
//!   rules:
//!     - id: localized
//!       condition:
//!         type: pattern
//!         input: { type_url: rewire.test.v1.StringInput, config: { key: path } }
//!         pattern: "/{lang}/{page}"
//!       action: forward
//! cases:
//!   - name: german
//!     context: { path: /de/bibliothek }
//!     expect: forward
//!     bindings: { lang: de, page: bibliothek }
//! ```

use crate::TestContext;
use rewire::{ConfigError, Registry, RegistryBuilder, RuleSetConfig};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// A complete test fixture.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: RuleSetConfig<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// The config must fail to load.
    #[serde(default)]
    pub expect_error: bool,
}

/// One multi-valued entry of the test context.
#[derive(Debug, Deserialize)]
pub struct EntryConfig {
    pub name: String,
    #[serde(default)]
    pub values: Vec<String>,
}

/// Test case.
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub context: HashMap<String, String>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
    /// Expected action, or `None` when no rule fires.
    pub expect: Option<String>,
    /// Expected first committed value per name. Names not listed are not checked.
    #[serde(default)]
    pub bindings: BTreeMap<String, String>,
    /// Names that must not be bound.
    #[serde(default)]
    pub unbound: Vec<String>,
}

impl TestCase {
    /// Build a `TestContext` from this case's context map and entries.
    pub fn build_context(&self) -> TestContext {
        let mut ctx = TestContext::new();
        for (k, v) in &self.context {
            ctx = ctx.with(k.clone(), v.clone());
        }
        for entry in &self.entries {
            ctx = ctx.with_entry(entry.name.clone(), entry.values.iter().cloned());
        }
        ctx
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case.
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Option<String>,
    pub actual: Option<String>,
    /// Human-readable mismatches in bindings.
    pub mismatches: Vec<String>,
}

fn registry() -> Registry<TestContext> {
    crate::register(RegistryBuilder::new()).build()
}

impl Fixture {
    /// Parse a fixture from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators.
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results.
    ///
    /// # Errors
    ///
    /// Returns the load error if the config does not load.
    pub fn run(&self) -> Result<Vec<CaseResult>, ConfigError> {
        let rules = registry().load_rules(self.config.clone())?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let ctx = case.build_context();
                let outcome = rules.evaluate(&ctx);
                let mut mismatches = Vec::new();
                if let Some(outcome) = &outcome {
                    for (name, expected) in &case.bindings {
                        let actual = outcome.bindings.first(name);
                        if actual != Some(expected.as_str()) {
                            mismatches.push(format!("{name}: expected {expected:?}, got {actual:?}"));
                        }
                    }
                    for name in &case.unbound {
                        if outcome.bindings.contains(name) {
                            mismatches.push(format!("{name}: expected unbound"));
                        }
                    }
                }
                let actual = outcome.map(|o| o.action);
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect && mismatches.is_empty(),
                    expected: case.expect.clone(),
                    actual,
                    mismatches,
                }
            })
            .collect())
    }

    /// Run all test cases and panic on first failure.
    pub fn run_and_assert(&self) {
        match self.run() {
            Err(err) => assert!(
                self.expect_error,
                "Fixture '{}' failed to load: {err}",
                self.name
            ),
            Ok(results) => {
                assert!(
                    !self.expect_error,
                    "Fixture '{}' loaded but was expected to fail",
                    self.name
                );
                for result in results {
                    assert!(
                        result.passed,
                        "Fixture '{}' case '{}' failed: expected {:?}, got {:?} {:?}",
                        self.name,
                        result.case_name,
                        result.expected,
                        result.actual,
                        result.mismatches
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_run_inline_fixture() {
        let yaml = r#"
name: inline
config:
  rules:
    - id: admin
      condition:
        type: pattern
        input: { type_url: rewire.test.v1.StringInput, config: { key: role } }
        pattern: "admin-{org}"
      action: allow
cases:
  - name: hit
    context: { role: admin-acme }
    expect: allow
    bindings: { org: acme }
  - name: miss
    context: { role: viewer }
    expect: null
"#;
        let fixture = Fixture::from_yaml(yaml).unwrap();
        let results = fixture.run().unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn binding_mismatch_fails_case() {
        let yaml = r#"
name: mismatch
config:
  rules:
    - id: r
      condition:
        type: pattern
        input: { type_url: rewire.test.v1.StringInput, config: { key: path } }
        pattern: "/{page}"
      action: ok
cases:
  - name: wrong binding
    context: { path: /home }
    expect: ok
    bindings: { page: away }
"#;
        let results = Fixture::from_yaml(yaml).unwrap().run().unwrap();
        assert!(!results[0].passed);
        assert_eq!(results[0].mismatches.len(), 1);
    }

    #[test]
    fn multi_document() {
        let yaml = "name: a\nconfig: { rules: [] }\n---\nname: b\nconfig: { rules: [] }\n";
        let fixtures = Fixture::from_yaml_multi(yaml).unwrap();
        assert_eq!(fixtures.len(), 2);
        assert_eq!(fixtures[1].name, "b");
    }
}
