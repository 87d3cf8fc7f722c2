//! Type registry for config-driven rule set construction.
//!
//! The registry enables **generic config loading**: JSON/YAML config -> compiled
//! `RuleSet<Ctx, A>` without domain-specific compile code.
//!
//! # Architecture (axum `BoxedIntoRoute` pattern)
//!
//! Each registered type implements a construction trait. At registration time the
//! concrete type `T` is monomorphized into a closure and erased behind `Box<dyn Fn>`;
//! at load time the registry looks up the `type_url`, deserializes the config
//! payload as `T::Config`, and calls the closure.
//!
//! # Three Extension Seams
//!
//! | Seam | Trait | Registry Method | Produces |
//! |------|-------|-----------------|----------|
//! | Inputs | [`IntoDataInput`] | `builder.input::<T>(url)` | `Box<dyn DataInput<Ctx>>` |
//! | Sources | [`IntoCandidateSource`] | `builder.source::<T>(url)` | `Box<dyn CandidateSource<Ctx>>` |
//! | Transposers | [`IntoTransposer`] | `builder.transposer::<T>(url)` | `Arc<dyn Transposer>` |
//!
//! # Example
//!
//! ```ignore
//! let registry = register_core_transposers(RegistryBuilder::new())
//!     .input::<PathInput>("rewire.http.v1.Path")
//!     .source::<RequestParameters>("rewire.http.v1.RequestParameters")
//!     .build();
//!
//! let config: RuleSetConfig<String> = serde_yaml::from_str(yaml)?;
//! let rules = registry.load_rules(config)?;
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::{
    config::{ConditionConfig, ParameterConfig, RuleConfig, RuleSetConfig, TypedConfig},
    BundleTransposer, CandidateCondition, CandidateSource, Condition, ConfigError, DataInput,
    MapLookup, Parameters, Pattern, PatternCondition, Rule, RuleSet, Transposer,
    MAX_CONDITIONS_PER_COMPOUND, MAX_RULES,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// Trait for `DataInput` types that can be constructed from configuration.
///
/// `DataInput<Ctx>` describes *what* to extract. `IntoDataInput<Ctx>` describes *how* to
/// construct it from config. The registry composes both: look up the `type_url` ->
/// deserialize config -> construct input.
pub trait IntoDataInput<Ctx: 'static>: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a `DataInput` from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the config is semantically invalid
    /// (e.g., empty header name).
    fn from_config(config: Self::Config) -> Result<Box<dyn DataInput<Ctx>>, ConfigError>;
}

/// Trait for `CandidateSource` types that can be constructed from configuration.
pub trait IntoCandidateSource<Ctx: 'static>: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a `CandidateSource` from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the config is semantically invalid.
    fn from_config(config: Self::Config) -> Result<Box<dyn CandidateSource<Ctx>>, ConfigError>;
}

/// Trait for `Transposer` types that can be constructed from configuration.
///
/// Unlike [`IntoDataInput`], this is NOT generic over `Ctx`: transposers only see
/// parameter values.
///
/// # Example
///
/// ```ignore
/// impl IntoTransposer for Lowercase {
///     type Config = UnitConfig;
///     fn from_config(_: Self::Config) -> Result<Arc<dyn Transposer>, ConfigError> {
///         Ok(Arc::new(Lowercase))
///     }
/// }
/// ```
pub trait IntoTransposer: Send + Sync + 'static {
    /// The configuration type deserialized from JSON/YAML.
    type Config: DeserializeOwned + Send + Sync;

    /// Construct a `Transposer` from deserialized configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidConfig`] if the config is semantically invalid.
    fn from_config(config: Self::Config) -> Result<Arc<dyn Transposer>, ConfigError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Type-erased factories
// ═══════════════════════════════════════════════════════════════════════════════

type BoxedInputFactory<Ctx> =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn DataInput<Ctx>>, ConfigError> + Send + Sync>;

type BoxedSourceFactory<Ctx> = Box<
    dyn Fn(&serde_json::Value) -> Result<Box<dyn CandidateSource<Ctx>>, ConfigError> + Send + Sync,
>;

type BoxedTransposerFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Arc<dyn Transposer>, ConfigError> + Send + Sync>;

fn decode<T: DeserializeOwned>(value: &serde_json::Value) -> Result<T, ConfigError> {
    serde_json::from_value(value.clone()).map_err(|e| ConfigError::InvalidConfig {
        reason: e.to_string(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Register inputs, candidate sources and transposers with their type URLs, then
/// call [`build()`](Self::build) to produce an immutable `Registry`. No runtime
/// registration is possible after that.
pub struct RegistryBuilder<Ctx> {
    input_factories: HashMap<String, BoxedInputFactory<Ctx>>,
    source_factories: HashMap<String, BoxedSourceFactory<Ctx>>,
    transposer_factories: HashMap<String, BoxedTransposerFactory>,
    _phantom: PhantomData<Ctx>,
}

impl<Ctx: 'static> RegistryBuilder<Ctx> {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input_factories: HashMap::new(),
            source_factories: HashMap::new(),
            transposer_factories: HashMap::new(),
            _phantom: PhantomData,
        }
    }

    /// Register a `DataInput` type with a type URL.
    #[must_use]
    pub fn input<T: IntoDataInput<Ctx>>(mut self, type_url: &str) -> Self {
        self.input_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| T::from_config(decode(value)?)),
        );
        self
    }

    /// Register a `CandidateSource` type with a type URL.
    #[must_use]
    pub fn source<T: IntoCandidateSource<Ctx>>(mut self, type_url: &str) -> Self {
        self.source_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| T::from_config(decode(value)?)),
        );
        self
    }

    /// Register a `Transposer` type with a type URL.
    #[must_use]
    pub fn transposer<T: IntoTransposer>(mut self, type_url: &str) -> Self {
        self.transposer_factories.insert(
            type_url.to_owned(),
            Box::new(|value: &serde_json::Value| T::from_config(decode(value)?)),
        );
        self
    }

    /// Freeze the registry.
    #[must_use]
    pub fn build(self) -> Registry<Ctx> {
        Registry {
            input_factories: self.input_factories,
            source_factories: self.source_factories,
            transposer_factories: self.transposer_factories,
            _phantom: PhantomData,
        }
    }
}

impl<Ctx: 'static> Default for RegistryBuilder<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for [`BundleTransposer`].
///
/// ```yaml
/// type_url: rewire.core.v1.BundleTransposer
/// config:
///   selector: lang
///   bundles:
///     de: { bibliothek: library }
/// ```
#[derive(Debug, Clone, serde::Deserialize)]
pub struct BundleTransposerConfig {
    /// Parameter whose value selects the bundle.
    pub selector: String,
    /// Bundle name → key → value.
    #[serde(default)]
    pub bundles: MapLookup,
}

impl IntoTransposer for BundleTransposer {
    type Config = BundleTransposerConfig;

    fn from_config(config: Self::Config) -> Result<Arc<dyn Transposer>, ConfigError> {
        if config.selector.is_empty() {
            return Err(ConfigError::InvalidConfig {
                reason: "bundle transposer selector must not be empty".into(),
            });
        }
        Ok(Arc::new(BundleTransposer::new(
            Arc::new(config.bundles),
            config.selector,
        )))
    }
}

/// Register core built-in transposers (`BundleTransposer`).
///
/// Call this in domain `register()` functions; domain inputs and sources are
/// then added on top.
#[must_use]
pub fn register_core_transposers<Ctx: 'static>(
    builder: RegistryBuilder<Ctx>,
) -> RegistryBuilder<Ctx> {
    builder.transposer::<BundleTransposer>("rewire.core.v1.BundleTransposer")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable registry of input, source and transposer factories.
///
/// Constructed via [`RegistryBuilder`]. Use [`load_rules()`](Self::load_rules) to
/// compile config into a runtime `RuleSet`.
pub struct Registry<Ctx> {
    input_factories: HashMap<String, BoxedInputFactory<Ctx>>,
    source_factories: HashMap<String, BoxedSourceFactory<Ctx>>,
    transposer_factories: HashMap<String, BoxedTransposerFactory>,
    _phantom: PhantomData<Ctx>,
}

impl<Ctx: 'static> Registry<Ctx> {
    /// Load a `RuleSet` from configuration.
    ///
    /// Compiles every pattern, resolves every `type_url` through the registered
    /// factories, and validates the result against the safety limits.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownTypeUrl`] — input, source or transposer not registered
    /// - [`ConfigError::InvalidConfig`] — payload deserialization or construction failed
    /// - [`ConfigError::MalformedPattern`] — a pattern does not compile
    /// - [`ConfigError::TooManyRules`], [`ConfigError::TooManyConditions`],
    ///   [`ConfigError::DepthExceeded`] — limits exceeded
    pub fn load_rules<A: Clone>(
        &self,
        config: RuleSetConfig<A>,
    ) -> Result<RuleSet<Ctx, A>, ConfigError> {
        if config.rules.len() > MAX_RULES {
            return Err(ConfigError::TooManyRules {
                count: config.rules.len(),
                max: MAX_RULES,
            });
        }
        let rules = config
            .rules
            .into_iter()
            .map(|rule| self.load_rule(rule))
            .collect::<Result<Vec<_>, _>>()?;
        let rules = RuleSet::new(rules);
        rules.validate()?;
        tracing::debug!(rules = rules.len(), "rule set loaded");
        Ok(rules)
    }

    /// Load one `Rule` from configuration.
    ///
    /// # Errors
    ///
    /// As [`load_rules()`](Self::load_rules).
    pub fn load_rule<A>(&self, config: RuleConfig<A>) -> Result<Rule<Ctx, A>, ConfigError> {
        let condition = self.load_condition(config.condition)?;
        Ok(Rule::new(config.id, condition, config.action))
    }

    /// Load a `Condition` tree from configuration.
    ///
    /// # Errors
    ///
    /// As [`load_rules()`](Self::load_rules).
    pub fn load_condition(&self, config: ConditionConfig) -> Result<Condition<Ctx>, ConfigError> {
        match config {
            ConditionConfig::Pattern {
                input,
                pattern,
                mode,
                parameters,
            } => {
                let input = self.resolve_input(&input)?;
                let pattern = pattern.compile(false)?;
                let parameters = self.load_parameters(parameters, &[&pattern])?;
                Ok(Condition::Pattern(
                    PatternCondition::with_mode(input, pattern, mode).with_parameters(parameters),
                ))
            }
            ConditionConfig::Candidates {
                source,
                name,
                value,
                policy,
                value_mode,
                parameters,
            } => {
                let source = self.resolve_source(&source)?;
                let name = name.map(|p| p.compile(true)).transpose()?;
                let value = value.map(|p| p.compile(true)).transpose()?;
                let declared: Vec<&Pattern> = name.iter().chain(value.iter()).collect();
                let parameters = self.load_parameters(parameters, &declared)?;
                Ok(Condition::Candidates(
                    CandidateCondition::new(source, name, value, policy)
                        .with_value_mode(value_mode)
                        .with_parameters(parameters),
                ))
            }
            ConditionConfig::And { conditions } => Ok(Condition::And(self.load_children(conditions)?)),
            ConditionConfig::Or { conditions } => Ok(Condition::Or(self.load_children(conditions)?)),
            ConditionConfig::Not { condition } => {
                let inner = self.load_condition(*condition)?;
                Ok(Condition::Not(Box::new(inner)))
            }
        }
    }

    fn load_children(
        &self,
        conditions: Vec<ConditionConfig>,
    ) -> Result<Vec<Condition<Ctx>>, ConfigError> {
        if conditions.len() > MAX_CONDITIONS_PER_COMPOUND {
            return Err(ConfigError::TooManyConditions {
                count: conditions.len(),
                max: MAX_CONDITIONS_PER_COMPOUND,
            });
        }
        conditions
            .into_iter()
            .map(|c| self.load_condition(c))
            .collect()
    }

    fn load_parameters(
        &self,
        configs: Vec<ParameterConfig>,
        patterns: &[&Pattern],
    ) -> Result<Parameters, ConfigError> {
        let mut parameters = Parameters::new();
        for config in configs {
            if !patterns.iter().any(|p| p.has_placeholder(&config.name)) {
                return Err(ConfigError::InvalidConfig {
                    reason: format!(
                        "parameter \"{}\" is not a placeholder of {}",
                        config.name,
                        patterns
                            .iter()
                            .map(|p| format!("\"{}\"", p.source()))
                            .collect::<Vec<_>>()
                            .join(" or ")
                    ),
                });
            }
            let definition = parameters.parameter(&config.name);
            if let Some(regex) = &config.matches {
                definition
                    .matches(regex)
                    .map_err(|e| ConfigError::InvalidConfig {
                        reason: format!("parameter \"{}\": {e}", config.name),
                    })?;
            }
            if let Some(allowed) = config.one_of {
                definition.one_of(allowed);
            }
            for transposer in &config.transposers {
                definition.transposed_by_shared(self.resolve_transposer(transposer)?);
            }
        }
        Ok(parameters)
    }

    fn resolve_input(&self, config: &TypedConfig) -> Result<Box<dyn DataInput<Ctx>>, ConfigError> {
        let factory = self
            .input_factories
            .get(&config.type_url)
            .ok_or_else(|| ConfigError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                registry: "input",
                available: self.input_factories.keys().cloned().collect(),
            })?;
        factory(&config.config)
    }

    fn resolve_source(
        &self,
        config: &TypedConfig,
    ) -> Result<Box<dyn CandidateSource<Ctx>>, ConfigError> {
        let factory = self
            .source_factories
            .get(&config.type_url)
            .ok_or_else(|| ConfigError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                registry: "source",
                available: self.source_factories.keys().cloned().collect(),
            })?;
        factory(&config.config)
    }

    fn resolve_transposer(&self, config: &TypedConfig) -> Result<Arc<dyn Transposer>, ConfigError> {
        let factory = self
            .transposer_factories
            .get(&config.type_url)
            .ok_or_else(|| ConfigError::UnknownTypeUrl {
                type_url: config.type_url.clone(),
                registry: "transposer",
                available: self.transposer_factories.keys().cloned().collect(),
            })?;
        factory(&config.config)
    }

    /// Returns the number of registered input types.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_factories.len()
    }

    /// Returns the number of registered candidate source types.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.source_factories.len()
    }

    /// Returns the number of registered transposer types.
    #[must_use]
    pub fn transposer_count(&self) -> usize {
        self.transposer_factories.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_factories.is_empty()
            && self.source_factories.is_empty()
            && self.transposer_factories.is_empty()
    }

    /// Returns `true` if the given input type URL is registered.
    #[must_use]
    pub fn contains_input(&self, type_url: &str) -> bool {
        self.input_factories.contains_key(type_url)
    }

    /// Returns `true` if the given source type URL is registered.
    #[must_use]
    pub fn contains_source(&self, type_url: &str) -> bool {
        self.source_factories.contains_key(type_url)
    }

    /// Returns `true` if the given transposer type URL is registered.
    #[must_use]
    pub fn contains_transposer(&self, type_url: &str) -> bool {
        self.transposer_factories.contains_key(type_url)
    }

    /// Returns all registered input type URLs (sorted).
    #[must_use]
    pub fn input_type_urls(&self) -> Vec<&str> {
        sorted_keys(&self.input_factories)
    }

    /// Returns all registered source type URLs (sorted).
    #[must_use]
    pub fn source_type_urls(&self) -> Vec<&str> {
        sorted_keys(&self.source_factories)
    }

    /// Returns all registered transposer type URLs (sorted).
    #[must_use]
    pub fn transposer_type_urls(&self) -> Vec<&str> {
        sorted_keys(&self.transposer_factories)
    }
}

fn sorted_keys<V>(map: &HashMap<String, V>) -> Vec<&str> {
    let mut urls: Vec<&str> = map.keys().map(String::as_str).collect();
    urls.sort_unstable();
    urls
}
