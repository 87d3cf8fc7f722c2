//! Config types for rule set construction.
//!
//! These types mirror the runtime rule types but are serde-deserializable,
//! enabling config-driven construction via [`Registry::load_rules()`](crate::Registry::load_rules).
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Loader method |
//! |-------------|-------------|---------------|
//! | [`RuleSetConfig`] | [`RuleSet`](crate::RuleSet) | `Registry::load_rules()` |
//! | [`RuleConfig`] | [`Rule`](crate::Rule) | `Registry::load_rule()` |
//! | [`ConditionConfig`] | [`Condition`](crate::Condition) | `Registry::load_condition()` |
//! | [`PatternConfig`] | [`Pattern`](crate::Pattern) | [`PatternConfig::compile()`] |
//! | [`ParameterConfig`] | [`ParameterDefinition`](crate::ParameterDefinition) | via `load_condition()` |
//! | [`TypedConfig`] | `Box<dyn DataInput<Ctx>>`, `Box<dyn CandidateSource<Ctx>>`, `Arc<dyn Transposer>` | via registry factory |

use crate::{MalformedPatternError, MatchMode, MatchPolicy, Pattern};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Configuration for a [`RuleSet`](crate::RuleSet).
///
/// ```yaml
/// rules:
///   - id: localized
///     condition:
///       type: pattern
///       input: { type_url: rewire.http.v1.PathInput }
///       pattern: "/{lang}/{path}"
///     action: forward
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RuleSetConfig<A> {
    /// Rules in evaluation order.
    pub rules: Vec<RuleConfig<A>>,
}

/// Configuration for a [`Rule`](crate::Rule).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "A: Deserialize<'de>"))]
pub struct RuleConfig<A> {
    /// Identifier used in logs and outcomes.
    pub id: String,

    /// The condition tree.
    pub condition: ConditionConfig,

    /// The action returned when the rule fires.
    pub action: A,
}

/// Configuration for a [`Condition`](crate::Condition).
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "pattern", "input": { ... }, "pattern": "/{lang}/{path}" }
/// { "type": "candidates", "source": { ... }, "name": "lang", "value": "{code}" }
/// { "type": "and", "conditions": [...] }
/// { "type": "or", "conditions": [...] }
/// { "type": "not", "condition": { ... } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConditionConfig {
    /// One extracted value against one pattern.
    Pattern {
        /// The input to extract from the context, resolved via the registry.
        input: TypedConfig,
        /// The pattern; literal text is escaped unless `regex: true`.
        pattern: PatternConfig,
        /// Full or contains matching.
        #[serde(default)]
        mode: MatchMode,
        /// Parameter constraints and transposers.
        #[serde(default)]
        parameters: Vec<ParameterConfig>,
    },

    /// Name/value patterns over a candidate collection.
    Candidates {
        /// The candidate source, resolved via the registry.
        source: TypedConfig,
        /// Name pattern; absent accepts every name. Regex flavor by default.
        #[serde(default)]
        name: Option<PatternConfig>,
        /// Value pattern; absent accepts every value. Regex flavor by default.
        #[serde(default)]
        value: Option<PatternConfig>,
        /// First-match or match-all over the values of a name.
        #[serde(default)]
        policy: MatchPolicy,
        /// Full or contains matching for values.
        #[serde(default)]
        value_mode: MatchMode,
        /// Parameter constraints and transposers.
        #[serde(default)]
        parameters: Vec<ParameterConfig>,
    },

    /// All children must succeed (logical AND).
    And {
        /// Child conditions.
        conditions: Vec<ConditionConfig>,
    },

    /// Any child must succeed (logical OR).
    Or {
        /// Child conditions.
        conditions: Vec<ConditionConfig>,
    },

    /// Inverts the child (logical NOT).
    Not {
        /// The condition to negate.
        condition: Box<ConditionConfig>,
    },
}

/// Configuration for a [`Pattern`].
///
/// Either a bare pattern string or a detailed form with options:
///
/// ```yaml
/// pattern: "/{lang}/{path}"
/// ---
/// pattern:
///   pattern: "/{lang}/{id}"
///   constraints: { lang: "[a-z]{2}", id: "\\d+" }
///   ignore_case: true
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PatternConfig {
    /// A pattern string with default options.
    Source(String),
    /// A pattern string with options.
    Detailed {
        /// The pattern string.
        pattern: String,
        /// Per-placeholder character classes.
        #[serde(default)]
        constraints: BTreeMap<String, String>,
        /// Class for placeholders without a constraint.
        #[serde(default)]
        default_class: Option<String>,
        /// Case-insensitive matching.
        #[serde(default)]
        ignore_case: bool,
        /// Treat literal text as regex; overrides the condition's default.
        #[serde(default)]
        regex: Option<bool>,
    },
}

impl PatternConfig {
    /// The pattern string.
    #[must_use]
    pub fn source(&self) -> &str {
        match self {
            Self::Source(s) => s,
            Self::Detailed { pattern, .. } => pattern,
        }
    }

    /// Compile the pattern. `regex_default` picks the literal flavor when the
    /// config does not say.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn compile(&self, regex_default: bool) -> Result<Pattern, MalformedPatternError> {
        match self {
            Self::Source(source) => Pattern::builder(source)
                .regex_literals(regex_default)
                .build(),
            Self::Detailed {
                pattern,
                constraints,
                default_class,
                ignore_case,
                regex,
            } => {
                let mut builder = Pattern::builder(pattern)
                    .regex_literals(regex.unwrap_or(regex_default))
                    .ignore_case(*ignore_case);
                if let Some(class) = default_class {
                    builder = builder.default_class(class);
                }
                for (name, class) in constraints {
                    builder = builder.constrain(name, class);
                }
                builder.build()
            }
        }
    }
}

/// Configuration for a [`ParameterDefinition`](crate::ParameterDefinition).
#[derive(Debug, Clone, Deserialize)]
pub struct ParameterConfig {
    /// Parameter name (a placeholder of the condition's patterns).
    pub name: String,

    /// Every value must match this regex in full.
    #[serde(default)]
    pub matches: Option<String>,

    /// Every value must be one of these.
    #[serde(default)]
    pub one_of: Option<Vec<String>>,

    /// Transposers applied at commit time, in order.
    #[serde(default)]
    pub transposers: Vec<TypedConfig>,
}

/// Reference to a registered type with its configuration.
///
/// - `type_url` identifies the registered type
/// - `config` carries the type-specific configuration payload
#[derive(Debug, Clone, Deserialize)]
pub struct TypedConfig {
    /// The type URL identifying the registered type.
    /// Must match a `type_url` registered in the [`Registry`](crate::Registry).
    pub type_url: String,

    /// Type-specific configuration payload.
    /// Deserialized as the `Config` associated type of the registered factory.
    #[serde(default = "default_config")]
    pub config: serde_json::Value,
}

fn default_config() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Empty configuration for registered types that need no configuration.
///
/// Accepts any value (`{}`, `null`, etc.) and ignores it.
#[derive(Debug, Clone, Copy)]
pub struct UnitConfig;

impl<'de> Deserialize<'de> for UnitConfig {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(UnitConfig)
    }
}
