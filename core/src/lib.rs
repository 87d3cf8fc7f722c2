//! rewire - parameterized pattern matching and parameter binding for request rewriting
//!
//! A rule engine core: inbound requests are matched against conditions built from
//! parameterized string patterns, and named captures are staged into a request-scoped
//! parameter store, transposed, and committed for downstream actions.
//!
//! # Architecture
//!
//! - [`Pattern`] — Compiled literal + `{placeholder}` template (regex-backed)
//! - [`MatchResult`] / [`Captures`] — Ordered placeholder → value(s) produced by matching
//! - [`ParameterDefinition`] — Validators, transposers and binding target for one name
//! - [`ParameterStore`] — Request-scoped staging buffer with commit / rollback
//! - [`Transposer`] — Commit-time value rewriting through an external [`LookupSource`]
//! - [`Condition<Ctx>`] — Pattern conditions composed with And, Or, Not
//! - [`RuleSet<Ctx, A>`] — Ordered rules; drives commit on success and rollback on failure
//!
//! # Key Invariants
//!
//! 1. **All-or-nothing staging**: a condition that fails discards everything it staged,
//!    so a rule whose condition tree fails leaves no parameter state behind.
//!
//! 2. **`DataInput` None → false**: when an input extracts nothing, the condition
//!    evaluates to `false` without touching the store.
//!
//! 3. **Transposition never fails a rule**: a lookup miss passes the value through.
//!
//! # Example
//!
//! ```
//! use rewire::prelude::*;
//!
//! #[derive(Debug)]
//! struct Request { path: String }
//!
//! #[derive(Debug)]
//! struct PathInput;
//!
//! impl DataInput<Request> for PathInput {
//!     fn get(&self, ctx: &Request) -> Option<String> {
//!         Some(ctx.path.clone())
//!     }
//! }
//!
//! let condition = PatternCondition::new(
//!     Box::new(PathInput),
//!     Pattern::compile("/{lang}/{path}").unwrap(),
//! );
//! let rules: RuleSet<Request, &str> =
//!     RuleSet::new(vec![Rule::new("localized", condition, "forward")]);
//!
//! let outcome = rules
//!     .evaluate(&Request { path: "/de/bibliothek".into() })
//!     .unwrap();
//! assert_eq!(outcome.action, "forward");
//! assert_eq!(outcome.bindings.first("lang"), Some("de"));
//! assert_eq!(outcome.bindings.first("path"), Some("bibliothek"));
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod candidates;
mod condition;
mod data_input;
mod matching;
mod parameter;
mod pattern;
mod rule;
mod store;
mod transposer;

#[cfg(feature = "registry")]
mod config;
#[cfg(feature = "registry")]
mod registry;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use candidates::{CandidateCondition, MatchPolicy};
pub use condition::{Condition, PatternCondition};
pub use data_input::{Candidate, CandidateSource, DataInput};
pub use matching::{Captures, MatchMode, MatchResult};
pub use parameter::{
    Binding, BindingError, BindingOptions, OneOfValidator, ParameterDefinition, Parameters,
    RegexValidator, Slot, Validator,
};
pub use pattern::{Pattern, PatternBuilder, PlaceholderName, Segment, DEFAULT_PLACEHOLDER_CLASS};
pub use rule::{Outcome, Rule, RuleSet};
pub use store::{Bindings, Checkpoint, CommitError, ParameterStore, StagingError};
pub use transposer::{BundleTransposer, LookupSource, MapLookup, TransposeContext, Transposer};

// Registry (feature-gated)
#[cfg(feature = "registry")]
pub use config::{
    ConditionConfig, ParameterConfig, PatternConfig, RuleConfig, RuleSetConfig, TypedConfig,
    UnitConfig,
};
#[cfg(feature = "registry")]
pub use registry::{
    register_core_transposers, BundleTransposerConfig, IntoCandidateSource, IntoDataInput,
    IntoTransposer, Registry, RegistryBuilder,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use rewire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Store + bindings
        Binding,
        Bindings,
        BundleTransposer,
        // Seams
        Candidate,
        CandidateCondition,
        CandidateSource,
        Captures,
        // Conditions
        Condition,
        ConfigError,
        DataInput,
        LookupSource,
        MalformedPatternError,
        MapLookup,
        MatchMode,
        MatchPolicy,
        MatchResult,
        ParameterDefinition,
        ParameterStore,
        // Patterns
        Pattern,
        PatternCondition,
        PlaceholderName,
        // Rules
        Rule,
        RuleSet,
        Slot,
        StagingError,
        Transposer,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth for nested conditions.
///
/// Evaluation is recursive; validate at load time via [`RuleSet::validate`].
pub const MAX_DEPTH: usize = 32;

/// Maximum number of rules in a single [`RuleSet`].
pub const MAX_RULES: usize = 256;

/// Maximum number of children in a single `And` or `Or` condition.
pub const MAX_CONDITIONS_PER_COMPOUND: usize = 256;

/// Maximum length of a pattern string, including placeholder constraints.
pub const MAX_PATTERN_LENGTH: usize = 8192;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A pattern string could not be compiled.
///
/// Raised once, when the rule is defined. A rule whose pattern fails to compile
/// must not be installed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPatternError {
    /// A `{` was never closed.
    #[error("unterminated placeholder starting at byte {offset} in \"{pattern}\"")]
    Unterminated {
        /// The pattern source.
        pattern: String,
        /// Byte offset of the opening brace.
        offset: usize,
    },
    /// A `{` appeared inside a placeholder name.
    #[error("nested '{{' at byte {offset} in \"{pattern}\"")]
    NestedPlaceholder {
        /// The pattern source.
        pattern: String,
        /// Byte offset of the nested brace.
        offset: usize,
    },
    /// `{}` with no name.
    #[error("empty placeholder at byte {offset} in \"{pattern}\"")]
    EmptyPlaceholder {
        /// The pattern source.
        pattern: String,
        /// Byte offset of the opening brace.
        offset: usize,
    },
    /// The same placeholder name appears twice in one pattern.
    #[error("placeholder \"{name}\" appears more than once in \"{pattern}\"")]
    DuplicatePlaceholder {
        /// The pattern source.
        pattern: String,
        /// The repeated name.
        name: String,
    },
    /// A constraint was given for a name the pattern does not declare.
    #[error("constraint given for unknown placeholder \"{name}\" in \"{pattern}\"")]
    UnknownPlaceholder {
        /// The pattern source.
        pattern: String,
        /// The unknown name.
        name: String,
    },
    /// A placeholder constraint or default class is not a valid regex.
    #[error("invalid constraint for \"{name}\": {reason}")]
    InvalidConstraint {
        /// The placeholder the constraint applies to (`*` for the default class).
        name: String,
        /// The regex compiler's message.
        reason: String,
    },
    /// The literal text of a regex-flavored pattern is not a valid regex.
    #[error("invalid regex in \"{pattern}\": {reason}")]
    InvalidRegex {
        /// The pattern source.
        pattern: String,
        /// The regex compiler's message.
        reason: String,
    },
    /// The pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    TooLong {
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
}

/// Errors from rule construction and validation.
///
/// These are caught at config load time, never during per-request evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A pattern in the config failed to compile.
    #[error(transparent)]
    MalformedPattern(#[from] MalformedPatternError),
    /// Condition nesting exceeds [`MAX_DEPTH`].
    #[error(
        "condition nesting depth is {depth}, but maximum allowed is {max} \
         — reduce nesting or flatten the condition tree"
    )]
    DepthExceeded {
        /// Actual depth of the condition tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// Too many rules in a single rule set.
    #[error("rule set has {count} rules, but maximum allowed is {max}")]
    TooManyRules {
        /// Actual count of rules.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Too many children in a compound `And` or `Or`.
    #[error("compound condition has {count} children, but maximum allowed is {max}")]
    TooManyConditions {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// Configuration deserialization or construction failed.
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// The underlying error message.
        reason: String,
    },
    /// A type URL was not found in the registry.
    #[error("unknown {registry} type URL \"{type_url}\"{}", available_hint(.registry, .available))]
    UnknownTypeUrl {
        /// The unregistered type URL.
        type_url: String,
        /// Which registry was searched (`"input"`, `"source"` or `"transposer"`).
        registry: &'static str,
        /// Type URLs that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },
}

fn available_hint(registry: &str, available: &[String]) -> String {
    if available.is_empty() {
        format!(" — no {registry} types are registered")
    } else {
        let mut sorted = available.to_vec();
        sorted.sort_unstable();
        format!(" — registered: {}", sorted.join(", "))
    }
}
