//! Parameter definitions — what may be bound under a name
//!
//! A condition owns a [`Parameters`] registry. `parameter(name)` returns the
//! definition for `name`, creating it on first use, and the chainable methods on
//! [`ParameterDefinition`] attach validators, transposers, and a [`Binding`].
//! Definitions are frozen once the condition is built and are consulted when
//! captures are staged and committed.

use crate::Transposer;
use regex::Regex;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

// ═══════════════════════════════════════════════════════════════════════════════
// Validators
// ═══════════════════════════════════════════════════════════════════════════════

/// Accepts or rejects one captured value.
pub trait Validator: Send + Sync + Debug {
    /// Returns `true` if `value` is acceptable.
    fn validate(&self, value: &str) -> bool;
}

/// Accepts values that match a regex in full.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    regex: Regex,
}

impl RegexValidator {
    /// Compile an anchored validator.
    ///
    /// # Errors
    ///
    /// Returns the regex compiler's error for an invalid expression.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&format!("^(?:{pattern})$"))?,
        })
    }
}

impl Validator for RegexValidator {
    fn validate(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Accepts values from a fixed list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOfValidator {
    allowed: Vec<String>,
}

impl OneOfValidator {
    /// Create a validator accepting exactly `allowed`.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for OneOfValidator {
    fn validate(&self, value: &str) -> bool {
        self.allowed.iter().any(|a| a == value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Bindings
// ═══════════════════════════════════════════════════════════════════════════════

/// A binding target failed to accept values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    /// The target refused the values.
    #[error("binding for \"{name}\" rejected {values:?}")]
    Rejected {
        /// Parameter name.
        name: String,
        /// The refused values.
        values: Vec<String>,
    },
    /// The target is unusable (e.g. its lock was poisoned).
    #[error("binding for \"{name}\" is unavailable: {reason}")]
    Unavailable {
        /// Parameter name.
        name: String,
        /// Why the target could not be written.
        reason: String,
    },
}

/// A capability that receives committed values for one parameter.
///
/// `validates` is consulted at staging time and again on transposed values at
/// commit time; `submit` is called once per successful commit (or later, for
/// deferred bindings).
pub trait Binding: Send + Sync + Debug {
    /// Whether the binding would accept `values`. Defaults to `true`.
    fn validates(&self, _values: &[String]) -> bool {
        true
    }

    /// Store the committed values.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] if the target refuses or cannot be written.
    fn submit(&self, values: &[String]) -> Result<(), BindingError>;
}

/// In-memory binding target shared with the code that consumes the value.
///
/// ```
/// use rewire::{Binding, Slot};
///
/// let slot = Slot::new("lang");
/// slot.submit(&["de".to_string()]).unwrap();
/// assert_eq!(slot.first().as_deref(), Some("de"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Slot {
    name: String,
    values: Arc<Mutex<Option<Vec<String>>>>,
}

impl Slot {
    /// Create an empty slot. `name` is used in error messages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Arc::default(),
        }
    }

    /// The last submitted values, if any.
    #[must_use]
    pub fn get(&self) -> Option<Vec<String>> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The first of the last submitted values.
    #[must_use]
    pub fn first(&self) -> Option<String> {
        self.get().and_then(|v| v.into_iter().next())
    }

    /// Returns `true` once something was submitted.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl Binding for Slot {
    fn submit(&self, values: &[String]) -> Result<(), BindingError> {
        let mut guard = self.values.lock().map_err(|e| BindingError::Unavailable {
            name: self.name.clone(),
            reason: e.to_string(),
        })?;
        *guard = Some(values.to_vec());
        Ok(())
    }
}

/// How a binding is submitted at commit time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingOptions {
    /// Queue the submission until [`ParameterStore::flush_deferred`](crate::ParameterStore::flush_deferred).
    pub deferred: bool,
    /// Skip the submission when the request is a postback.
    pub ignore_postback: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Definitions
// ═══════════════════════════════════════════════════════════════════════════════

/// Validators, transposers and binding target for one parameter name.
///
/// ```
/// use rewire::{Parameters, Slot};
///
/// let mut params = Parameters::new();
/// params
///     .parameter("lang")
///     .matches("[a-z]{2}")
///     .unwrap()
///     .bind_to(Slot::new("lang"));
///
/// let lang = params.get("lang").unwrap();
/// assert!(lang.validates(&["de".to_string()]));
/// assert!(!lang.validates(&["deu".to_string()]));
/// ```
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    name: String,
    validators: Vec<Arc<dyn Validator>>,
    transposers: Vec<Arc<dyn Transposer>>,
    binding: Option<Arc<dyn Binding>>,
    options: BindingOptions,
}

impl ParameterDefinition {
    /// A definition with no constraints.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validators: Vec::new(),
            transposers: Vec::new(),
            binding: None,
            options: BindingOptions::default(),
        }
    }

    /// Require every value to match `regex` in full.
    ///
    /// # Errors
    ///
    /// Returns the regex compiler's error for an invalid expression.
    pub fn matches(&mut self, regex: &str) -> Result<&mut Self, regex::Error> {
        let validator = RegexValidator::new(regex)?;
        Ok(self.constrained_by(validator))
    }

    /// Require every value to be one of `allowed`.
    pub fn one_of<I, S>(&mut self, allowed: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constrained_by(OneOfValidator::new(allowed))
    }

    /// Add a custom validator.
    pub fn constrained_by(&mut self, validator: impl Validator + 'static) -> &mut Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Append a transposer; transposers run in the order they were added.
    pub fn transposed_by(&mut self, transposer: impl Transposer + 'static) -> &mut Self {
        self.transposers.push(Arc::new(transposer));
        self
    }

    /// Append an already shared transposer.
    pub fn transposed_by_shared(&mut self, transposer: Arc<dyn Transposer>) -> &mut Self {
        self.transposers.push(transposer);
        self
    }

    /// Set the binding target, replacing any previous one.
    pub fn bind_to(&mut self, binding: impl Binding + 'static) -> &mut Self {
        self.binding = Some(Arc::new(binding));
        self
    }

    /// Queue the binding's submission until the deferred queue is flushed.
    pub fn deferred(&mut self) -> &mut Self {
        self.options.deferred = true;
        self
    }

    /// Skip the binding's submission on postback requests.
    pub fn ignore_postback(&mut self) -> &mut Self {
        self.options.ignore_postback = true;
        self
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Transposers in application order.
    #[must_use]
    pub fn transposers(&self) -> &[Arc<dyn Transposer>] {
        &self.transposers
    }

    /// The binding target, if any.
    #[must_use]
    pub fn binding(&self) -> Option<&Arc<dyn Binding>> {
        self.binding.as_ref()
    }

    /// Submission options.
    #[must_use]
    pub fn options(&self) -> BindingOptions {
        self.options
    }

    /// Run every validator on every value, then the binding's own check.
    #[must_use]
    pub fn validates(&self, values: &[String]) -> bool {
        values
            .iter()
            .all(|v| self.validators.iter().all(|validator| validator.validate(v)))
            && self.binding_validates(values)
    }

    pub(crate) fn binding_validates(&self, values: &[String]) -> bool {
        self.binding.as_ref().map_or(true, |b| b.validates(values))
    }
}

/// The parameter definitions declared by one condition.
///
/// Definitions are shared by `Arc` with the staged entries that reference them.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    defs: Vec<Arc<ParameterDefinition>>,
}

impl Parameters {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The definition for `name`, registering it on first use.
    ///
    /// Repeated calls return the same definition, so constraints accumulate.
    pub fn parameter(&mut self, name: &str) -> &mut ParameterDefinition {
        let index = match self.defs.iter().position(|d| d.name == name) {
            Some(index) => index,
            None => {
                self.defs.push(Arc::new(ParameterDefinition::new(name)));
                self.defs.len() - 1
            }
        };
        Arc::make_mut(&mut self.defs[index])
    }

    /// The definition for `name`, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ParameterDefinition>> {
        self.defs.iter().find(|d| d.name == name)
    }

    /// Definitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParameterDefinition>> {
        self.defs.iter()
    }

    /// Number of declared parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}
