//! Conditions — pattern matches that stage captures, composed with And/Or/Not
//!
//! A condition evaluates against a context and a request's [`ParameterStore`].
//! On success its captures stay staged; on failure it rolls the store back to
//! where it started, so a failed branch never leaves partial state behind.

use crate::{
    CandidateCondition, Captures, DataInput, MatchMode, ParameterDefinition, ParameterStore,
    Parameters, Pattern,
};
use std::fmt::Debug;

/// Matches one value extracted by a [`DataInput`] against a [`Pattern`].
///
/// # INV: None → false
///
/// If the input extracts nothing, the condition is `false` and nothing is staged.
///
/// # Example
///
/// ```
/// use rewire::{DataInput, ParameterStore, Pattern, PatternCondition};
///
/// #[derive(Debug)]
/// struct Path;
///
/// impl DataInput<String> for Path {
///     fn get(&self, ctx: &String) -> Option<String> {
///         Some(ctx.clone())
///     }
/// }
///
/// let mut condition = PatternCondition::new(Box::new(Path), Pattern::compile("/{lang}/{page}").unwrap());
/// condition.parameter("lang").one_of(["de", "en"]);
///
/// let mut store = ParameterStore::new();
/// assert!(!condition.evaluate(&"/fr/x".to_string(), &mut store));
/// assert!(condition.evaluate(&"/de/x".to_string(), &mut store));
/// assert_eq!(store.staged("lang"), Some(&["de".to_string()][..]));
/// ```
pub struct PatternCondition<Ctx> {
    input: Box<dyn DataInput<Ctx>>,
    pattern: Pattern,
    mode: MatchMode,
    parameters: Parameters,
}

impl<Ctx> PatternCondition<Ctx> {
    /// Match the whole extracted value.
    #[must_use]
    pub fn new(input: Box<dyn DataInput<Ctx>>, pattern: Pattern) -> Self {
        Self::with_mode(input, pattern, MatchMode::Full)
    }

    /// Match anywhere inside the extracted value.
    #[must_use]
    pub fn contains(input: Box<dyn DataInput<Ctx>>, pattern: Pattern) -> Self {
        Self::with_mode(input, pattern, MatchMode::Contains)
    }

    /// Match with an explicit [`MatchMode`].
    #[must_use]
    pub fn with_mode(input: Box<dyn DataInput<Ctx>>, pattern: Pattern, mode: MatchMode) -> Self {
        Self {
            input,
            pattern,
            mode,
            parameters: Parameters::new(),
        }
    }

    /// Replace the parameter definitions wholesale.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// The definition for `name`, registering it on first use.
    pub fn parameter(&mut self, name: &str) -> &mut ParameterDefinition {
        self.parameters.parameter(name)
    }

    /// Declared parameters.
    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// The match mode.
    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// The input this condition reads.
    #[must_use]
    pub fn input(&self) -> &dyn DataInput<Ctx> {
        &*self.input
    }

    /// Match and stage captures.
    pub fn evaluate(&self, ctx: &Ctx, store: &mut ParameterStore) -> bool {
        let Some(value) = self.input.get(ctx) else {
            return false;
        };
        match self.pattern.parse(&value, self.mode).into_captures() {
            Some(captures) => stage(&self.parameters, captures, store),
            None => false,
        }
    }
}

impl<Ctx> Debug for PatternCondition<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternCondition")
            .field("input", &self.input)
            .field("pattern", &self.pattern.source())
            .field("mode", &self.mode)
            .field("parameters", &self.parameters.len())
            .finish()
    }
}

/// Stage every capture; on the first refusal, undo what this call staged.
pub(crate) fn stage(parameters: &Parameters, captures: Captures, store: &mut ParameterStore) -> bool {
    let checkpoint = store.checkpoint();
    for (name, values) in captures {
        if !store.enqueue_submission(name.as_str(), parameters.get(name.as_str()), values) {
            store.rollback_to(checkpoint);
            return false;
        }
    }
    true
}

/// A condition tree.
///
/// # Variants
///
/// - `Pattern` — one extracted value against one pattern
/// - `Candidates` — name/value patterns over a candidate collection
/// - `And` — every child must succeed; staging accumulates across children
/// - `Or` — children are tried in order; the first success wins
/// - `Not` — inverts the child and never keeps anything it staged
///
/// Every variant rolls back its own staging when it evaluates to `false`, so an
/// `And` whose second clause fails leaves nothing from the first clause behind.
pub enum Condition<Ctx> {
    /// A single-input pattern condition.
    Pattern(PatternCondition<Ctx>),
    /// A candidate-collection condition.
    Candidates(CandidateCondition<Ctx>),
    /// All children must succeed (logical AND). Empty is `true`.
    And(Vec<Condition<Ctx>>),
    /// Any child must succeed (logical OR). Empty is `false`.
    Or(Vec<Condition<Ctx>>),
    /// Inverts the child (logical NOT).
    Not(Box<Condition<Ctx>>),
}

impl<Ctx> Condition<Ctx> {
    /// Evaluate against `ctx`, staging captures into `store`.
    ///
    /// Recursive; nesting is bounded by [`MAX_DEPTH`](crate::MAX_DEPTH) at
    /// load time.
    pub fn evaluate(&self, ctx: &Ctx, store: &mut ParameterStore) -> bool {
        let checkpoint = store.checkpoint();
        let matched = match self {
            Self::Pattern(c) => c.evaluate(ctx, store),
            Self::Candidates(c) => c.evaluate(ctx, store),
            Self::And(children) => children.iter().all(|c| c.evaluate(ctx, store)),
            Self::Or(children) => children.iter().any(|c| c.evaluate(ctx, store)),
            Self::Not(child) => {
                let inner = child.evaluate(ctx, store);
                store.rollback_to(checkpoint);
                !inner
            }
        };
        if !matched {
            store.rollback_to(checkpoint);
        }
        matched
    }

    /// Depth of this condition tree. Leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Pattern(_) | Self::Candidates(_) => 1,
            Self::And(cs) | Self::Or(cs) => 1 + cs.iter().map(Self::depth).max().unwrap_or(0),
            Self::Not(c) => 1 + c.depth(),
        }
    }

    /// Largest number of children of any `And`/`Or` in the tree.
    #[must_use]
    pub fn max_width(&self) -> usize {
        match self {
            Self::Pattern(_) | Self::Candidates(_) => 0,
            Self::And(cs) | Self::Or(cs) => cs
                .iter()
                .map(Self::max_width)
                .max()
                .unwrap_or(0)
                .max(cs.len()),
            Self::Not(c) => c.max_width(),
        }
    }

    /// Negate this condition.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

impl<Ctx> From<PatternCondition<Ctx>> for Condition<Ctx> {
    fn from(c: PatternCondition<Ctx>) -> Self {
        Self::Pattern(c)
    }
}

impl<Ctx> From<CandidateCondition<Ctx>> for Condition<Ctx> {
    fn from(c: CandidateCondition<Ctx>) -> Self {
        Self::Candidates(c)
    }
}

impl<Ctx> Debug for Condition<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern(c) => f.debug_tuple("Pattern").field(c).finish(),
            Self::Candidates(c) => f.debug_tuple("Candidates").field(c).finish(),
            Self::And(cs) => f.debug_tuple("And").field(&cs.len()).finish(),
            Self::Or(cs) => f.debug_tuple("Or").field(&cs.len()).finish(),
            Self::Not(_) => f.debug_tuple("Not").finish(),
        }
    }
}
