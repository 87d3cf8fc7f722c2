//! Candidate conditions — name/value patterns over a collection
//!
//! Headers and request parameters are collections of named, multi-valued
//! candidates. A [`CandidateCondition`] walks them in source order, matching a
//! name pattern and a value pattern, and stages the captures of the first
//! candidate that qualifies.

use crate::condition::stage;
use crate::{CandidateSource, Captures, MatchMode, ParameterDefinition, ParameterStore};
use crate::{Parameters, Pattern};
use std::fmt::Debug;

/// Which values of a candidate must match the value pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchPolicy {
    /// The first value that matches wins.
    #[default]
    FirstMatch,
    /// Every value under the name must match.
    MatchAll,
}

/// Matches a name pattern and a value pattern over a [`CandidateSource`].
///
/// Candidates are visited in source order and the first one that qualifies is
/// staged; later candidates are not looked at.
///
/// - [`FirstMatch`](MatchPolicy::FirstMatch): a candidate qualifies when its name
///   matches and at least one value matches. Captures are the name captures plus
///   the captures of that first matching value.
/// - [`MatchAll`](MatchPolicy::MatchAll): a candidate qualifies when its name
///   matches and every value matches. Captures are the name captures plus the
///   captures of all values, merged per placeholder in value order.
///
/// A missing name pattern (see [`value_exists`](Self::value_exists)) accepts
/// every name; a missing value pattern (see [`exists`](Self::exists)) accepts
/// every candidate whose name matches.
///
/// If staging refuses the captures, the condition fails without trying further
/// candidates.
pub struct CandidateCondition<Ctx> {
    source: Box<dyn CandidateSource<Ctx>>,
    name: Option<Pattern>,
    value: Option<Pattern>,
    policy: MatchPolicy,
    value_mode: MatchMode,
    parameters: Parameters,
}

impl<Ctx> CandidateCondition<Ctx> {
    /// A condition with explicit name/value patterns and policy.
    #[must_use]
    pub fn new(
        source: Box<dyn CandidateSource<Ctx>>,
        name: Option<Pattern>,
        value: Option<Pattern>,
        policy: MatchPolicy,
    ) -> Self {
        Self {
            source,
            name,
            value,
            policy,
            value_mode: MatchMode::Full,
            parameters: Parameters::new(),
        }
    }

    /// First candidate whose name matches and that has a matching value.
    #[must_use]
    pub fn matches(source: Box<dyn CandidateSource<Ctx>>, name: Pattern, value: Pattern) -> Self {
        Self::new(source, Some(name), Some(value), MatchPolicy::FirstMatch)
    }

    /// First candidate whose name matches and all of whose values match.
    #[must_use]
    pub fn matches_all(
        source: Box<dyn CandidateSource<Ctx>>,
        name: Pattern,
        value: Pattern,
    ) -> Self {
        Self::new(source, Some(name), Some(value), MatchPolicy::MatchAll)
    }

    /// First candidate whose name matches, whatever its values.
    #[must_use]
    pub fn exists(source: Box<dyn CandidateSource<Ctx>>, name: Pattern) -> Self {
        Self::new(source, Some(name), None, MatchPolicy::FirstMatch)
    }

    /// First candidate, under any name, that has a matching value.
    #[must_use]
    pub fn value_exists(source: Box<dyn CandidateSource<Ctx>>, value: Pattern) -> Self {
        Self::new(source, None, Some(value), MatchPolicy::FirstMatch)
    }

    /// Set how values are matched (names always match in full).
    #[must_use]
    pub fn with_value_mode(mut self, mode: MatchMode) -> Self {
        self.value_mode = mode;
        self
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

    /// The match policy.
    #[must_use]
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// The name pattern, if any.
    #[must_use]
    pub fn name_pattern(&self) -> Option<&Pattern> {
        self.name.as_ref()
    }

    /// The value pattern, if any.
    #[must_use]
    pub fn value_pattern(&self) -> Option<&Pattern> {
        self.value.as_ref()
    }

    /// Match and stage captures of the first qualifying candidate.
    pub fn evaluate(&self, ctx: &Ctx, store: &mut ParameterStore) -> bool {
        for candidate in self.source.candidates(ctx) {
            let mut captures = match &self.name {
                Some(pattern) => match pattern.parse(candidate.name, MatchMode::Full).into_captures() {
                    Some(captures) => captures,
                    None => continue,
                },
                None => Captures::new(),
            };
            let Some(value_captures) = self.match_values(&candidate.values) else {
                continue;
            };
            captures.merge(value_captures);
            return stage(&self.parameters, captures, store);
        }
        false
    }

    fn match_values(&self, values: &[&str]) -> Option<Captures> {
        let Some(pattern) = &self.value else {
            return Some(Captures::new());
        };
        match self.policy {
            MatchPolicy::FirstMatch => values
                .iter()
                .find_map(|v| pattern.parse(v, self.value_mode).into_captures()),
            MatchPolicy::MatchAll => pattern
                .parse_each(values.iter().copied(), self.value_mode)
                .into_captures(),
        }
    }
}

impl<Ctx> Debug for CandidateCondition<Ctx> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateCondition")
            .field("source", &self.source)
            .field("name", &self.name.as_ref().map(Pattern::source))
            .field("value", &self.value.as_ref().map(Pattern::source))
            .field("policy", &self.policy)
            .field("value_mode", &self.value_mode)
            .finish()
    }
}
