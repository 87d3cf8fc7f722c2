//! Pattern matching — evaluates a compiled [`Pattern`] against candidate strings.
//!
//! Matching is pure: a [`MatchResult`] is computed from the pattern and the
//! candidate alone and carries the placeholder captures in declaration order.

use crate::{Pattern, PlaceholderName};

/// How much of the candidate a pattern must cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchMode {
    /// The pattern must match the entire candidate.
    #[default]
    Full,
    /// The pattern may match anywhere inside the candidate. Every
    /// non-overlapping occurrence contributes captures.
    Contains,
}

/// Ordered mapping of placeholder name → one or more captured values.
///
/// Names keep the order in which they were first recorded; values under a name
/// keep the order in which they were captured.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Captures {
    entries: Vec<(PlaceholderName, Vec<String>)>,
}

impl Captures {
    /// Create an empty capture set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value under `name`, creating the entry if needed.
    pub fn push(&mut self, name: &PlaceholderName, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name.clone(), vec![value])),
        }
    }

    /// Append every entry of `other`, preserving its order.
    pub fn merge(&mut self, other: Captures) {
        for (name, values) in other.entries {
            match self.entries.iter_mut().find(|(n, _)| *n == name) {
                Some((_, existing)) => existing.extend(values),
                None => self.entries.push((name, values)),
            }
        }
    }

    /// All values captured for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_slice())
    }

    /// The first value captured for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Iterate entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&PlaceholderName, &[String])> {
        self.entries.iter().map(|(n, v)| (n, v.as_slice()))
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Captures {
    type Item = (PlaceholderName, Vec<String>);
    type IntoIter = std::vec::IntoIter<(PlaceholderName, Vec<String>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Outcome of matching one pattern against one or more candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    matched: bool,
    captures: Captures,
}

impl MatchResult {
    /// A successful match with the given captures.
    #[must_use]
    pub fn hit(captures: Captures) -> Self {
        Self {
            matched: true,
            captures,
        }
    }

    /// A failed match.
    #[must_use]
    pub fn miss() -> Self {
        Self {
            matched: false,
            captures: Captures::new(),
        }
    }

    /// Whether the pattern matched.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.matched
    }

    /// Captured values (empty on a miss).
    #[must_use]
    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    /// Consume the result, returning captures if it matched.
    #[must_use]
    pub fn into_captures(self) -> Option<Captures> {
        self.matched.then_some(self.captures)
    }
}

impl Pattern {
    /// Check whether the candidate matches, without extracting captures.
    #[must_use]
    pub fn is_match(&self, candidate: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Full => self.full_regex().is_match(candidate),
            MatchMode::Contains => self.partial_regex().is_match(candidate),
        }
    }

    /// Match the candidate and extract captures.
    ///
    /// In [`MatchMode::Contains`], every non-overlapping occurrence is captured, so a
    /// placeholder that matches repeatedly records all its values in order.
    #[must_use]
    pub fn parse(&self, candidate: &str, mode: MatchMode) -> MatchResult {
        let mut captures = Captures::new();
        match mode {
            MatchMode::Full => {
                let Some(caps) = self.full_regex().captures(candidate) else {
                    return MatchResult::miss();
                };
                for (name, group) in self.groups() {
                    captures.push(name, caps.name(group).map_or("", |m| m.as_str()));
                }
            }
            MatchMode::Contains => {
                if self.names().is_empty() {
                    return if self.partial_regex().is_match(candidate) {
                        MatchResult::hit(captures)
                    } else {
                        MatchResult::miss()
                    };
                }
                let mut found = false;
                for caps in self.partial_regex().captures_iter(candidate) {
                    found = true;
                    for (name, group) in self.groups() {
                        captures.push(name, caps.name(group).map_or("", |m| m.as_str()));
                    }
                }
                if !found {
                    return MatchResult::miss();
                }
            }
        }
        MatchResult::hit(captures)
    }

    /// Match every candidate; succeed only if all of them match.
    ///
    /// Captures from each candidate are merged per name in candidate order. An
    /// empty candidate list matches vacuously with no captures.
    #[must_use]
    pub fn parse_each<'a, I>(&self, candidates: I, mode: MatchMode) -> MatchResult
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut captures = Captures::new();
        for candidate in candidates {
            match self.parse(candidate, mode).into_captures() {
                Some(found) => captures.merge(found),
                None => return MatchResult::miss(),
            }
        }
        MatchResult::hit(captures)
    }
}
