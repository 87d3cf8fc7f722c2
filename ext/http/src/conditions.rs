//! Condition constructors for HTTP requests.
//!
//! Path and method patterns escape their literal text. Header and request
//! parameter patterns keep literal text as regex syntax, so `"x-.*"` or
//! `"[ab]"` behave as expressions around their `{placeholders}`.
//!
//! ```
//! use rewire_http::prelude::*;
//!
//! let mut condition = RequestParameter::matches_all("tags", "{tag}").unwrap();
//! condition.parameter("tag").matches("[ab]").unwrap();
//!
//! let rules: RuleSet<HttpRequest, &str> =
//!     RuleSet::new(vec![Rule::new("tags", condition, "filter")]);
//!
//! let request = HttpRequest::builder().target("/?tags=a&tags=b").build();
//! assert!(rules.evaluate(&request).is_some());
//! ```

use crate::{Headers, HttpRequest, MethodInput, PathInput, RequestParameters};
use rewire::prelude::*;

fn regex_pattern(source: &str, ignore_case: bool) -> Result<Pattern, MalformedPatternError> {
    Pattern::builder(source)
        .regex_literals(true)
        .ignore_case(ignore_case)
        .build()
}

/// Conditions on the request path.
#[derive(Debug, Clone, Copy)]
pub struct Path;

impl Path {
    /// The whole path matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn matches(pattern: &str) -> Result<PatternCondition<HttpRequest>, MalformedPatternError> {
        Ok(PatternCondition::new(
            Box::new(PathInput),
            Pattern::compile(pattern)?,
        ))
    }

    /// Some part of the path matches `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn contains(pattern: &str) -> Result<PatternCondition<HttpRequest>, MalformedPatternError> {
        Ok(PatternCondition::contains(
            Box::new(PathInput),
            Pattern::compile(pattern)?,
        ))
    }
}

/// Conditions on the request method.
#[derive(Debug, Clone, Copy)]
pub struct Method;

impl Method {
    /// The method equals `method`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if `method` contains placeholder syntax.
    pub fn is(method: &str) -> Result<PatternCondition<HttpRequest>, MalformedPatternError> {
        let pattern = Pattern::builder(method).ignore_case(true).build()?;
        Ok(PatternCondition::new(Box::new(MethodInput), pattern))
    }
}

/// Conditions over request headers. Header names match case-insensitively.
#[derive(Debug, Clone, Copy)]
pub struct Header;

impl Header {
    /// First header named like `name` with a value matching `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if either pattern does not compile.
    pub fn matches(
        name: &str,
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::matches(
            Box::new(Headers),
            regex_pattern(name, true)?,
            regex_pattern(value, false)?,
        ))
    }

    /// First header named like `name` whose every value matches `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if either pattern does not compile.
    pub fn matches_all(
        name: &str,
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::matches_all(
            Box::new(Headers),
            regex_pattern(name, true)?,
            regex_pattern(value, false)?,
        ))
    }

    /// A header named like `name` is present.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn exists(name: &str) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::exists(
            Box::new(Headers),
            regex_pattern(name, true)?,
        ))
    }

    /// Some header, under any name, has a value matching `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn value_exists(
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::value_exists(
            Box::new(Headers),
            regex_pattern(value, false)?,
        ))
    }
}

/// Conditions over request (query or form) parameters.
#[derive(Debug, Clone, Copy)]
pub struct RequestParameter;

impl RequestParameter {
    /// First parameter named like `name` with a value matching `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if either pattern does not compile.
    pub fn matches(
        name: &str,
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::matches(
            Box::new(RequestParameters),
            Pattern::regex(name)?,
            Pattern::regex(value)?,
        ))
    }

    /// First parameter named like `name` whose every value matches `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if either pattern does not compile.
    pub fn matches_all(
        name: &str,
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::matches_all(
            Box::new(RequestParameters),
            Pattern::regex(name)?,
            Pattern::regex(value)?,
        ))
    }

    /// A parameter named like `name` is present.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn exists(name: &str) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::exists(
            Box::new(RequestParameters),
            Pattern::regex(name)?,
        ))
    }

    /// Some parameter, under any name, has a value matching `value`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] if the pattern does not compile.
    pub fn value_exists(
        value: &str,
    ) -> Result<CandidateCondition<HttpRequest>, MalformedPatternError> {
        Ok(CandidateCondition::value_exists(
            Box::new(RequestParameters),
            Pattern::regex(value)?,
        ))
    }
}
