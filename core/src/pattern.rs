//! `Pattern` — Compiled literal + placeholder template
//!
//! A pattern string such as `/{lang}/{path}` is parsed once, at rule-definition time,
//! into alternating [`Segment`]s. Literal text is regex-escaped and each placeholder
//! becomes a capture group over a character class (by default
//! [`DEFAULT_PLACEHOLDER_CLASS`]). The resulting regexes are cached on the [`Pattern`],
//! which is immutable and freely shared across evaluations.
//!
//! # Syntax
//!
//! - `{name}` — a named placeholder; names are unique within one pattern
//! - `\{`, `\}`, `\\` — literal brace / backslash
//! - a lone `}` outside a placeholder is literal text
//!
//! # Literal flavors
//!
//! [`Pattern::compile`] escapes literal text, so `/file.{ext}` only matches a real dot.
//! [`Pattern::regex`] keeps literal text as regular-expression syntax, so `[ab]` matches
//! `a` or `b` and `x-.*-{id}` matches any infix. Header and request-parameter
//! conditions use the regex flavor; paths use the escaped one.

use crate::{MalformedPatternError, MAX_PATTERN_LENGTH};
use regex::Regex;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

/// Default character class for a placeholder: one or more non-path-separator characters.
pub const DEFAULT_PLACEHOLDER_CLASS: &str = "[^/]+";

/// Name of a placeholder, unique within its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderName(String);

impl PlaceholderName {
    /// Create a placeholder name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaceholderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for PlaceholderName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlaceholderName {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl From<String> for PlaceholderName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// One piece of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text matched verbatim.
    Literal(String),
    /// A named capture slot.
    Placeholder(PlaceholderName),
}

/// A compiled parameterized pattern.
///
/// # Example
///
/// ```
/// use rewire::{MatchMode, Pattern};
///
/// let pattern = Pattern::compile("/{lang}/{path}").unwrap();
/// assert_eq!(pattern.names().len(), 2);
///
/// let result = pattern.parse("/de/bibliothek", MatchMode::Full);
/// assert!(result.is_match());
/// assert_eq!(result.captures().first("lang"), Some("de"));
/// assert_eq!(result.captures().first("path"), Some("bibliothek"));
///
/// assert!(!pattern.is_match("/de/bibliothek/extra", MatchMode::Full));
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    names: Vec<PlaceholderName>,
    /// Synthesized regex group name per placeholder, parallel to `names`.
    groups: Vec<String>,
    full: Regex,
    partial: Regex,
}

impl Pattern {
    /// Compile a pattern with default options.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPatternError`] for an unterminated, nested, empty or
    /// duplicated placeholder, or a pattern longer than [`MAX_PATTERN_LENGTH`].
    pub fn compile(source: &str) -> Result<Self, MalformedPatternError> {
        Self::builder(source).build()
    }

    /// Compile a pattern whose literal text is regular-expression syntax.
    ///
    /// ```
    /// use rewire::{MatchMode, Pattern};
    ///
    /// let pattern = Pattern::regex("[ab]").unwrap();
    /// assert!(pattern.is_match("a", MatchMode::Full));
    /// assert!(pattern.is_match("b", MatchMode::Full));
    /// assert!(!pattern.is_match("[ab]", MatchMode::Full));
    /// ```
    ///
    /// # Errors
    ///
    /// As [`compile`](Self::compile), plus [`MalformedPatternError::InvalidRegex`]
    /// when the literal text is not a valid regex.
    pub fn regex(source: &str) -> Result<Self, MalformedPatternError> {
        Self::builder(source).regex_literals(true).build()
    }

    /// Start building a pattern with per-placeholder constraints or other options.
    #[must_use]
    pub fn builder(source: &str) -> PatternBuilder {
        PatternBuilder::new(source)
    }

    /// The pattern string this was compiled from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Parsed segments in source order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholder names in declaration order.
    #[must_use]
    pub fn names(&self) -> &[PlaceholderName] {
        &self.names
    }

    /// Returns `true` if the pattern declares the given placeholder.
    #[must_use]
    pub fn has_placeholder(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.as_str() == name)
    }

    /// Substitute values back into the pattern.
    ///
    /// `lookup` is asked for every placeholder in declaration order. Values are
    /// inserted verbatim (no escaping). For a [`regex`](Self::regex) pattern the
    /// literal text is emitted as written.
    ///
    /// # Errors
    ///
    /// Returns the name of the first placeholder `lookup` has no value for.
    ///
    /// # Example
    ///
    /// ```
    /// use rewire::Pattern;
    ///
    /// let pattern = Pattern::compile("/{lang}/{path}").unwrap();
    /// let url = pattern
    ///     .expand(|name| match name {
    ///         "lang" => Some("en"),
    ///         "path" => Some("library"),
    ///         _ => None,
    ///     })
    ///     .unwrap();
    /// assert_eq!(url, "/en/library");
    /// ```
    pub fn expand<'v>(
        &self,
        lookup: impl Fn(&str) -> Option<&'v str>,
    ) -> Result<String, PlaceholderName> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = lookup(name.as_str()).ok_or_else(|| name.clone())?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn full_regex(&self) -> &Regex {
        &self.full
    }

    pub(crate) fn partial_regex(&self) -> &Regex {
        &self.partial
    }

    pub(crate) fn groups(&self) -> impl Iterator<Item = (&PlaceholderName, &str)> {
        self.names
            .iter()
            .zip(self.groups.iter().map(String::as_str))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Options for compiling a [`Pattern`].
///
/// ```
/// use rewire::{MatchMode, Pattern};
///
/// let pattern = Pattern::builder("/{lang}/{id}")
///     .constrain("lang", "[a-z]{2}")
///     .constrain("id", r"\d+")
///     .build()
///     .unwrap();
///
/// assert!(pattern.is_match("/de/42", MatchMode::Full));
/// assert!(!pattern.is_match("/deu/42", MatchMode::Full));
/// assert!(!pattern.is_match("/de/abc", MatchMode::Full));
/// ```
#[derive(Debug, Clone)]
pub struct PatternBuilder {
    source: String,
    default_class: String,
    constraints: HashMap<String, String>,
    ignore_case: bool,
    regex_literals: bool,
}

impl PatternBuilder {
    /// Create a builder for the given pattern string.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            default_class: DEFAULT_PLACEHOLDER_CLASS.to_owned(),
            constraints: HashMap::new(),
            ignore_case: false,
            regex_literals: false,
        }
    }

    /// Replace the character class used by every unconstrained placeholder.
    #[must_use]
    pub fn default_class(mut self, class: impl Into<String>) -> Self {
        self.default_class = class.into();
        self
    }

    /// Restrict one placeholder to the given regex.
    #[must_use]
    pub fn constrain(mut self, name: impl Into<String>, regex: impl Into<String>) -> Self {
        self.constraints.insert(name.into(), regex.into());
        self
    }

    /// Match case-insensitively (default: case-sensitive).
    #[must_use]
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Treat literal text as regular-expression syntax instead of escaping it.
    #[must_use]
    pub fn regex_literals(mut self, regex_literals: bool) -> Self {
        self.regex_literals = regex_literals;
        self
    }

    /// Compile the pattern.
    ///
    /// # Errors
    ///
    /// See [`MalformedPatternError`] for the failure cases.
    pub fn build(self) -> Result<Pattern, MalformedPatternError> {
        let len = self.source.len() + self.constraints.values().map(String::len).sum::<usize>();
        if len > MAX_PATTERN_LENGTH {
            return Err(MalformedPatternError::TooLong {
                len,
                max: MAX_PATTERN_LENGTH,
            });
        }

        let segments = parse_segments(&self.source)?;
        let names: Vec<PlaceholderName> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.clone()),
                Segment::Literal(_) => None,
            })
            .collect();

        if let Some(unknown) = self
            .constraints
            .keys()
            .find(|k| !names.iter().any(|n| n.as_str() == k.as_str()))
        {
            return Err(MalformedPatternError::UnknownPlaceholder {
                pattern: self.source.clone(),
                name: unknown.clone(),
            });
        }

        check_class("*", &self.default_class)?;
        for (name, class) in &self.constraints {
            check_class(name, class)?;
        }

        let mut body = String::new();
        let mut groups = Vec::with_capacity(names.len());
        for segment in &segments {
            match segment {
                Segment::Literal(text) if self.regex_literals => body.push_str(text),
                Segment::Literal(text) => body.push_str(&regex::escape(text)),
                Segment::Placeholder(name) => {
                    let group = format!("p{}", groups.len());
                    let class = self
                        .constraints
                        .get(name.as_str())
                        .unwrap_or(&self.default_class);
                    body.push_str(&format!("(?P<{group}>(?:{class}))"));
                    groups.push(group);
                }
            }
        }

        let flags = if self.ignore_case { "(?i)" } else { "" };
        let full = self.compile_regex(&format!("{flags}^(?:{body})$"))?;
        let partial = self.compile_regex(&format!("{flags}(?:{body})"))?;

        Ok(Pattern {
            source: self.source,
            segments,
            names,
            groups,
            full,
            partial,
        })
    }

    /// Classes are checked before this runs, so a failure here comes from literal text.
    fn compile_regex(&self, regex: &str) -> Result<Regex, MalformedPatternError> {
        Regex::new(regex).map_err(|e| MalformedPatternError::InvalidRegex {
            pattern: self.source.clone(),
            reason: e.to_string(),
        })
    }
}

fn check_class(name: &str, class: &str) -> Result<(), MalformedPatternError> {
    Regex::new(&format!("(?:{class})"))
        .map(|_| ())
        .map_err(|e| MalformedPatternError::InvalidConstraint {
            name: name.to_owned(),
            reason: e.to_string(),
        })
}

/// Split a pattern string into literal and placeholder segments.
fn parse_segments(source: &str) -> Result<Vec<Segment>, MalformedPatternError> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&(_, next @ ('{' | '}' | '\\'))) => {
                    literal.push(next);
                    chars.next();
                }
                _ => literal.push('\\'),
            },
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for (inner_offset, inner) in chars.by_ref() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        '{' => {
                            return Err(MalformedPatternError::NestedPlaceholder {
                                pattern: source.to_owned(),
                                offset: inner_offset,
                            })
                        }
                        other => name.push(other),
                    }
                }
                if !closed {
                    return Err(MalformedPatternError::Unterminated {
                        pattern: source.to_owned(),
                        offset,
                    });
                }
                if name.is_empty() {
                    return Err(MalformedPatternError::EmptyPlaceholder {
                        pattern: source.to_owned(),
                        offset,
                    });
                }
                let duplicate = segments
                    .iter()
                    .any(|s| matches!(s, Segment::Placeholder(n) if n.as_str() == name));
                if duplicate {
                    return Err(MalformedPatternError::DuplicatePlaceholder {
                        pattern: source.to_owned(),
                        name,
                    });
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(PlaceholderName(name)));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MatchMode;

    fn names(pattern: &Pattern) -> Vec<&str> {
        pattern.names().iter().map(PlaceholderName::as_str).collect()
    }

    #[test]
    fn placeholders_in_declaration_order() {
        let p = Pattern::compile("{a}/{b}").unwrap();
        assert_eq!(names(&p), ["a", "b"]);
        assert_eq!(
            p.segments(),
            [
                Segment::Placeholder("a".into()),
                Segment::Literal("/".into()),
                Segment::Placeholder("b".into()),
            ]
        );
    }

    #[test]
    fn duplicate_placeholder_is_malformed() {
        let err = Pattern::compile("/{a}/{a}").unwrap_err();
        assert_eq!(
            err,
            MalformedPatternError::DuplicatePlaceholder {
                pattern: "/{a}/{a}".into(),
                name: "a".into(),
            }
        );
    }

    #[test]
    fn unterminated_placeholder_is_malformed() {
        let err = Pattern::compile("/users/{id").unwrap_err();
        assert_eq!(
            err,
            MalformedPatternError::Unterminated {
                pattern: "/users/{id".into(),
                offset: 7,
            }
        );
    }

    #[test]
    fn nested_and_empty_placeholders_are_malformed() {
        assert!(matches!(
            Pattern::compile("/{a{b}}"),
            Err(MalformedPatternError::NestedPlaceholder { offset: 3, .. })
        ));
        assert!(matches!(
            Pattern::compile("/{}"),
            Err(MalformedPatternError::EmptyPlaceholder { offset: 1, .. })
        ));
    }

    #[test]
    fn escaped_braces_are_literal() {
        let p = Pattern::compile(r"/json/\{{key}\}").unwrap();
        assert_eq!(names(&p), ["key"]);
        assert!(p.is_match("/json/{name}", MatchMode::Full));
        assert!(!p.is_match("/json/name", MatchMode::Full));
    }

    #[test]
    fn lone_closing_brace_is_literal() {
        let p = Pattern::compile("a}b").unwrap();
        assert_eq!(p.segments(), [Segment::Literal("a}b".into())]);
        assert!(p.is_match("a}b", MatchMode::Full));
    }

    #[test]
    fn regex_metacharacters_in_literals_are_escaped() {
        let p = Pattern::compile("/file.{ext}").unwrap();
        assert!(p.is_match("/file.txt", MatchMode::Full));
        assert!(!p.is_match("/fileXtxt", MatchMode::Full));

        let p = Pattern::compile("(a+)*").unwrap();
        assert!(p.is_match("(a+)*", MatchMode::Full));
        assert!(!p.is_match("aaa", MatchMode::Full));
    }

    #[test]
    fn constraint_for_unknown_placeholder_is_rejected() {
        let err = Pattern::builder("/{a}")
            .constrain("b", r"\d+")
            .build()
            .unwrap_err();
        assert!(matches!(err, MalformedPatternError::UnknownPlaceholder { name, .. } if name == "b"));
    }

    #[test]
    fn invalid_constraint_names_the_placeholder() {
        let err = Pattern::builder("/{id}")
            .constrain("id", "[0-9")
            .build()
            .unwrap_err();
        assert!(matches!(err, MalformedPatternError::InvalidConstraint { name, .. } if name == "id"));
    }

    #[test]
    fn default_class_is_overridable_per_pattern() {
        let p = Pattern::builder("/static/{path}")
            .default_class(".+")
            .build()
            .unwrap();
        let result = p.parse("/static/css/site.css", MatchMode::Full);
        assert_eq!(result.captures().first("path"), Some("css/site.css"));

        let default = Pattern::compile("/static/{path}").unwrap();
        assert!(!default.is_match("/static/css/site.css", MatchMode::Full));
    }

    #[test]
    fn regex_flavor_keeps_literal_syntax() {
        let p = Pattern::regex(r"x-.*-{id}").unwrap();
        let result = p.parse("x-anything-42", MatchMode::Full);
        assert_eq!(result.captures().first("id"), Some("42"));

        let escaped = Pattern::compile(r"x-.*-{id}").unwrap();
        assert!(!escaped.is_match("x-anything-42", MatchMode::Full));
        assert!(escaped.is_match("x-.*-42", MatchMode::Full));
    }

    #[test]
    fn regex_flavor_quantifiers_need_escaped_braces() {
        let p = Pattern::regex(r"v\d\{2\}/{rest}").unwrap();
        assert!(p.is_match("v12/x", MatchMode::Full));
        assert!(!p.is_match("v1/x", MatchMode::Full));
    }

    #[test]
    fn invalid_regex_literal_is_malformed() {
        assert!(matches!(
            Pattern::regex("[a-{x}"),
            Err(MalformedPatternError::InvalidRegex { .. })
        ));
    }

    #[test]
    fn too_long_pattern_is_rejected() {
        let source = "a".repeat(MAX_PATTERN_LENGTH + 1);
        assert!(matches!(
            Pattern::compile(&source),
            Err(MalformedPatternError::TooLong { .. })
        ));
    }

    #[test]
    fn pattern_at_length_limit_compiles() {
        let source = format!("{{x}}{}", "a".repeat(MAX_PATTERN_LENGTH - 3));
        assert_eq!(source.len(), MAX_PATTERN_LENGTH);
        assert!(Pattern::compile(&source).is_ok());

        let constrained = Pattern::builder(&source).constrain("x", "b").build();
        assert!(matches!(
            constrained,
            Err(MalformedPatternError::TooLong { len, .. }) if len == MAX_PATTERN_LENGTH + 1
        ));
    }

    #[test]
    fn expand_reports_unbound_placeholder() {
        let p = Pattern::compile("/{lang}/{path}").unwrap();
        let missing = p
            .expand(|n| if n == "lang" { Some("de") } else { None })
            .unwrap_err();
        assert_eq!(missing.as_str(), "path");
    }

    #[test]
    fn placeholder_names_may_contain_any_character() {
        let p = Pattern::compile("/{user.name}/{a-b}").unwrap();
        let result = p.parse("/lincoln/x", MatchMode::Full);
        assert_eq!(result.captures().first("user.name"), Some("lincoln"));
        assert_eq!(result.captures().first("a-b"), Some("x"));
    }

    #[test]
    fn pattern_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pattern>();
    }
}
