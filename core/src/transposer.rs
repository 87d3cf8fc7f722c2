//! Transposers — commit-time value rewriting
//!
//! A [`Transposer`] maps a captured value to a replacement just before it becomes
//! visible to consumers. The typical use is translation: a rule captures
//! `/{lang}/{path}` and the `path` parameter is transposed through a resource
//! bundle selected by the `lang` parameter, so `/de/bibliothek` binds
//! `path = "library"`.
//!
//! A transposer never fails a rule. `None` means "no mapping" and the value
//! passes through unchanged.

use crate::store::Staged;
use crate::Bindings;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Rewrites one parameter value at commit time.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `Transposer`",
    note = "a Transposer maps a bound value to its replacement, or returns None to keep it"
)]
pub trait Transposer: Send + Sync + Debug {
    /// Return the replacement for `value`, or `None` to keep it.
    fn transpose(&self, value: &str, ctx: &TransposeContext<'_>) -> Option<String>;
}

/// Read access to the other parameters of the commit in progress.
///
/// Values are the staged, pre-transposition values of the current rule, falling
/// back to values committed by earlier rules of the same request.
#[derive(Debug, Clone, Copy)]
pub struct TransposeContext<'a> {
    source: ContextSource<'a>,
}

#[derive(Debug, Clone, Copy)]
enum ContextSource<'a> {
    Store {
        staged: &'a [Staged],
        committed: &'a Bindings,
    },
    Pairs(&'a [(&'a str, &'a str)]),
}

impl<'a> TransposeContext<'a> {
    pub(crate) fn new(staged: &'a [Staged], committed: &'a Bindings) -> Self {
        Self {
            source: ContextSource::Store { staged, committed },
        }
    }

    /// A context over fixed name/value pairs, for driving a transposer by hand.
    ///
    /// ```
    /// use rewire::TransposeContext;
    ///
    /// let ctx = TransposeContext::with_values(&[("lang", "de")]);
    /// assert_eq!(ctx.value("lang"), Some("de"));
    /// assert_eq!(ctx.value("path"), None);
    /// ```
    #[must_use]
    pub fn with_values(pairs: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            source: ContextSource::Pairs(pairs),
        }
    }

    /// The first value of another parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&'a str> {
        match self.source {
            ContextSource::Store { staged, committed } => staged
                .iter()
                .find(|s| s.name == name)
                .and_then(|s| s.values.first().map(String::as_str))
                .or_else(|| committed.first(name)),
            ContextSource::Pairs(pairs) => pairs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| *v),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Lookup sources
// ═══════════════════════════════════════════════════════════════════════════════

/// External key → value lookup, partitioned by a selector (e.g. a locale).
pub trait LookupSource: Send + Sync + Debug {
    /// Resolve `key` in the partition named by `selector`.
    fn resolve(&self, key: &str, selector: &str) -> Option<String>;
}

/// In-memory [`LookupSource`]: bundle name → key → value.
///
/// Resolution follows resource-bundle fallback: the selector `de_AT` is tried
/// first, then `de`, then the root bundle `""`.
///
/// ```
/// use rewire::{LookupSource, MapLookup};
///
/// let lookup = MapLookup::new()
///     .with_entry("de", "bibliothek", "library")
///     .with_entry("", "impressum", "imprint");
///
/// assert_eq!(lookup.resolve("bibliothek", "de_AT").as_deref(), Some("library"));
/// assert_eq!(lookup.resolve("impressum", "de").as_deref(), Some("imprint"));
/// assert_eq!(lookup.resolve("bibliothek", "fr"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(transparent))]
pub struct MapLookup {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl MapLookup {
    /// Create an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one entry to a bundle.
    #[must_use]
    pub fn with_entry(
        mut self,
        bundle: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.insert(bundle, key, value);
        self
    }

    /// Add one entry to a bundle, replacing any previous value.
    pub fn insert(
        &mut self,
        bundle: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.bundles
            .entry(bundle.into())
            .or_default()
            .insert(key.into(), value.into());
    }

    /// Number of bundles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    /// Returns `true` if there are no bundles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

impl LookupSource for MapLookup {
    fn resolve(&self, key: &str, selector: &str) -> Option<String> {
        fallback_chain(selector).find_map(|bundle| {
            self.bundles
                .get(bundle)
                .and_then(|entries| entries.get(key))
                .cloned()
        })
    }
}

/// `de_AT_x` → `de_AT_x`, `de_AT`, `de`, `""`.
fn fallback_chain(selector: &str) -> impl Iterator<Item = &str> {
    let mut next = Some(selector);
    std::iter::from_fn(move || {
        let current = next?;
        next = if current.is_empty() {
            None
        } else {
            Some(current.rfind(['_', '-']).map_or("", |i| &current[..i]))
        };
        Some(current)
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Bundle transposer
// ═══════════════════════════════════════════════════════════════════════════════

/// Translates a value through a [`LookupSource`], selecting the partition from
/// another parameter.
///
/// ```
/// use rewire::{BundleTransposer, MapLookup, TransposeContext, Transposer};
/// use std::sync::Arc;
///
/// let lookup = MapLookup::new().with_entry("de", "bibliothek", "library");
/// let t = BundleTransposer::new(Arc::new(lookup), "lang");
/// let ctx = TransposeContext::with_values(&[("lang", "de")]);
///
/// assert_eq!(t.transpose("bibliothek", &ctx).as_deref(), Some("library"));
/// assert_eq!(t.transpose("unknown", &ctx), None);
/// ```
#[derive(Debug, Clone)]
pub struct BundleTransposer {
    source: Arc<dyn LookupSource>,
    selector: String,
}

impl BundleTransposer {
    /// Create a transposer reading its selector from parameter `selector`.
    pub fn new(source: Arc<dyn LookupSource>, selector: impl Into<String>) -> Self {
        Self {
            source,
            selector: selector.into(),
        }
    }

    /// Name of the parameter that selects the bundle.
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl Transposer for BundleTransposer {
    fn transpose(&self, value: &str, ctx: &TransposeContext<'_>) -> Option<String> {
        let Some(selector) = ctx.value(&self.selector) else {
            tracing::trace!(selector = %self.selector, value, "selector parameter unbound");
            return None;
        };
        let resolved = self.source.resolve(value, selector);
        if resolved.is_none() {
            tracing::trace!(selector, value, "no bundle entry, value passes through");
        }
        resolved
    }
}
