//! `ParameterStore` — request-scoped staging, commit and rollback
//!
//! Captures do not become visible the moment a pattern matches. A condition
//! *stages* them through [`ParameterStore::enqueue_submission`], which checks the
//! parameter's validators and refuses a name already staged with different
//! values. When the whole condition tree of a rule succeeds, [`commit`] runs the
//! transposers, submits bindings, and publishes the values as [`Bindings`]. When
//! any part fails, staging is rolled back to a [`Checkpoint`] and nothing leaks.
//!
//! One store serves one request. It is never shared.
//!
//! [`commit`]: ParameterStore::commit

use crate::{Binding, BindingError, ParameterDefinition, Pattern, PlaceholderName};
use crate::{TransposeContext, Transposer};
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Why values could not be staged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StagingError {
    /// The name is already staged with different values.
    #[error("parameter \"{name}\" is already staged as {existing:?}, refusing {proposed:?}")]
    Conflict {
        /// Parameter name.
        name: String,
        /// Values already staged.
        existing: Vec<String>,
        /// Values that were refused.
        proposed: Vec<String>,
    },
    /// A validator or the binding refused the values.
    #[error("parameter \"{name}\" rejected {values:?}")]
    Rejected {
        /// Parameter name.
        name: String,
        /// The refused values.
        values: Vec<String>,
    },
}

/// Why a commit did not publish anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// Transposed values no longer pass a binding's validation.
    #[error(transparent)]
    Rejected(#[from] StagingError),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Bindings
// ═══════════════════════════════════════════════════════════════════════════════

/// Committed parameter values, in the order they were first published.
///
/// ```
/// use rewire::{Bindings, Pattern};
///
/// let mut bindings = Bindings::new();
/// bindings.insert("lang", vec!["en".into()]);
/// bindings.insert("path", vec!["library".into()]);
///
/// let target = Pattern::compile("/{lang}/{path}").unwrap();
/// assert_eq!(bindings.expand(&target).unwrap(), "/en/library");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bindings {
    entries: Vec<(String, Vec<String>)>,
}

impl Bindings {
    /// An empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `values` under `name`, replacing an earlier binding in place.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((name, values)),
        }
    }

    /// Insert every entry of `other`, replacing earlier bindings of the same name.
    pub fn extend(&mut self, other: Bindings) {
        for (name, values) in other.entries {
            self.insert(name, values);
        }
    }

    /// All values bound under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// The first value bound under `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Returns `true` if `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate bindings in publication order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Number of bound names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Substitute the first value of each binding into `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the name of the first placeholder with no binding.
    pub fn expand(&self, pattern: &Pattern) -> Result<String, PlaceholderName> {
        pattern.expand(|name| self.first(name))
    }
}

impl FromIterator<(String, Vec<String>)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        for (name, values) in iter {
            bindings.insert(name, values);
        }
        bindings
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Store
// ═══════════════════════════════════════════════════════════════════════════════

/// One staged parameter of the rule being evaluated.
#[derive(Debug, Clone)]
pub(crate) struct Staged {
    pub(crate) name: String,
    pub(crate) values: Vec<String>,
    pub(crate) definition: Option<Arc<ParameterDefinition>>,
}

/// A definition brought by a later clause that restaged an equal value.
#[derive(Debug, Clone)]
struct Attached {
    index: usize,
    definition: Arc<ParameterDefinition>,
}

/// A position in the staging buffer to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    staged: usize,
    attached: usize,
}

#[derive(Debug)]
struct DeferredSubmission {
    name: String,
    binding: Arc<dyn Binding>,
    values: Vec<String>,
}

/// Request-scoped parameter state.
///
/// ```
/// use rewire::ParameterStore;
///
/// let mut store = ParameterStore::new();
/// assert!(store.enqueue_submission("lang", None, vec!["de".into()]));
/// // Same values again: accepted.
/// assert!(store.enqueue_submission("lang", None, vec!["de".into()]));
/// // Different values: conflict.
/// assert!(!store.enqueue_submission("lang", None, vec!["en".into()]));
///
/// let published = store.commit().unwrap();
/// assert_eq!(published.first("lang"), Some("de"));
/// assert_eq!(store.bindings().first("lang"), Some("de"));
/// ```
#[derive(Debug, Default)]
pub struct ParameterStore {
    staged: Vec<Staged>,
    attached: Vec<Attached>,
    committed: Bindings,
    deferred: Vec<DeferredSubmission>,
    faults: Vec<BindingError>,
    postback: bool,
}

impl ParameterStore {
    /// A store for an ordinary request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store for a postback request; bindings marked `ignore_postback` are skipped.
    #[must_use]
    pub fn postback() -> Self {
        Self {
            postback: true,
            ..Self::default()
        }
    }

    /// Whether this store serves a postback request.
    #[must_use]
    pub fn is_postback(&self) -> bool {
        self.postback
    }

    /// Stage `values` under `name`, reporting why they were refused.
    ///
    /// # Errors
    ///
    /// - [`StagingError::Rejected`] if a validator of `definition` (or its
    ///   binding) refuses the values
    /// - [`StagingError::Conflict`] if `name` is already staged with different values
    ///
    /// Restaging equal values keeps the first entry; a definition the first
    /// stager did not bring is attached to it, so its transposers and binding
    /// still run at commit.
    pub fn try_enqueue(
        &mut self,
        name: &str,
        definition: Option<&Arc<ParameterDefinition>>,
        values: Vec<String>,
    ) -> Result<(), StagingError> {
        if let Some(def) = definition {
            if !def.validates(&values) {
                return Err(StagingError::Rejected {
                    name: name.to_owned(),
                    values,
                });
            }
        }
        if let Some(index) = self.staged.iter().position(|s| s.name == name) {
            let existing = &self.staged[index];
            if existing.values == values {
                if let Some(def) = definition {
                    if !self.definitions(index).any(|d| Arc::ptr_eq(d, def)) {
                        self.attached.push(Attached {
                            index,
                            definition: Arc::clone(def),
                        });
                    }
                }
                return Ok(());
            }
            return Err(StagingError::Conflict {
                name: name.to_owned(),
                existing: existing.values.clone(),
                proposed: values,
            });
        }
        self.staged.push(Staged {
            name: name.to_owned(),
            values,
            definition: definition.cloned(),
        });
        Ok(())
    }

    /// Stage `values` under `name`; `false` if they were refused.
    pub fn enqueue_submission(
        &mut self,
        name: &str,
        definition: Option<&Arc<ParameterDefinition>>,
        values: Vec<String>,
    ) -> bool {
        match self.try_enqueue(name, definition, values) {
            Ok(()) => true,
            Err(error) => {
                tracing::debug!(%error, "staging refused");
                false
            }
        }
    }

    /// Values currently staged under `name`.
    #[must_use]
    pub fn staged(&self, name: &str) -> Option<&[String]> {
        self.staged
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.values.as_slice())
    }

    /// Number of staged names.
    #[must_use]
    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    /// Remember the current staging position.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            staged: self.staged.len(),
            attached: self.attached.len(),
        }
    }

    /// Discard everything staged after `checkpoint`.
    pub fn rollback_to(&mut self, checkpoint: Checkpoint) {
        self.staged.truncate(checkpoint.staged);
        self.attached.truncate(checkpoint.attached);
    }

    /// Discard the whole staging buffer. Committed bindings are kept.
    pub fn rollback(&mut self) {
        self.staged.clear();
        self.attached.clear();
    }

    /// Every definition staged for entry `index`, in staging order.
    fn definitions(&self, index: usize) -> impl Iterator<Item = &Arc<ParameterDefinition>> {
        self.staged[index].definition.iter().chain(
            self.attached
                .iter()
                .filter(move |a| a.index == index)
                .map(|a| &a.definition),
        )
    }

    /// Transpose, submit and publish everything staged.
    ///
    /// Returns what this commit published. The staging buffer is empty afterwards
    /// whether or not the commit succeeded.
    ///
    /// Order per parameter: the transposers of each definition staged for it, in
    /// staging order (each sees the previous one's output), then every
    /// definition's binding validation on the transposed values. Bindings are
    /// only submitted once every parameter has passed.
    ///
    /// A binding whose `submit` fails after validating is a fault of that
    /// target, not of the rule: the values are still published and every other
    /// binding is still submitted. Such failures are logged and kept for
    /// [`take_faults`](Self::take_faults).
    ///
    /// # Errors
    ///
    /// Returns [`CommitError`] if transposed values fail a binding's validation.
    /// Nothing is published and no binding is submitted in that case.
    pub fn commit(&mut self) -> Result<Bindings, CommitError> {
        let definitions: Vec<Vec<Arc<ParameterDefinition>>> = (0..self.staged.len())
            .map(|index| self.definitions(index).cloned().collect())
            .collect();
        let staged = std::mem::take(&mut self.staged);
        self.attached.clear();

        let mut resolved = Vec::with_capacity(staged.len());
        {
            let ctx = TransposeContext::new(&staged, &self.committed);
            for (entry, defs) in staged.iter().zip(&definitions) {
                let values = defs.iter().fold(entry.values.clone(), |values, def| {
                    transpose_all(def.transposers(), &values, &ctx)
                });
                if !defs.iter().all(|def| def.binding_validates(&values)) {
                    return Err(StagingError::Rejected {
                        name: entry.name.clone(),
                        values,
                    }
                    .into());
                }
                resolved.push(values);
            }
        }

        for ((entry, defs), values) in staged.iter().zip(&definitions).zip(&resolved) {
            for def in defs {
                let Some(binding) = def.binding() else { continue };
                let options = def.options();
                if self.postback && options.ignore_postback {
                    tracing::debug!(name = %entry.name, "postback, binding skipped");
                } else if options.deferred {
                    self.deferred.push(DeferredSubmission {
                        name: entry.name.clone(),
                        binding: Arc::clone(binding),
                        values: values.clone(),
                    });
                } else if let Err(error) = binding.submit(values) {
                    tracing::warn!(name = %entry.name, %error, "binding refused submission");
                    self.faults.push(error);
                }
            }
        }

        let published: Bindings = staged
            .into_iter()
            .zip(resolved)
            .map(|(entry, values)| (entry.name, values))
            .collect();
        self.committed.extend(published.clone());
        Ok(published)
    }

    /// Binding submissions that failed during commit, oldest first. Drains them.
    pub fn take_faults(&mut self) -> Vec<BindingError> {
        std::mem::take(&mut self.faults)
    }

    /// Submit every deferred binding, in commit order.
    ///
    /// Returns how many were submitted.
    ///
    /// # Errors
    ///
    /// Stops at the first refusal; submissions after it stay queued.
    pub fn flush_deferred(&mut self) -> Result<usize, BindingError> {
        let mut pending = std::mem::take(&mut self.deferred).into_iter();
        let mut flushed = 0;
        while let Some(submission) = pending.next() {
            if let Err(error) = submission.binding.submit(&submission.values) {
                tracing::warn!(name = %submission.name, %error, "deferred binding refused");
                self.deferred = pending.collect();
                return Err(error);
            }
            flushed += 1;
        }
        Ok(flushed)
    }

    /// Number of queued deferred submissions.
    #[must_use]
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Committed values under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.committed.get(name)
    }

    /// Everything committed so far in this request.
    #[must_use]
    pub fn bindings(&self) -> &Bindings {
        &self.committed
    }

    /// Consume the store, returning its committed bindings.
    #[must_use]
    pub fn into_bindings(self) -> Bindings {
        self.committed
    }
}

fn transpose_all(
    transposers: &[Arc<dyn Transposer>],
    values: &[String],
    ctx: &TransposeContext<'_>,
) -> Vec<String> {
    values
        .iter()
        .map(|value| {
            transposers.iter().fold(value.clone(), |current, t| {
                t.transpose(&current, ctx).unwrap_or(current)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BundleTransposer, MapLookup, Parameters, Slot};

    fn v(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn conflicting_restage_is_refused() {
        let mut store = ParameterStore::new();
        assert!(store.enqueue_submission("lang", None, v(&["de"])));
        assert_eq!(
            store.try_enqueue("lang", None, v(&["en"])),
            Err(StagingError::Conflict {
                name: "lang".into(),
                existing: v(&["de"]),
                proposed: v(&["en"]),
            })
        );
        assert_eq!(store.staged("lang"), Some(&v(&["de"])[..]));
    }

    #[test]
    fn equal_restage_merges() {
        let mut store = ParameterStore::new();
        assert!(store.enqueue_submission("lang", None, v(&["de"])));
        assert!(store.enqueue_submission("lang", None, v(&["de"])));
        assert_eq!(store.staged_len(), 1);
    }

    #[test]
    fn validator_rejection_stages_nothing() {
        let mut params = Parameters::new();
        params.parameter("id").matches(r"\d+").unwrap();
        let def = params.get("id");

        let mut store = ParameterStore::new();
        assert!(!store.enqueue_submission("id", def, v(&["abc"])));
        assert_eq!(store.staged("id"), None);
        assert!(store.enqueue_submission("id", def, v(&["42"])));
    }

    #[test]
    fn rollback_to_checkpoint() {
        let mut store = ParameterStore::new();
        store.enqueue_submission("a", None, v(&["1"]));
        let cp = store.checkpoint();
        store.enqueue_submission("b", None, v(&["2"]));
        store.rollback_to(cp);
        assert!(store.staged("a").is_some());
        assert!(store.staged("b").is_none());

        store.rollback();
        assert_eq!(store.staged_len(), 0);
        assert!(store.commit().unwrap().is_empty());
    }

    #[test]
    fn commit_transposes_with_raw_selector() {
        let lookup = Arc::new(
            MapLookup::new()
                .with_entry("de", "bibliothek", "library")
                .with_entry("de", "de", "en"),
        );
        let mut params = Parameters::new();
        params
            .parameter("path")
            .transposed_by(BundleTransposer::new(lookup.clone(), "lang"));
        // The selector is itself transposed, but transposers read staged values.
        params
            .parameter("lang")
            .transposed_by(BundleTransposer::new(lookup, "lang"));

        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        store.enqueue_submission("path", params.get("path"), v(&["bibliothek"]));
        let published = store.commit().unwrap();

        assert_eq!(published.first("lang"), Some("en"));
        assert_eq!(published.first("path"), Some("library"));
        let names: Vec<_> = published.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["lang", "path"]);
    }

    #[derive(Debug)]
    struct Suffix(&'static str);

    impl Transposer for Suffix {
        fn transpose(&self, value: &str, _ctx: &TransposeContext<'_>) -> Option<String> {
            Some(format!("{value}{}", self.0))
        }
    }

    #[test]
    fn transposers_chain_in_order() {
        let mut params = Parameters::new();
        params
            .parameter("x")
            .transposed_by(Suffix("-a"))
            .transposed_by(Suffix("-b"));
        let mut store = ParameterStore::new();
        store.enqueue_submission("x", params.get("x"), v(&["v"]));
        assert_eq!(store.commit().unwrap().first("x"), Some("v-a-b"));
    }

    #[test]
    fn commit_submits_bindings() {
        let slot = Slot::new("lang");
        let mut params = Parameters::new();
        params.parameter("lang").bind_to(slot.clone());

        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        assert!(!slot.is_set());
        store.commit().unwrap();
        assert_eq!(slot.first().as_deref(), Some("de"));
    }

    #[derive(Debug)]
    struct ShortOnly;

    impl Binding for ShortOnly {
        fn validates(&self, values: &[String]) -> bool {
            values.iter().all(|v| v.len() <= 3)
        }

        fn submit(&self, _values: &[String]) -> Result<(), BindingError> {
            Ok(())
        }
    }

    #[test]
    fn transposed_values_are_revalidated() {
        let mut params = Parameters::new();
        params
            .parameter("x")
            .transposed_by(Suffix("-long"))
            .bind_to(ShortOnly);
        let mut store = ParameterStore::new();
        assert!(store.enqueue_submission("x", params.get("x"), v(&["ab"])));

        let err = store.commit().unwrap_err();
        assert!(matches!(err, CommitError::Rejected(StagingError::Rejected { .. })));
        assert!(store.bindings().is_empty());
        assert_eq!(store.staged_len(), 0);
    }

    #[test]
    fn deferred_bindings_wait_for_flush() {
        let slot = Slot::new("lang");
        let mut params = Parameters::new();
        params.parameter("lang").bind_to(slot.clone()).deferred();

        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        store.commit().unwrap();
        assert!(!slot.is_set());
        assert_eq!(store.deferred_len(), 1);
        // Value is published even before the binding is submitted.
        assert_eq!(store.get("lang"), Some(&v(&["de"])[..]));

        assert_eq!(store.flush_deferred().unwrap(), 1);
        assert_eq!(slot.first().as_deref(), Some("de"));
        assert_eq!(store.deferred_len(), 0);
    }

    #[test]
    fn postback_skips_ignore_postback_bindings() {
        let slot = Slot::new("lang");
        let mut params = Parameters::new();
        params.parameter("lang").bind_to(slot.clone()).ignore_postback();

        let mut store = ParameterStore::postback();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        let published = store.commit().unwrap();
        assert!(!slot.is_set());
        assert_eq!(published.first("lang"), Some("de"));

        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        store.commit().unwrap();
        assert!(slot.is_set());
    }

    #[test]
    fn later_commit_replaces_earlier_value() {
        let mut store = ParameterStore::new();
        store.enqueue_submission("a", None, v(&["1"]));
        store.commit().unwrap();
        // Committed values do not constrain staging.
        assert!(store.enqueue_submission("a", None, v(&["2"])));
        store.commit().unwrap();
        assert_eq!(store.bindings().first("a"), Some("2"));
        assert_eq!(store.bindings().len(), 1);
    }

    #[test]
    fn transpose_context_falls_back_to_committed() {
        let lookup = Arc::new(MapLookup::new().with_entry("de", "bibliothek", "library"));
        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", None, v(&["de"]));
        store.commit().unwrap();

        let mut params = Parameters::new();
        params
            .parameter("path")
            .transposed_by(BundleTransposer::new(lookup, "lang"));
        store.enqueue_submission("path", params.get("path"), v(&["bibliothek"]));
        assert_eq!(store.commit().unwrap().first("path"), Some("library"));
    }

    #[derive(Debug)]
    struct Upper;

    impl Transposer for Upper {
        fn transpose(&self, value: &str, _ctx: &TransposeContext<'_>) -> Option<String> {
            Some(value.to_uppercase())
        }
    }

    #[test]
    fn equal_restage_attaches_new_definition() {
        let slot = Slot::new("lang");
        let mut params = Parameters::new();
        params.parameter("lang").bind_to(slot.clone()).transposed_by(Upper);

        let mut store = ParameterStore::new();
        assert!(store.enqueue_submission("lang", None, v(&["de"])));
        assert!(store.enqueue_submission("lang", params.get("lang"), v(&["de"])));
        // Same definition again is not attached twice.
        assert!(store.enqueue_submission("lang", params.get("lang"), v(&["de"])));
        assert_eq!(store.staged_len(), 1);

        let published = store.commit().unwrap();
        assert_eq!(published.first("lang"), Some("DE"));
        assert_eq!(slot.get(), Some(v(&["DE"])));
    }

    #[test]
    fn attached_definition_is_rolled_back() {
        let slot = Slot::new("lang");
        let mut params = Parameters::new();
        params.parameter("lang").bind_to(slot.clone());

        let mut store = ParameterStore::new();
        store.enqueue_submission("lang", None, v(&["de"]));
        let cp = store.checkpoint();
        store.enqueue_submission("lang", params.get("lang"), v(&["de"]));
        store.rollback_to(cp);

        assert_eq!(store.commit().unwrap().first("lang"), Some("de"));
        assert!(!slot.is_set());
    }

    #[test]
    fn every_attached_binding_must_validate() {
        let mut first = Parameters::new();
        first.parameter("x").transposed_by(Suffix("-long"));
        let mut second = Parameters::new();
        second.parameter("x").bind_to(ShortOnly);

        let mut store = ParameterStore::new();
        store.enqueue_submission("x", first.get("x"), v(&["ab"]));
        store.enqueue_submission("x", second.get("x"), v(&["ab"]));
        assert!(store.commit().is_err());
        assert!(store.bindings().is_empty());
    }

    #[derive(Debug)]
    struct Unreachable;

    impl Binding for Unreachable {
        fn submit(&self, values: &[String]) -> Result<(), BindingError> {
            Err(BindingError::Unavailable {
                name: "b".into(),
                reason: format!("target down, dropped {values:?}"),
            })
        }
    }

    #[test]
    fn refused_submission_is_a_fault_not_a_rollback() {
        let slot_a = Slot::new("a");
        let slot_c = Slot::new("c");
        let mut params = Parameters::new();
        params.parameter("a").bind_to(slot_a.clone());
        params.parameter("b").bind_to(Unreachable);
        params.parameter("c").bind_to(slot_c.clone());

        let mut store = ParameterStore::new();
        store.enqueue_submission("a", params.get("a"), v(&["1"]));
        store.enqueue_submission("b", params.get("b"), v(&["2"]));
        store.enqueue_submission("c", params.get("c"), v(&["3"]));

        let published = store.commit().unwrap();
        assert_eq!(published.len(), 3);
        assert_eq!(store.bindings().first("b"), Some("2"));
        assert_eq!(slot_a.first().as_deref(), Some("1"));
        assert_eq!(slot_c.first().as_deref(), Some("3"));

        let faults = store.take_faults();
        assert_eq!(faults.len(), 1);
        assert!(matches!(&faults[0], BindingError::Unavailable { name, .. } if name == "b"));
        assert!(store.take_faults().is_empty());
    }

    #[test]
    fn failed_validation_submits_no_binding() {
        let slot = Slot::new("a");
        let mut params = Parameters::new();
        params.parameter("a").bind_to(slot.clone());
        params
            .parameter("b")
            .transposed_by(Suffix("-long"))
            .bind_to(ShortOnly);

        let mut store = ParameterStore::new();
        store.enqueue_submission("a", params.get("a"), v(&["1"]));
        store.enqueue_submission("b", params.get("b"), v(&["2"]));
        assert!(store.commit().is_err());
        assert!(!slot.is_set());
        assert!(store.bindings().is_empty());
    }

    #[test]
    fn bindings_expand_reports_unbound() {
        let bindings: Bindings = [("lang".to_string(), v(&["en"]))].into_iter().collect();
        let p = Pattern::compile("/{lang}/{path}").unwrap();
        assert_eq!(bindings.expand(&p), Err(PlaceholderName::new("path")));
    }
}
