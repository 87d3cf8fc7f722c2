//! Rules — condition trees paired with actions
//!
//! A [`Rule`] fires when its condition tree succeeds *and* the staged values
//! commit. A [`RuleSet`] evaluates its rules in order against one request,
//! either stopping at the first rule that fires ([`RuleSet::evaluate`]) or
//! running every rule ([`RuleSet::evaluate_all`]).
//!
//! Staging is per rule: each rule starts from an empty staging buffer. Committed
//! bindings are per request: what an earlier rule committed stays visible to later
//! transposers and to the caller, and a later commit of the same name replaces it.

use crate::{
    Bindings, Condition, ConfigError, ParameterStore, MAX_CONDITIONS_PER_COMPOUND, MAX_DEPTH,
    MAX_RULES,
};
use std::fmt::Debug;

/// A condition tree and the action to run when it fires.
pub struct Rule<Ctx, A> {
    id: String,
    condition: Condition<Ctx>,
    action: A,
}

impl<Ctx, A> Rule<Ctx, A> {
    /// Create a rule.
    pub fn new(id: impl Into<String>, condition: impl Into<Condition<Ctx>>, action: A) -> Self {
        Self {
            id: id.into(),
            condition: condition.into(),
            action,
        }
    }

    /// The rule's identifier, used in logs and outcomes.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The condition tree.
    #[must_use]
    pub fn condition(&self) -> &Condition<Ctx> {
        &self.condition
    }

    /// The action.
    #[must_use]
    pub fn action(&self) -> &A {
        &self.action
    }

    /// Evaluate the condition and commit on success.
    ///
    /// Returns what the commit published, or `None` if the condition failed or
    /// the commit was refused. Either way the staging buffer is empty afterwards.
    pub fn evaluate(&self, ctx: &Ctx, store: &mut ParameterStore) -> Option<Bindings> {
        store.rollback();
        if !self.condition.evaluate(ctx, store) {
            store.rollback();
            return None;
        }
        match store.commit() {
            Ok(published) => Some(published),
            Err(error) => {
                tracing::warn!(rule = %self.id, %error, "commit refused, rule does not fire");
                None
            }
        }
    }
}

impl<Ctx, A: Debug> Debug for Rule<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("condition", &self.condition)
            .field("action", &self.action)
            .finish()
    }
}

/// A rule that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<A> {
    /// Identifier of the rule.
    pub rule_id: String,
    /// The rule's action.
    pub action: A,
    /// Values published by the rule's commit.
    pub bindings: Bindings,
}

/// An ordered list of rules.
///
/// # INV: First-match-wins
///
/// [`evaluate`](Self::evaluate) stops at the first rule that fires, even if a
/// later rule would also fire.
pub struct RuleSet<Ctx, A> {
    rules: Vec<Rule<Ctx, A>>,
}

impl<Ctx, A: Clone> RuleSet<Ctx, A> {
    /// Create a rule set.
    #[must_use]
    pub fn new(rules: Vec<Rule<Ctx, A>>) -> Self {
        Self { rules }
    }

    /// Append a rule.
    pub fn push(&mut self, rule: Rule<Ctx, A>) {
        self.rules.push(rule);
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule<Ctx, A>] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if there are no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check the rule set against the safety limits.
    ///
    /// Call this at load time. Checks:
    /// - at most [`MAX_RULES`] rules
    /// - condition nesting at most [`MAX_DEPTH`]
    /// - at most [`MAX_CONDITIONS_PER_COMPOUND`] children per `And`/`Or`
    ///
    /// # Errors
    ///
    /// Returns the first limit that is exceeded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.len() > MAX_RULES {
            return Err(ConfigError::TooManyRules {
                count: self.rules.len(),
                max: MAX_RULES,
            });
        }
        for rule in &self.rules {
            let depth = rule.condition.depth();
            if depth > MAX_DEPTH {
                return Err(ConfigError::DepthExceeded {
                    depth,
                    max: MAX_DEPTH,
                });
            }
            let width = rule.condition.max_width();
            if width > MAX_CONDITIONS_PER_COMPOUND {
                return Err(ConfigError::TooManyConditions {
                    count: width,
                    max: MAX_CONDITIONS_PER_COMPOUND,
                });
            }
        }
        Ok(())
    }

    /// Evaluate against a fresh store and return the first rule that fires.
    pub fn evaluate(&self, ctx: &Ctx) -> Option<Outcome<A>> {
        self.evaluate_with(ctx, &mut ParameterStore::new())
    }

    /// Evaluate against the caller's store and return the first rule that fires.
    ///
    /// Use this when the request is a postback or deferred bindings must be
    /// flushed afterwards.
    pub fn evaluate_with(&self, ctx: &Ctx, store: &mut ParameterStore) -> Option<Outcome<A>> {
        self.rules.iter().find_map(|rule| fire(rule, ctx, store))
    }

    /// Evaluate every rule in order and return each one that fired.
    pub fn evaluate_all(&self, ctx: &Ctx, store: &mut ParameterStore) -> Vec<Outcome<A>> {
        self.rules
            .iter()
            .filter_map(|rule| fire(rule, ctx, store))
            .collect()
    }
}

fn fire<Ctx, A: Clone>(
    rule: &Rule<Ctx, A>,
    ctx: &Ctx,
    store: &mut ParameterStore,
) -> Option<Outcome<A>> {
    let bindings = rule.evaluate(ctx, store)?;
    tracing::debug!(rule = %rule.id, bound = bindings.len(), "rule fired");
    Some(Outcome {
        rule_id: rule.id.clone(),
        action: rule.action.clone(),
        bindings,
    })
}

impl<Ctx, A> Default for RuleSet<Ctx, A> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<Ctx, A: Debug> Debug for RuleSet<Ctx, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("rules_len", &self.rules.len())
            .finish()
    }
}
