//! `DataInput` and `CandidateSource` — Domain-specific data extraction
//!
//! Conditions never look at a request directly. A [`DataInput`] pulls a single
//! string out of the context (a path, a method, one header), and a
//! [`CandidateSource`] lists named, multi-valued candidates (all headers, all
//! request parameters). Both are generic over the context type `Ctx`, so the same
//! conditions work for any domain that provides these two seams.

use std::fmt::Debug;

/// Extracts one string from a domain-specific context.
///
/// # Type Parameters
///
/// - `Ctx`: The context type this input operates on (e.g., `HttpRequest`)
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a rule set can be shared
/// across request-handling threads.
///
/// # Example
///
/// ```
/// use rewire::DataInput;
///
/// #[derive(Debug)]
/// struct Request { path: String }
///
/// #[derive(Debug)]
/// struct PathInput;
///
/// impl DataInput<Request> for PathInput {
///     fn get(&self, ctx: &Request) -> Option<String> {
///         Some(ctx.path.clone())
///     }
/// }
///
/// let req = Request { path: "/about".into() };
/// assert_eq!(PathInput.get(&req).as_deref(), Some("/about"));
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `DataInput<{Ctx}>`",
    label = "this type cannot extract data from `{Ctx}`",
    note = "DataInput<Ctx> extracts data from a specific context type",
    note = "ensure your input type implements DataInput for the correct context (e.g., DataInput<HttpRequest>)"
)]
pub trait DataInput<Ctx>: Send + Sync + Debug {
    /// Extract a value from the given context.
    ///
    /// Returns `None` if the value is not present. A condition whose input
    /// yields `None` evaluates to `false` without staging anything.
    fn get(&self, ctx: &Ctx) -> Option<String>;
}

#[diagnostic::do_not_recommend]
impl<Ctx> DataInput<Ctx> for Box<dyn DataInput<Ctx>> {
    fn get(&self, ctx: &Ctx) -> Option<String> {
        (**self).get(ctx)
    }
}

/// One named, multi-valued candidate borrowed from a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<'c> {
    /// The candidate's name (header name, parameter name, ...).
    pub name: &'c str,
    /// Values under that name, in source order.
    pub values: Vec<&'c str>,
}

impl<'c> Candidate<'c> {
    /// Create a candidate.
    #[must_use]
    pub fn new(name: &'c str, values: Vec<&'c str>) -> Self {
        Self { name, values }
    }
}

/// Lists the named candidates of a context, in a stable source order.
///
/// Used by [`CandidateCondition`](crate::CandidateCondition) to match a name
/// pattern and a value pattern over every header or request parameter.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `CandidateSource<{Ctx}>`",
    label = "this type cannot list candidates of `{Ctx}`"
)]
pub trait CandidateSource<Ctx>: Send + Sync + Debug {
    /// All candidates of the context, in source order.
    fn candidates<'c>(&self, ctx: &'c Ctx) -> Vec<Candidate<'c>>;
}

#[diagnostic::do_not_recommend]
impl<Ctx> CandidateSource<Ctx> for Box<dyn CandidateSource<Ctx>> {
    fn candidates<'c>(&self, ctx: &'c Ctx) -> Vec<Candidate<'c>> {
        (**self).candidates(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct TestContext {
        value: Option<String>,
        params: Vec<(String, Vec<String>)>,
    }

    #[derive(Debug)]
    struct ValueInput;

    impl DataInput<TestContext> for ValueInput {
        fn get(&self, ctx: &TestContext) -> Option<String> {
            ctx.value.clone()
        }
    }

    #[derive(Debug)]
    struct Params;

    impl CandidateSource<TestContext> for Params {
        fn candidates<'c>(&self, ctx: &'c TestContext) -> Vec<Candidate<'c>> {
            ctx.params
                .iter()
                .map(|(n, vs)| Candidate::new(n, vs.iter().map(String::as_str).collect()))
                .collect()
        }
    }

    #[test]
    fn test_data_input_basic() {
        let ctx = TestContext {
            value: Some("hello".to_string()),
            params: vec![],
        };
        let input: Box<dyn DataInput<TestContext>> = Box::new(ValueInput);
        assert_eq!(input.get(&ctx).as_deref(), Some("hello"));
    }

    #[test]
    fn test_candidate_source_keeps_order() {
        let ctx = TestContext {
            value: None,
            params: vec![
                ("b".into(), vec!["1".into()]),
                ("a".into(), vec!["2".into(), "3".into()]),
            ],
        };
        let got = Params.candidates(&ctx);
        assert_eq!(got[0], Candidate::new("b", vec!["1"]));
        assert_eq!(got[1], Candidate::new("a", vec!["2", "3"]));
    }

    #[test]
    fn test_seams_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn DataInput<TestContext>>>();
        assert_send_sync::<Box<dyn CandidateSource<TestContext>>>();
    }
}
