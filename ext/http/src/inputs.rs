//! `DataInput` and `CandidateSource` implementations for `HttpRequest`.

use crate::HttpRequest;
use rewire::prelude::*;

/// Extracts the request path.
#[derive(Debug, Clone, Default)]
pub struct PathInput;

impl DataInput<HttpRequest> for PathInput {
    fn get(&self, ctx: &HttpRequest) -> Option<String> {
        Some(ctx.path().to_string())
    }
}

/// Extracts the HTTP method.
#[derive(Debug, Clone, Default)]
pub struct MethodInput;

impl DataInput<HttpRequest> for MethodInput {
    fn get(&self, ctx: &HttpRequest) -> Option<String> {
        Some(ctx.method().to_string())
    }
}

/// Extracts the first value of a header.
///
/// Header names are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct HeaderInput {
    name: String,
}

impl HeaderInput {
    /// Create a header input for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DataInput<HttpRequest> for HeaderInput {
    fn get(&self, ctx: &HttpRequest) -> Option<String> {
        ctx.header(&self.name).map(str::to_string)
    }
}

/// Extracts the first value of a request parameter.
#[derive(Debug, Clone)]
pub struct QueryParamInput {
    name: String,
}

impl QueryParamInput {
    /// Create a request parameter input for the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl DataInput<HttpRequest> for QueryParamInput {
    fn get(&self, ctx: &HttpRequest) -> Option<String> {
        ctx.parameter(&self.name).map(str::to_string)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Candidate sources
// ═══════════════════════════════════════════════════════════════════════════════

/// All request parameters, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct RequestParameters;

impl CandidateSource<HttpRequest> for RequestParameters {
    fn candidates<'c>(&self, ctx: &'c HttpRequest) -> Vec<Candidate<'c>> {
        ctx.parameters()
            .iter()
            .map(|(name, values)| Candidate::new(name, values.iter().map(String::as_str).collect()))
            .collect()
    }
}

/// All headers, grouped by lowercased name in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Headers;

impl CandidateSource<HttpRequest> for Headers {
    fn candidates<'c>(&self, ctx: &'c HttpRequest) -> Vec<Candidate<'c>> {
        let mut grouped: Vec<Candidate<'c>> = Vec::new();
        for (name, value) in ctx.headers() {
            match grouped.iter_mut().find(|c| c.name == name.as_str()) {
                Some(candidate) => candidate.values.push(value.as_str()),
                None => grouped.push(Candidate::new(name, vec![value.as_str()])),
            }
        }
        grouped
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry support (feature = "registry")
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "registry")]
mod registry {
    use super::*;
    use rewire::{ConfigError, IntoCandidateSource, IntoDataInput, UnitConfig};

    /// Configuration for [`HeaderInput`] and [`QueryParamInput`].
    #[derive(Debug, Clone, serde::Deserialize)]
    pub struct NamedInputConfig {
        /// Header or parameter name.
        pub name: String,
    }

    impl NamedInputConfig {
        fn into_name(self, kind: &str) -> Result<String, ConfigError> {
            if self.name.is_empty() {
                return Err(ConfigError::InvalidConfig {
                    reason: format!("{kind} name must not be empty"),
                });
            }
            Ok(self.name)
        }
    }

    impl IntoDataInput<HttpRequest> for PathInput {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig) -> Result<Box<dyn DataInput<HttpRequest>>, ConfigError> {
            Ok(Box::new(PathInput))
        }
    }

    impl IntoDataInput<HttpRequest> for MethodInput {
        type Config = UnitConfig;

        fn from_config(_: UnitConfig) -> Result<Box<dyn DataInput<HttpRequest>>, ConfigError> {
            Ok(Box::new(MethodInput))
        }
    }

    impl IntoDataInput<HttpRequest> for HeaderInput {
        type Config = NamedInputConfig;

        fn from_config(
            config: NamedInputConfig,
        ) -> Result<Box<dyn DataInput<HttpRequest>>, ConfigError> {
            Ok(Box::new(HeaderInput::new(config.into_name("header")?)))
        }
    }

    impl IntoDataInput<HttpRequest> for QueryParamInput {
        type Config = NamedInputConfig;

        fn from_config(
            config: NamedInputConfig,
        ) -> Result<Box<dyn DataInput<HttpRequest>>, ConfigError> {
            Ok(Box::new(QueryParamInput::new(config.into_name("query parameter")?)))
        }
    }

    impl IntoCandidateSource<HttpRequest> for RequestParameters {
        type Config = UnitConfig;

        fn from_config(
            _: UnitConfig,
        ) -> Result<Box<dyn CandidateSource<HttpRequest>>, ConfigError> {
            Ok(Box::new(RequestParameters))
        }
    }

    impl IntoCandidateSource<HttpRequest> for Headers {
        type Config = UnitConfig;

        fn from_config(
            _: UnitConfig,
        ) -> Result<Box<dyn CandidateSource<HttpRequest>>, ConfigError> {
            Ok(Box::new(Headers))
        }
    }
}

#[cfg(feature = "registry")]
pub use registry::NamedInputConfig;
