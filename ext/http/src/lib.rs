//! rewire-http: HTTP request context for rewrite rules
//!
//! This crate provides:
//!
//! 1. [`HttpRequest`] — an in-memory request with ordered, repeatable headers
//!    and request parameters
//! 2. Inputs and candidate sources over it ([`PathInput`], [`HeaderInput`],
//!    [`RequestParameters`], [`Headers`], ...)
//! 3. Condition constructors: [`Path`], [`Method`], [`Header`], [`RequestParameter`]
//!
//! # Example
//!
//! ```
//! use rewire_http::prelude::*;
//! use std::sync::Arc;
//!
//! let lookup = Arc::new(MapLookup::new().with_entry("de", "bibliothek", "library"));
//!
//! let mut condition = Path::matches("/{lang}/{path}").unwrap();
//! condition
//!     .parameter("path")
//!     .transposed_by(BundleTransposer::new(lookup, "lang"));
//!
//! let rules: RuleSet<HttpRequest, &str> =
//!     RuleSet::new(vec![Rule::new("localized", condition, "forward")]);
//!
//! let request = HttpRequest::builder().path("/de/bibliothek").build();
//! let outcome = rules.evaluate(&request).unwrap();
//! assert_eq!(outcome.bindings.first("path"), Some("library"));
//! ```

mod conditions;
mod inputs;
mod request;

pub use conditions::{Header, Method, Path, RequestParameter};
pub use inputs::{HeaderInput, Headers, MethodInput, PathInput, QueryParamInput, RequestParameters};
pub use request::{HttpRequest, HttpRequestBuilder};

#[cfg(feature = "registry")]
pub use inputs::NamedInputConfig;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Header, HeaderInput, Headers, HttpRequest, HttpRequestBuilder, Method, MethodInput, Path,
        PathInput, QueryParamInput, RequestParameter, RequestParameters,
    };
    pub use rewire::prelude::*;
}

/// Register all rewire-http types with the given builder.
///
/// Registers the core transposers and:
/// - `rewire.http.v1.PathInput` → [`PathInput`]
/// - `rewire.http.v1.MethodInput` → [`MethodInput`]
/// - `rewire.http.v1.HeaderInput` → [`HeaderInput`] (`{ name }`)
/// - `rewire.http.v1.QueryParamInput` → [`QueryParamInput`] (`{ name }`)
/// - `rewire.http.v1.RequestParameters` → [`RequestParameters`]
/// - `rewire.http.v1.Headers` → [`Headers`]
#[cfg(feature = "registry")]
#[must_use]
pub fn register(
    builder: rewire::RegistryBuilder<HttpRequest>,
) -> rewire::RegistryBuilder<HttpRequest> {
    rewire::register_core_transposers(builder)
        .input::<PathInput>("rewire.http.v1.PathInput")
        .input::<MethodInput>("rewire.http.v1.MethodInput")
        .input::<HeaderInput>("rewire.http.v1.HeaderInput")
        .input::<QueryParamInput>("rewire.http.v1.QueryParamInput")
        .source::<RequestParameters>("rewire.http.v1.RequestParameters")
        .source::<Headers>("rewire.http.v1.Headers")
}
