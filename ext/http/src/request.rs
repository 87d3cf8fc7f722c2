//! In-memory `HttpRequest` context.
//!
//! Headers and request parameters keep their arrival order and may repeat,
//! the way a servlet container presents them. No I/O, no decoding beyond
//! splitting the query string.

/// An HTTP request as seen by rewrite rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    parameters: Vec<(String, Vec<String>)>,
}

impl HttpRequest {
    /// Create a builder for `HttpRequest`.
    #[must_use]
    pub fn builder() -> HttpRequestBuilder {
        HttpRequestBuilder::default()
    }

    /// Get the HTTP method.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get the request path (without query string).
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value of a header (name is case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in arrival order.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Header entries in arrival order; names are lowercased.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of a request parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a request parameter.
    #[must_use]
    pub fn parameter_values(&self, name: &str) -> Option<&[String]> {
        self.parameters
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Request parameters in first-seen order, values grouped by name.
    #[must_use]
    pub fn parameters(&self) -> &[(String, Vec<String>)] {
        &self.parameters
    }

    fn push_parameter(&mut self, name: String, value: String) {
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.parameters.push((name, vec![value])),
        }
    }
}

/// Builder for `HttpRequest`.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    request: HttpRequest,
}

impl Default for HttpRequestBuilder {
    fn default() -> Self {
        Self {
            request: HttpRequest {
                method: "GET".to_string(),
                path: "/".to_string(),
                ..HttpRequest::default()
            },
        }
    }
}

impl HttpRequestBuilder {
    /// Set the HTTP method (stored uppercase).
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.request.method = method.into().to_ascii_uppercase();
        self
    }

    /// Set the request path.
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.request.path = path.into();
        self
    }

    /// Set path and parameters from a request target such as `/search?q=a&q=b`.
    ///
    /// Pairs without `=` become parameters with an empty value.
    #[must_use]
    pub fn target(mut self, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        self.request.path = path.to_string();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.request
                .push_parameter(name.to_string(), value.to_string());
        }
        self
    }

    /// Add a header (name is lowercased).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request
            .headers
            .push((name.into().to_ascii_lowercase(), value.into()));
        self
    }

    /// Add one value of a request parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.push_parameter(name.into(), value.into());
        self
    }

    /// Build the `HttpRequest`.
    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.request
    }
}
