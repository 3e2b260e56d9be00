use http::HeaderMap;
use http::Method;

/// Signing context for one request.
///
/// A working copy of the parts that take part in signing. All header edits
/// land here first and are written back in one step by [`apply`], so a
/// failed signing attempt leaves the caller's request untouched.
///
/// [`apply`]: Self::apply
#[derive(Debug)]
pub(crate) struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// Path and query, verbatim as it appears on the request line.
    pub path_and_query: String,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &http::request::Parts) -> Self {
        // Requests without a path still sign the root path, like every
        // client library puts on the wire.
        let path = match parts.uri.path() {
            "" => "/",
            p => p,
        };
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };

        SigningRequest {
            method: parts.method.clone(),
            path_and_query,
            headers: parts.headers.clone(),
        }
    }

    /// Write the finalized headers back to http::request::Parts.
    pub fn apply(self, parts: &mut http::request::Parts) {
        parts.headers = self.headers;
    }
}
