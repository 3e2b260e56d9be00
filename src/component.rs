use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

use http::header::HeaderName;

use crate::Error;

/// A component of the string to sign.
///
/// Components are configured by name and signed in the configured order.
/// `date`, `request-line` and `digest` carry special handling; any other
/// name selects a request header verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SigningComponent {
    /// The `Date` header. Inserted with the current time when absent.
    Date,
    /// The request line, `<METHOD> <path-and-query> HTTP/1.1`.
    RequestLine,
    /// The `Digest` header. Computed from the request body; skipped for
    /// this call when there is no body to digest.
    Digest,
    /// Any other request header, looked up case insensitively.
    Header(HeaderName),
}

impl SigningComponent {
    /// Returns the lowercase name advertised in the `headers="..."` field.
    pub fn as_str(&self) -> &str {
        match self {
            SigningComponent::Date => "date",
            SigningComponent::RequestLine => "request-line",
            SigningComponent::Digest => "digest",
            SigningComponent::Header(name) => name.as_str(),
        }
    }
}

impl Display for SigningComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SigningComponent {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "date" => Ok(SigningComponent::Date),
            "request-line" => Ok(SigningComponent::RequestLine),
            "digest" => Ok(SigningComponent::Digest),
            // HeaderName rejects names that can't appear on the wire and
            // stores custom names lowercased.
            other => Ok(SigningComponent::Header(HeaderName::from_str(other)?)),
        }
    }
}
