use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

use crate::hash;
use crate::Error;

/// HMAC algorithm used to sign requests.
///
/// Kong's `hmac-auth` plugin accepts `hmac-sha1`, `hmac-sha256`,
/// `hmac-sha384` and `hmac-sha512`. The identifier is matched as a whole:
/// anything else is rejected up front instead of failing at signing time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Algorithm {
    /// HMAC with SHA1.
    HmacSha1,
    /// HMAC with SHA256. This is the default.
    #[default]
    HmacSha256,
    /// HMAC with SHA384.
    HmacSha384,
    /// HMAC with SHA512.
    HmacSha512,
}

impl Algorithm {
    /// Returns the identifier advertised in the `Authorization` header.
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::HmacSha1 => "hmac-sha1",
            Algorithm::HmacSha256 => "hmac-sha256",
            Algorithm::HmacSha384 => "hmac-sha384",
            Algorithm::HmacSha512 => "hmac-sha512",
        }
    }

    /// Base64 encoded HMAC of `content` under `key`.
    pub(crate) fn sign(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            Algorithm::HmacSha1 => hash::base64_hmac_sha1(key, content),
            Algorithm::HmacSha256 => hash::base64_hmac_sha256(key, content),
            Algorithm::HmacSha384 => hash::base64_hmac_sha384(key, content),
            Algorithm::HmacSha512 => hash::base64_hmac_sha512(key, content),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hmac-sha1" => Ok(Algorithm::HmacSha1),
            "hmac-sha256" => Ok(Algorithm::HmacSha256),
            "hmac-sha384" => Ok(Algorithm::HmacSha384),
            "hmac-sha512" => Ok(Algorithm::HmacSha512),
            _ => Err(Error::unsupported_algorithm(format!(
                "algorithm {s} is not supported"
            ))),
        }
    }
}
