use std::fmt;
use std::fmt::Display;
use std::str::FromStr;

use crate::Error;
use crate::Result;

/// Charset used to encode the secret and the string to sign before hashing.
///
/// Rust strings are always valid UTF-8, so `utf-8` encoding never fails.
/// `us-ascii` fails with an encoding error when the text carries non ASCII
/// characters; the error is surfaced, never papered over with replacement
/// characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Charset {
    /// UTF-8. This is the default.
    #[default]
    Utf8,
    /// US-ASCII.
    Ascii,
}

impl Charset {
    /// Returns the canonical identifier of this charset.
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Ascii => "us-ascii",
        }
    }

    /// Encode text under this charset.
    pub(crate) fn encode<'a>(&self, content: &'a str) -> Result<&'a [u8]> {
        match self {
            Charset::Utf8 => Ok(content.as_bytes()),
            Charset::Ascii if content.is_ascii() => Ok(content.as_bytes()),
            Charset::Ascii => Err(Error::encoding(format!(
                "content cannot be represented in {self}"
            ))),
        }
    }
}

impl Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "us-ascii" | "ascii" => Ok(Charset::Ascii),
            _ => Err(Error::config_invalid(format!("charset {s} is not known"))),
        }
    }
}
