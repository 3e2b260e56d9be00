//! Utility functions and types.

use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// Redacts a string down to its first and last three characters.
///
/// Strings shorter than 12 characters are masked entirely so that the
/// length of short secrets cannot be narrowed down. The masked form still
/// lets users tell two different secrets apart in logs.
pub(crate) struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // Counted in characters, not bytes, so multibyte secrets never
        // split mid character.
        let n = self.0.chars().count();
        if n == 0 {
            return f.write_str("EMPTY");
        }
        if n < 12 {
            return f.write_str("***");
        }

        for c in self.0.chars().take(3) {
            write!(f, "{c}")?;
        }
        f.write_str("***")?;
        for c in self.0.chars().skip(n - 3) {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        let cases = vec![
            ("", "EMPTY"),
            ("Short", "***"),
            ("elevenchars", "***"),
            ("opensesame12", "ope***e12"),
            ("correct-horse-battery", "cor***ery"),
            ("pässwörter-änderung", "päs***ung"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                format!("{:?}", Redact(input)),
                expected,
                "Failed on input: {}",
                input
            );
        }
    }
}
