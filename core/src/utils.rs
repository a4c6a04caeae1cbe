//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a credential for `Debug` output.
///
/// - Empty values render as `EMPTY`.
/// - Values shorter than 12 characters are fully hidden.
/// - Longer values keep their first and last three characters, so different
///   keys stay distinguishable in logs.
pub struct Redact<'a>(&'a str);

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
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = self.0;
        match value.len() {
            0 => f.write_str("EMPTY"),
            n if n < 12 || !value.is_char_boundary(3) || !value.is_char_boundary(n - 3) => {
                f.write_str("***")
            }
            n => write!(f, "{}***{}", &value[..3], &value[n - 3..]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", "EMPTY"; "empty")]
    #[test_case("Short", "***"; "short")]
    #[test_case("HelloWorld", "***"; "eleven chars")]
    #[test_case("Hello World!", "Hel***ld!"; "twelve chars")]
    #[test_case("czNjcjN0czNjcjN0czNjcjN0", "czN***jN0"; "base64 secret")]
    fn test_redact(input: &str, expected: &str) {
        assert_eq!(format!("{:?}", Redact::from(input)), expected);
    }
}
