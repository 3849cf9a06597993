//! Glob-style wildcard matching.
//!
//! Two metacharacters are recognized:
//! - `*` matches any run of zero or more characters
//! - `?` matches exactly one character
//!
//! Matching works on Unicode code points, so a multi-byte character is a
//! single matchable unit. There is no escape character.
//!
//! ```
//! assert!(wildcard::matches("adceb", "*a*b"));
//! assert!(!wildcard::matches("acdcb", "a*c?b"));
//! ```

mod pattern;

pub use pattern::Pattern;

/// Tests whether `subject` as a whole matches `pattern`.
///
/// This is a total function: any pair of strings, including empty ones,
/// yields a boolean. Runtime is bounded by `O(len(subject) * len(pattern))`.
#[inline]
pub fn matches(subject: &str, pattern: &str) -> bool {
    Pattern::new(pattern).matches(subject)
}

/// Tests whether `subject` matches any of `patterns`.
pub fn matches_any<I, P>(subject: &str, patterns: I) -> bool
where
    I: IntoIterator<Item = P>,
    P: AsRef<str>,
{
    patterns.into_iter().any(|p| matches(subject, p.as_ref()))
}
