use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use memchr::memchr2;

/// A compiled wildcard pattern.
///
/// Patterns are created from strings containing wildcard characters:
/// - `*` matches zero or more characters
/// - `?` matches exactly one character (a Unicode code point)
///
/// All other characters, including `\`, match themselves.
///
/// # Examples
///
/// ```
/// use wildcard::Pattern;
///
/// let pattern = Pattern::new("*.txt");
/// assert!(pattern.matches("readme.txt"));
/// assert!(!pattern.matches("readme.md"));
///
/// let pattern = Pattern::new("test?.log");
/// assert!(pattern.matches("test1.log"));
/// assert!(!pattern.matches("test.log"));
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pattern {
    raw: String,
    tokens: Vec<Token>,
    literal: bool,
}

impl Pattern {
    /// Creates a new pattern from a string.
    ///
    /// This function is infallible; all input strings are valid patterns.
    /// Runs of consecutive `*` are collapsed into one, which does not change
    /// what the pattern matches.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let literal = memchr2(b'*', b'?', raw.as_bytes()).is_none();
        let tokens = if literal { Vec::new() } else { compile(&raw) };
        Self { raw, tokens, literal }
    }

    /// Returns the pattern text this pattern was created from.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` if the pattern has no metacharacters.
    pub fn is_literal(&self) -> bool {
        self.literal
    }

    /// Tests whether the pattern matches the given text.
    ///
    /// Returns `true` if the entire text matches the pattern, `false` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use wildcard::Pattern;
    ///
    /// let pattern = Pattern::new("??");
    /// assert!(pattern.matches("ab"));
    /// assert!(pattern.matches("🦀🎉"));
    /// assert!(!pattern.matches("a"));
    ///
    /// let pattern = Pattern::new("m??*ss*?i*pi");
    /// assert!(!pattern.matches("mississippi"));
    /// ```
    pub fn matches(&self, text: &str) -> bool {
        if self.literal {
            return text == self.raw;
        }
        if self.rejects_tail(text) {
            return false;
        }
        self.table_match(text)
    }

    // A literal last token must equal the last character of the text.
    #[inline]
    fn rejects_tail(&self, text: &str) -> bool {
        match (self.tokens.last(), text.chars().next_back()) {
            (Some(Token::Char(last)), Some(ch)) => *last != ch,
            _ => false,
        }
    }

    /// Fills the match table row by row.
    ///
    /// `row[j]` holds whether the text consumed so far matches the first `j`
    /// tokens. Only the previous row is needed to compute the next one, so a
    /// single row is updated in place, keeping the diagonal in `diag`.
    fn table_match(&self, text: &str) -> bool {
        let tokens = &self.tokens;
        let mut row = Vec::with_capacity(tokens.len() + 1);

        // Empty text matches a prefix of tokens only while they are all `*`.
        row.push(true);
        for (j, token) in tokens.iter().enumerate() {
            row.push(*token == Token::Any && row[j]);
        }

        for ch in text.chars() {
            let mut diag = row[0];
            row[0] = false;
            let mut any = false;
            for (j, token) in tokens.iter().enumerate() {
                let up = row[j + 1];
                let value = match *token {
                    Token::Any => row[j] || up,
                    Token::One => diag,
                    Token::Char(c) => diag && c == ch,
                };
                diag = up;
                row[j + 1] = value;
                any |= value;
            }
            if !any {
                return false;
            }
        }

        row[tokens.len()]
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Pattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Pattern {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Pattern {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Token {
    Any,
    One,
    Char(char),
}

fn compile(raw: &str) -> Vec<Token> {
    let mut tokens = Vec::with_capacity(raw.len());
    for ch in raw.chars() {
        let token = match ch {
            '*' => Token::Any,
            '?' => Token::One,
            _ => Token::Char(ch),
        };
        if token == Token::Any && tokens.last() == Some(&Token::Any) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

#[cfg(test)]
mod tests;
