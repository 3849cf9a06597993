use rstest::rstest;

use super::*;

fn check(subject: &str, pattern: &str) -> bool {
    Pattern::new(pattern).matches(subject)
}

/// Straightforward recursive matcher used as a reference.
fn reference(subject: &[char], pattern: &[char]) -> bool {
    match (subject.split_first(), pattern.split_first()) {
        (None, None) => true,
        (Some(_), None) => false,
        (None, Some(_)) => pattern.iter().all(|&c| c == '*'),
        (Some((s, srest)), Some((p, prest))) => match p {
            '*' => reference(subject, prest) || reference(srest, pattern),
            '?' => reference(srest, prest),
            _ => s == p && reference(srest, prest),
        },
    }
}

/// All strings over `alphabet` with length up to `max_len`.
fn strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut result = vec![String::new()];
    let mut layer = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::with_capacity(layer.len() * alphabet.len());
        for prefix in &layer {
            for &ch in alphabet {
                let mut s = prefix.clone();
                s.push(ch);
                next.push(s);
            }
        }
        result.extend(next.iter().cloned());
        layer = next;
    }
    result
}

#[test]
fn test_pattern_parsing_literal() {
    let p = Pattern::new("hello");
    assert!(p.is_literal());
    assert!(p.tokens.is_empty());
    assert_eq!(p.as_str(), "hello");
}

#[test]
fn test_pattern_parsing_collapses_asterisks() {
    let p = Pattern::new("a***b**");
    assert!(!p.is_literal());
    assert_eq!(
        p.tokens,
        vec![Token::Char('a'), Token::Any, Token::Char('b'), Token::Any]
    );
}

#[test]
fn test_pattern_parsing_mixed_wildcards() {
    let p = Pattern::new("?*?");
    assert_eq!(p.tokens, vec![Token::One, Token::Any, Token::One]);
}

#[test]
fn test_pattern_parsing_backslash_is_literal() {
    let p = Pattern::new(r"foo\*");
    assert_eq!(
        p.tokens,
        vec![Token::Char('f'), Token::Char('o'), Token::Char('o'), Token::Char('\\'), Token::Any]
    );
}

#[test]
fn test_display_round_trips_raw_text() {
    for raw in ["", "*", "a**b?", r"C:\logs\*.txt"] {
        assert_eq!(Pattern::new(raw).to_string(), raw);
    }
}

#[test]
fn test_from_str() {
    let p: Pattern = "*.rs".parse().unwrap();
    assert!(p.matches("lib.rs"));
    assert_eq!(Pattern::from("*.rs"), p);
    assert_eq!(Pattern::from(String::from("*.rs")), p);
}

#[test]
fn test_default_is_empty_pattern() {
    let p = Pattern::default();
    assert_eq!(p, Pattern::new(""));
    assert!(p.matches(""));
    assert!(!p.matches("a"));
}

#[rstest]
#[case("aa", "aa", true)]
#[case("aaaa", "*", true)]
#[case("ab", "a?", true)]
#[case("adceb", "*a*b", true)]
#[case("aa", "a", false)]
#[case("mississippi", "m??*ss*?i*pi", false)]
#[case("acdcb", "a*c?b", false)]
fn test_scenarios(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
    assert_eq!(crate::matches(subject, pattern), expected);
}

#[rstest]
#[case("hello", "hello", true)]
#[case("world", "hello", false)]
#[case("hell", "hello", false)]
#[case("helloo", "hello", false)]
fn test_exact_match(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case("")]
#[case("anything")]
#[case("multiple words")]
#[case("🦀")]
fn test_asterisk_match_any(#[case] subject: &str) {
    assert!(check(subject, "*"));
    assert!(check(subject, "***"));
}

#[rstest]
#[case("", true)]
#[case("*", true)]
#[case("**", true)]
#[case("?", false)]
#[case("*?", false)]
#[case("a", false)]
#[case("*a*", false)]
fn test_empty_subject(#[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check("", pattern), expected);
}

#[rstest]
#[case("", "", true)]
#[case("anything", "", false)]
#[case("a", "", false)]
fn test_empty_pattern(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case("world", "*world", true)]
#[case("hello world", "*world", true)]
#[case("world!", "*world", false)]
#[case("hello", "hello*", true)]
#[case("hello world", "hello*", true)]
#[case("xhello", "hello*", false)]
#[case("foobar", "foo*bar", true)]
#[case("foo and bar", "foo*bar", true)]
#[case("foobarx", "foo*bar", false)]
#[case("barfoo", "*foo*bar*", false)]
#[case("prefix foo middle bar suffix", "*foo*bar*", true)]
fn test_asterisk_positions(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case("a", "?", true)]
#[case("", "?", false)]
#[case("ab", "?", false)]
#[case("abc", "???", true)]
#[case("ab", "???", false)]
#[case("abc", "a?c", true)]
#[case("ac", "a?c", false)]
#[case("aXbYc", "a*b?c", true)]
#[case("abc", "a*b?c", false)]
fn test_question_mark(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case("ä", "?", true)]
#[case("世", "?", true)]
#[case("🔥", "?", true)]
#[case("äöü", "???", true)]
#[case("世界語", "???", true)]
#[case("🔥💧🌊", "???", true)]
#[case("🔥💧", "?", false)]
#[case("日本語.txt", "*.txt", true)]
#[case("日本語.txt", "日*語?txt", true)]
#[case("日本語", "日?本*", false)]
fn test_utf8_code_points(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case(r"\", r"\", true)]
#[case(r"a\b", r"a\?", true)]
#[case(r"ab", r"a\?", false)]
#[case(r"a\b", r"a\b", true)]
#[case(r"C:\logs\app.log", r"C:\logs\*.log", true)]
fn test_backslash_is_not_an_escape(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[rstest]
#[case("/home/u/src/.git", "*/.git", true)]
#[case("/home/u/src/.github", "*/.git", false)]
#[case("/home/u/node_modules", "*/node_modules", true)]
#[case("/tmp/1.x/a", "*/1.x/*", true)]
#[case("/usr/local", "*/usr*", true)]
#[case("/opt/share/doc", "*/share", false)]
fn test_path_excludes(#[case] subject: &str, #[case] pattern: &str, #[case] expected: bool) {
    assert_eq!(check(subject, pattern), expected);
}

#[test]
fn test_tail_reject_agrees_with_table() {
    let p = Pattern::new("*a");
    assert!(p.rejects_tail("bab"));
    assert!(!p.table_match("bab"));
    assert!(!p.rejects_tail("ba"));
    assert!(p.table_match("ba"));

    let p = Pattern::new("a*");
    assert!(!p.rejects_tail("xyz"));
}

#[test]
fn test_agrees_with_reference_exhaustively() {
    let subjects = strings(&['a', 'b'], 5);
    let patterns = strings(&['a', 'b', '*', '?'], 4);
    for p in &patterns {
        let compiled = Pattern::new(p.as_str());
        let pc: Vec<char> = p.chars().collect();
        for s in &subjects {
            let sc: Vec<char> = s.chars().collect();
            assert_eq!(
                compiled.matches(s),
                reference(&sc, &pc),
                "subject={s:?} pattern={p:?}"
            );
        }
    }
}

#[test]
fn test_agrees_with_wildmatch() {
    let subjects = strings(&['x', 'y', 'é'], 4);
    let patterns = strings(&['x', 'é', '*', '?'], 4);
    for p in &patterns {
        let ours = Pattern::new(p.as_str());
        let theirs = wildmatch::WildMatch::new(p);
        for s in &subjects {
            assert_eq!(ours.matches(s), theirs.matches(s), "subject={s:?} pattern={p:?}");
        }
    }
}

#[test]
fn test_redundant_asterisks_do_not_change_result() {
    let subjects = strings(&['a', 'b'], 4);
    for (many, one) in [("a**b", "a*b"), ("***a?", "*a?"), ("?**?**", "?*?*")] {
        let (many, one) = (Pattern::new(many), Pattern::new(one));
        for s in &subjects {
            assert_eq!(many.matches(s), one.matches(s), "subject={s:?}");
        }
    }
}

#[test]
fn test_literal_pattern_is_equality() {
    for s in strings(&['a', 'b'], 3) {
        for p in strings(&['a', 'b'], 3) {
            assert_eq!(check(&s, &p), s == p, "subject={s:?} pattern={p:?}");
        }
    }
}

#[test]
fn test_adversarial_input_is_fast() {
    let subject = "a".repeat(2000);
    let pattern = format!("{}b", "*a".repeat(200));
    let start = std::time::Instant::now();
    assert!(!check(&subject, &pattern));
    let pattern = format!("{}?b?", "*a".repeat(200));
    assert!(!check(&subject, &pattern));
    let pattern = format!("{}*", "*a".repeat(200));
    assert!(check(&subject, &pattern));
    assert!(start.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn test_pattern_is_shareable_between_threads() {
    let pattern = std::sync::Arc::new(Pattern::new("*.log"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let pattern = pattern.clone();
            std::thread::spawn(move || pattern.matches(&format!("app-{i}.log")))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

#[test]
fn test_matches_any() {
    assert!(crate::matches_any("/a/.git", ["*/node_modules", "*/.git"]));
    assert!(!crate::matches_any("/a/src", ["*/node_modules", "*/.git"]));
    assert!(!crate::matches_any("/a/src", Vec::<String>::new()));
}
