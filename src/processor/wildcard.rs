/// Matches `text` against a pattern with at most one edge-anchored `*`.
///
/// - `"abc"` matches exactly `"abc"` (case-sensitive)
/// - `"*abc"` matches any text ending in `"abc"`
/// - `"abc*"` matches any text starting with `"abc"`
/// - `"*"` matches everything
///
/// A `*` anywhere else, or more than one `*`, never matches.
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    let Some(star) = pattern.find('*') else {
        return text == pattern;
    };

    if pattern[star + 1..].contains('*') {
        return false;
    }

    if star == 0 {
        return text.ends_with(&pattern[1..]);
    }

    if star == pattern.len() - 1 {
        return text.starts_with(&pattern[..star]);
    }

    false
}

/// True if `text` matches any of `patterns`
pub fn matches_any<'a, I>(text: &str, patterns: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    patterns
        .into_iter()
        .any(|pattern| wildcard_match(text, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact() {
        assert!(wildcard_match("Toyota", "Toyota"));
        assert!(!wildcard_match("toyota", "Toyota"));
        assert!(!wildcard_match("Toyota Corolla", "Toyota"));
        assert!(wildcard_match("", ""));
    }

    #[test]
    fn test_prefix() {
        assert!(wildcard_match("Toyota", "Toy*"));
        assert!(wildcard_match("Toy", "Toy*"));
        assert!(!wildcard_match("Honda", "Toy*"));
        assert!(!wildcard_match("To", "Toy*"));
    }

    #[test]
    fn test_suffix() {
        assert!(wildcard_match("Corolla", "*olla"));
        assert!(wildcard_match("olla", "*olla"));
        assert!(!wildcard_match("Civic", "*olla"));
        assert!(!wildcard_match("lla", "*olla"));
    }

    #[test]
    fn test_bare_star() {
        for text in ["", "a", "anything at all", "*"] {
            assert!(wildcard_match(text, "*"));
        }
    }

    #[test]
    fn test_interior_and_multiple_stars() {
        for text in ["Toyota", "To*ta", "", "*a*", "a*b*c"] {
            assert!(!wildcard_match(text, "To*ta"));
            assert!(!wildcard_match(text, "*a*"));
            assert!(!wildcard_match(text, "**"));
            assert!(!wildcard_match(text, "a*b*c"));
        }
    }

    #[test]
    fn test_multibyte() {
        assert!(wildcard_match("Škoda", "Š*"));
        assert!(wildcard_match("Citroën", "*ën"));
        assert!(!wildcard_match("Citroën", "Ci*ën"));
    }

    #[test]
    fn test_matches_any() {
        let patterns = vec!["Toy*".to_string(), "Honda".to_string()];
        assert!(matches_any("Toyota", &patterns));
        assert!(matches_any("Honda", &patterns));
        assert!(!matches_any("Ford", &patterns));
        assert!(!matches_any("Ford", &Vec::<String>::new()));
    }
}
