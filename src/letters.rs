//! Letter normalisation shared by every answer comparison

/// Uppercase alphabetic characters only; spaces, hyphens and punctuation are dropped.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Number of letters in `text` after cleaning
pub fn count(text: &str) -> usize {
    text.chars().filter(|c| c.is_alphabetic()).count()
}

/// Cleaned letters in sorted order, used for multiset comparisons
pub fn sorted(text: &str) -> Vec<char> {
    let mut letters: Vec<char> = clean(text).chars().collect();
    letters.sort_unstable();
    letters
}

/// Letter-normalised equality: `"de-cor"` matches `"DECOR"`.
pub fn matches(submitted: &str, expected: &str) -> bool {
    let submitted = clean(submitted);
    !submitted.is_empty() && submitted == clean(expected)
}

/// Reverse the cleaned letters of `text`
pub fn reversed(text: &str) -> String {
    clean(text).chars().rev().collect()
}

/// True when `needle` can be obtained from `haystack` by removing letters
/// without reordering the rest.
pub fn is_subsequence(needle: &str, haystack: &str) -> bool {
    let mut rest = haystack.chars();
    needle.chars().all(|n| rest.any(|h| h == n))
}

/// Count positions at which two equal-length strings differ.
///
/// Returns `None` when the lengths differ.
pub fn hamming(a: &str, b: &str) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(&b).filter(|(x, y)| x != y).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_punctuation() {
        assert_eq!(clean("de-cor, it's"), "DECORITS");
        assert_eq!(count("Is it?"), 4);
    }

    #[test]
    fn test_matches_ignores_case_and_spacing() {
        assert!(matches("is it", "ISIT"));
        assert!(!matches("", ""));
        assert!(!matches("isnt", "ISIT"));
    }

    #[test]
    fn test_subsequence() {
        assert!(is_subsequence("KEE", "KEEN"));
        assert!(is_subsequence("KEN", "KEEN"));
        assert!(!is_subsequence("NEK", "KEEN"));
    }

    #[test]
    fn test_hamming() {
        assert_eq!(hamming("CAT", "COT"), Some(1));
        assert_eq!(hamming("CAT", "CATS"), None);
    }
}
