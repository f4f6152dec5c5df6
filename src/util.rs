// src/util.rs — Small text helpers shared by the loop and front ends

/// Truncate a string for display/logging (UTF-8 safe).
///
/// The cut point is moved back to the nearest character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Whitespace-separated word count.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_str("essay", 10), "essay");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_str("an essay on rivers", 8), "an essay");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "naïve" is 6 bytes (ï = 2 bytes); cutting at 3 must not split ï
        assert_eq!(truncate_str("naïve", 3), "na");
    }

    #[test]
    fn test_truncate_zero_max() {
        assert_eq!(truncate_str("essay", 0), "");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("Short essay."), 2);
        assert_eq!(word_count("  one\ntwo\t three  "), 3);
    }
}
