//! Grapheme-aware splitting of insert text
//!
//! Delta text lengths are counted in Unicode extended grapheme clusters
//! (UAX #29) — user-perceived characters — never in code points or UTF-8
//! bytes. A naive `chars().count()` split can sever a ZWJ emoji sequence,
//! a regional-indicator flag pair, or a combining accent from its base
//! character; this module is the one place that is allowed to know about
//! `unicode_segmentation`, so the rest of the crate only ever reasons in
//! grapheme counts.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the extended grapheme clusters in `s`
pub fn length(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Splits `s` at the grapheme boundary nearest index `n`
///
/// Returns `(left, right)` where `left` holds the first `n` graphemes of `s`
/// and `right` holds the remainder. If `n` is at or beyond the grapheme
/// count of `s`, `right` is empty. The split never falls inside a grapheme
/// cluster: `left` and `right` reconcatenated always equal `s`.
pub fn split(s: &str, n: usize) -> (String, String) {
    let boundary = byte_offset(s, n);
    (s[..boundary].to_string(), s[boundary..].to_string())
}

/// Returns the smallest prefix of `s` whose grapheme count is at least `n`
///
/// If the boundary at `n` would land mid-cluster, the prefix is extended to
/// the end of that cluster. If `n` meets or exceeds the grapheme count of
/// `s`, the whole string is returned. Used by `slice_max` so that a trailing
/// ZWJ sequence straddling the requested length is kept whole rather than
/// truncated.
pub fn take_max(s: &str, n: usize) -> String {
    let mut count = 0;
    let mut end = s.len();
    for (i, _) in s.grapheme_indices(true) {
        if count == n {
            end = i;
            break;
        }
        count += 1;
    }
    if count < n {
        end = s.len();
    }
    s[..end].to_string()
}

fn byte_offset(s: &str, n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut count = 0;
    for (i, _) in s.grapheme_indices(true) {
        if count == n {
            return i;
        }
        count += 1;
    }
    s.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_counts_graphemes_not_chars() {
        // Family emoji joined by ZWJ: one grapheme, several code points.
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        assert_eq!(length(family), 1);
    }

    #[test]
    fn split_keeps_zwj_sequence_whole() {
        let s = "01\u{1F6B5}\u{1F3FB}\u{200D}\u{2640}\u{FE0F}345";
        // graphemes: '0','1', the whole biking-woman ZWJ cluster, '3','4','5'
        let (left, right) = split(s, 2);
        assert_eq!(left, "01");
        assert_eq!(format!("{left}{right}"), s);

        let (left, right) = split(s, 3);
        assert_eq!(length(&left), 3);
        assert_eq!(format!("{left}{right}"), s);
    }

    #[test]
    fn split_past_end_returns_whole_string_and_empty_tail() {
        let (left, right) = split("hi", 10);
        assert_eq!(left, "hi");
        assert_eq!(right, "");
    }

    #[test]
    fn take_max_extends_to_cluster_boundary() {
        let s = "01\u{1F6B5}\u{1F3FB}\u{200D}\u{2640}\u{FE0F}345";
        // Requesting 2 graphemes lands exactly on a boundary: no extension needed.
        let prefix = take_max(s, 2);
        assert_eq!(prefix, "01");

        // Requesting 3 would split the cyclist cluster; it must be kept whole.
        let prefix = take_max(s, 3);
        assert_eq!(length(&prefix), 3);
        assert!(prefix.starts_with("01"));
    }

    #[test]
    fn take_max_with_n_at_or_beyond_length_returns_whole_string() {
        assert_eq!(take_max("hello", 5), "hello");
        assert_eq!(take_max("hello", 50), "hello");
    }
}
