//! Overlap-trimming merge of response fragments.
//!
//! Providers resuming a truncated answer often repeat the last few words
//! they already produced. Before a fragment is appended, the longest suffix
//! of the merged text that is also a prefix of the fragment is dropped from
//! the fragment. No other reconciliation is attempted.
//!
//! An overlap is only accepted when it starts on a word boundary of the
//! merged text (start of text, after whitespace, or the overlap itself
//! begins with whitespace), so `"I am"` + `"many"` stays `"I ammany"`
//! rather than collapsing the shared `m`.

/// Length in bytes of the overlap between `prior`'s tail and `fragment`'s head.
///
/// Narrower than a plain longest suffix/prefix match: an overlap starting
/// mid-word in `prior` is rejected, so `overlap_len("ab", "bc")` is `0` and
/// merging yields `"abbc"`. A whole-word overlap (`"brown"` after
/// `"quick brown"`) or one that begins with whitespace is still trimmed.
pub fn overlap_len(prior: &str, fragment: &str) -> usize {
    let max = prior.len().min(fragment.len());
    for k in (1..=max).rev() {
        if !fragment.is_char_boundary(k) {
            continue;
        }
        let start = prior.len() - k;
        if !prior.is_char_boundary(start) {
            continue;
        }
        let head = &fragment[..k];
        if &prior[start..] == head && starts_on_word_boundary(prior, start, head) {
            return k;
        }
    }
    0
}

fn starts_on_word_boundary(prior: &str, start: usize, overlap: &str) -> bool {
    if start == 0 || overlap.starts_with(char::is_whitespace) {
        return true;
    }
    prior[..start]
        .chars()
        .next_back()
        .is_some_and(char::is_whitespace)
}

/// The part of `fragment` that extends `prior`.
pub fn trim_overlap<'a>(prior: &str, fragment: &'a str) -> &'a str {
    &fragment[overlap_len(prior, fragment)..]
}

/// Append `fragment` to `prior` with the overlap removed.
pub fn merge(prior: &str, fragment: &str) -> String {
    let mut merged = String::with_capacity(prior.len() + fragment.len());
    merged.push_str(prior);
    merged.push_str(trim_overlap(prior, fragment));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_repeated_trailing_word() {
        let merged = merge("...the quick brown", "brown fox jumps");
        assert_eq!(merged, "...the quick brown fox jumps");
    }

    #[test]
    fn drops_longest_repeated_phrase() {
        let merged = merge("the quick brown", "quick brown fox");
        assert_eq!(merged, "the quick brown fox");
    }

    #[test]
    fn merging_against_empty_prior_is_identity() {
        let fragment = "A complete answer.";
        assert_eq!(merge("", fragment), fragment);
        assert_eq!(trim_overlap("", fragment), fragment);
    }

    #[test]
    fn no_overlap_appends_verbatim() {
        assert_eq!(merge("Hello", " world"), "Hello world");
        assert_eq!(overlap_len("Hello", " world"), 0);
    }

    #[test]
    fn mid_word_overlap_is_not_trimmed() {
        assert_eq!(overlap_len("I am", "many"), 0);
        assert_eq!(merge("I am", "many"), "I ammany");
    }

    #[test]
    fn single_character_mid_word_overlap_is_kept() {
        assert_eq!(overlap_len("ab", "bc"), 0);
        assert_eq!(merge("ab", "bc"), "abbc");
        // The same characters as a whole word are trimmed.
        assert_eq!(merge("a b", "b c"), "a b c");
    }

    #[test]
    fn leading_whitespace_overlap_is_trimmed() {
        assert_eq!(merge("quick brown", " brown fox"), "quick brown fox");
    }

    #[test]
    fn fragment_fully_repeated_contributes_nothing() {
        assert_eq!(merge("end of text", "text"), "end of text");
    }

    #[test]
    fn respects_multibyte_boundaries() {
        assert_eq!(merge("日本 語の", "語の文章"), "日本 語の文章");
        // Shared "é" sits mid-word, so it is kept.
        assert_eq!(merge("café", "é"), "caféé");
    }
}
