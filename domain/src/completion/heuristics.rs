//! Heuristic truncation detection.
//!
//! Pure checks over the full accumulated text. Any signal means the text
//! looks cut off; no signal is a "complete" vote.
//!
//! Checks run in this order, first hit wins:
//!
//! 1. empty text
//! 2. trailing conjunction/preposition (`... and`, `... such as`)
//! 3. trailing `,` `;` `:` or detached ellipsis
//! 4. unterminated code fence
//! 5. unbalanced `()` `[]` `{}` (a closer before its opener counts)
//! 6. odd number of double quotes
//! 7. last sentence longer than five characters with no terminal punctuation
//!
//! Single quotes are not counted: apostrophes make them meaningless.
//!
//! Line-oriented list patterns are intentionally not checked: a trailing
//! numbered item (`2. foo`) or bullet (`- foo`) is only flagged through the
//! abrupt ending check, and a bare marker such as `2.` or `-` on the last
//! line is not flagged at all.

use super::verdict::{CompletionVerdict, HeuristicSignal, VerdictReason};

/// Words that cannot end a finished sentence. Matched case-sensitively.
const DANGLING_WORDS: &[&str] = &[
    "and",
    "or",
    "but",
    "nor",
    "yet",
    "so",
    "because",
    "then",
    "that",
    "which",
    "who",
    "whose",
    "whom",
    "additionally",
    "including",
    "with",
    "without",
    "to",
    "of",
    "for",
    "in",
    "on",
    "at",
    "by",
    "from",
    "into",
    "onto",
    "about",
    "as",
    "than",
    "if",
    "while",
    "the",
    "a",
    "an",
];

const DANGLING_PHRASES: &[&str] = &["for example", "for instance", "such as"];

const DANGLING_PUNCTUATION: &[char] = &[',', ';', ':', '，', '、', '；', '：'];

/// Characters that may legitimately end an answer.
const TERMINAL_CHARS: &[char] = &[
    '.', '!', '?', '…', '。', '！', '？', ')', ']', '}', '"', '\'', '`', '*', '_', '|', '>', '”',
    '’', '»',
];

const BRACKET_PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];

/// Minimum length of an unpunctuated last sentence that counts as cut off.
const ABRUPT_TAIL_CHARS: usize = 5;

/// Run the heuristic pass and turn its result into a verdict.
///
/// A complete vote carries [`VerdictReason::Balanced`].
pub fn evaluate_heuristics(text: &str) -> CompletionVerdict {
    match detect_truncation(text) {
        Some(signal) => CompletionVerdict::incomplete(VerdictReason::HeuristicIncomplete(signal)),
        None => CompletionVerdict::complete(VerdictReason::Balanced),
    }
}

/// First truncation signal found in `text`, if any.
pub fn detect_truncation(text: &str) -> Option<HeuristicSignal> {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        return Some(HeuristicSignal::Empty);
    }
    if ends_with_dangling_word(trimmed) {
        return Some(HeuristicSignal::DanglingConjunction);
    }
    if ends_with_dangling_punctuation(trimmed) {
        return Some(HeuristicSignal::DanglingPunctuation);
    }
    if has_unterminated_code_fence(text) {
        return Some(HeuristicSignal::UnterminatedCodeFence);
    }
    if !brackets_balanced(text) {
        return Some(HeuristicSignal::UnbalancedBrackets);
    }
    if !quotes_balanced(text) {
        return Some(HeuristicSignal::UnbalancedQuotes);
    }
    if ends_abruptly(trimmed) {
        return Some(HeuristicSignal::AbruptEnding);
    }
    None
}

fn ends_with_dangling_word(trimmed: &str) -> bool {
    if !trimmed.chars().next_back().is_some_and(char::is_alphabetic) {
        return false;
    }

    let mut tokens = trimmed
        .split_whitespace()
        .rev()
        .map(|t| t.trim_start_matches(|c: char| !c.is_alphanumeric()));
    let Some(last) = tokens.next() else {
        return false;
    };
    if DANGLING_WORDS.contains(&last) {
        return true;
    }

    match tokens.next() {
        Some(previous) => {
            let phrase = format!("{} {}", previous, last);
            DANGLING_PHRASES.contains(&phrase.as_str())
        }
        None => false,
    }
}

fn ends_with_dangling_punctuation(trimmed: &str) -> bool {
    if trimmed.ends_with(DANGLING_PUNCTUATION) {
        return true;
    }

    // An ellipsis glued to a word ("and so on...") reads as a deliberate
    // trail-off; a detached one ("...", "wait ...") reads as a cut.
    let before = trimmed.trim_end_matches(['.', '…']);
    let run = &trimmed[before.len()..];
    let is_ellipsis = run.contains('…') || run.len() >= 2;
    is_ellipsis
        && !before
            .chars()
            .next_back()
            .is_some_and(char::is_alphanumeric)
}

fn has_unterminated_code_fence(text: &str) -> bool {
    let (backtick, tilde) = text.lines().map(str::trim_start).fold(
        (0usize, 0usize),
        |(backtick, tilde), line| {
            if line.starts_with("```") {
                (backtick + 1, tilde)
            } else if line.starts_with("~~~") {
                (backtick, tilde + 1)
            } else {
                (backtick, tilde)
            }
        },
    );
    backtick % 2 == 1 || tilde % 2 == 1
}

fn brackets_balanced(text: &str) -> bool {
    BRACKET_PAIRS
        .iter()
        .all(|&(open, close)| pair_balanced(text, open, close))
}

fn pair_balanced(text: &str, open: char, close: char) -> bool {
    let mut depth: i64 = 0;
    for c in text.chars() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth < 0 {
                return false;
            }
        }
    }
    depth == 0
}

fn quotes_balanced(text: &str) -> bool {
    let straight = text.chars().filter(|&c| c == '"').count();
    let left = text.chars().filter(|&c| c == '“').count();
    let right = text.chars().filter(|&c| c == '”').count();
    straight % 2 == 0 && left == right
}

fn ends_abruptly(trimmed: &str) -> bool {
    if trimmed.ends_with(TERMINAL_CHARS) {
        return false;
    }
    last_sentence(trimmed).chars().count() > ABRUPT_TAIL_CHARS
}

/// Text after the last `.`/`!`/`?` that is followed by whitespace.
fn last_sentence(trimmed: &str) -> &str {
    let mut start = 0;
    let mut chars = trimmed.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?')
            && let Some(&(next_i, next)) = chars.peek()
            && next.is_whitespace()
        {
            start = next_i;
        }
    }
    trimmed[start..].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(text: &str) -> Option<HeuristicSignal> {
        detect_truncation(text)
    }

    #[test]
    fn balanced_punctuated_texts_vote_complete() {
        let texts = [
            "Rust is a systems programming language.",
            "He said \"hello\" (twice) to [everyone] in {the room}.",
            "Use `Vec::new()` for that! Is it fast? Yes.",
            "Here is the code:\n\n```rust\nfn main() {}\n```",
            "Thanks!",
            "Nested ((brackets) [and {braces}]) are fine.",
            "Done",
        ];
        for text in texts {
            let verdict = evaluate_heuristics(text);
            assert!(verdict.complete, "expected complete: {text:?}");
            assert_eq!(verdict.reason, VerdictReason::Balanced);
        }
    }

    #[test]
    fn trailing_conjunction_votes_incomplete() {
        for text in [
            "I like apples and",
            "You can choose this or",
            "The main reason is that",
            "It depends on many factors, such as",
            "There are several options, for example",
            "Send the request to",
            "We need balanced (brackets) because",
        ] {
            let verdict = evaluate_heuristics(text);
            assert!(!verdict.complete, "expected incomplete: {text:?}");
            assert_eq!(
                verdict.reason,
                VerdictReason::HeuristicIncomplete(HeuristicSignal::DanglingConjunction),
                "{text:?}"
            );
        }
    }

    #[test]
    fn dangling_word_match_is_word_exact() {
        assert_ne!(signal("I went to the land."), Some(HeuristicSignal::DanglingConjunction));
        assert_ne!(signal("Command"), Some(HeuristicSignal::DanglingConjunction));
        assert_ne!(signal("It is brand"), Some(HeuristicSignal::DanglingConjunction));
    }

    #[test]
    fn unbalanced_brackets_vote_incomplete() {
        assert_eq!(
            signal("The function call foo(bar, baz is missing a paren."),
            Some(HeuristicSignal::UnbalancedBrackets)
        );
        assert_eq!(
            signal("let v = vec![1, 2, 3;"),
            Some(HeuristicSignal::DanglingPunctuation)
        );
        assert_eq!(
            signal("fn main() {\n    println!(\"hi\")"),
            Some(HeuristicSignal::UnbalancedBrackets)
        );
        assert_eq!(
            signal("A closer ) before its opener ( is wrong."),
            Some(HeuristicSignal::UnbalancedBrackets)
        );
    }

    #[test]
    fn unbalanced_quotes_vote_incomplete() {
        assert_eq!(
            signal("She said \"this is not finished."),
            Some(HeuristicSignal::UnbalancedQuotes)
        );
        assert_eq!(
            signal("Curly “quote without its mate."),
            Some(HeuristicSignal::UnbalancedQuotes)
        );
        assert_eq!(signal("It's John's car."), None);
    }

    #[test]
    fn unterminated_code_fence_votes_incomplete() {
        assert_eq!(
            signal("Example:\n\n```python\nprint('hi')\n"),
            Some(HeuristicSignal::UnterminatedCodeFence)
        );
        assert_eq!(
            signal("~~~\nraw block\n"),
            Some(HeuristicSignal::UnterminatedCodeFence)
        );
    }

    #[test]
    fn dangling_punctuation_votes_incomplete() {
        assert_eq!(
            signal("First, gather the ingredients,"),
            Some(HeuristicSignal::DanglingPunctuation)
        );
        assert_eq!(
            signal("The steps are as follows:"),
            Some(HeuristicSignal::DanglingPunctuation)
        );
        assert_eq!(signal("Wait ..."), Some(HeuristicSignal::DanglingPunctuation));
        assert_eq!(signal("and so on..."), None);
    }

    #[test]
    fn abrupt_ending_votes_incomplete() {
        assert_eq!(
            signal("Quantum computers use qubits. Each qubit can exist in superpos"),
            Some(HeuristicSignal::AbruptEnding)
        );
        assert_eq!(signal("First sentence. Short"), None);
    }

    #[test]
    fn list_endings_go_through_the_abrupt_ending_check() {
        assert_eq!(
            signal("Steps:\n1. Install Rust.\n2. Run cargo build"),
            Some(HeuristicSignal::AbruptEnding)
        );
        assert_eq!(signal("Steps:\n1. Install Rust.\n2."), None);
        assert_eq!(signal("Steps:\n- Install Rust.\n-"), None);
    }

    #[test]
    fn empty_text_votes_incomplete() {
        assert_eq!(signal(""), Some(HeuristicSignal::Empty));
        assert_eq!(signal("  \n\t"), Some(HeuristicSignal::Empty));
    }

    #[test]
    fn last_sentence_splits_on_terminal_followed_by_space() {
        assert_eq!(last_sentence("One. Two! Three? four five"), "four five");
        assert_eq!(last_sentence("v1.2 is out"), "v1.2 is out");
    }
}
