//! Judge answer parsing.

/// Read a judge model's answer.
///
/// Returns `Some(false)` if the answer contains INCOMPLETE, `Some(true)` if it
/// contains COMPLETE (checked second, since INCOMPLETE contains it), and
/// `None` when the judge said neither.
pub fn parse_judge_answer(answer: &str) -> Option<bool> {
    let upper = answer.to_uppercase();
    if upper.contains("INCOMPLETE") {
        Some(false)
    } else if upper.contains("COMPLETE") {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_wins_over_complete_substring() {
        assert_eq!(parse_judge_answer("INCOMPLETE"), Some(false));
        assert_eq!(parse_judge_answer("The text is incomplete."), Some(false));
    }

    #[test]
    fn complete_is_case_insensitive() {
        assert_eq!(parse_judge_answer("COMPLETE"), Some(true));
        assert_eq!(parse_judge_answer("  complete\n"), Some(true));
    }

    #[test]
    fn unclear_answer_is_inconclusive() {
        assert_eq!(parse_judge_answer("I am not sure."), None);
        assert_eq!(parse_judge_answer(""), None);
    }
}
