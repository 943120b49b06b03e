//! Completion verdict value objects

use serde::{Serialize, Serializer};

/// A structural or lexical sign that text was cut off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeuristicSignal {
    /// Nothing was generated.
    Empty,
    /// `()`, `[]` or `{}` do not pair up.
    UnbalancedBrackets,
    /// Odd number of double quotes.
    UnbalancedQuotes,
    /// A code fence was opened and never closed.
    UnterminatedCodeFence,
    /// Last word is a conjunction or preposition.
    DanglingConjunction,
    /// Ends with a comma, semicolon, colon or detached ellipsis.
    DanglingPunctuation,
    /// Last sentence stops without terminal punctuation.
    AbruptEnding,
}

impl HeuristicSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicSignal::Empty => "empty",
            HeuristicSignal::UnbalancedBrackets => "unbalanced-brackets",
            HeuristicSignal::UnbalancedQuotes => "unbalanced-quotes",
            HeuristicSignal::UnterminatedCodeFence => "unterminated-code-fence",
            HeuristicSignal::DanglingConjunction => "dangling-conjunction",
            HeuristicSignal::DanglingPunctuation => "dangling-punctuation",
            HeuristicSignal::AbruptEnding => "abrupt-ending",
        }
    }
}

/// Why a verdict came out the way it did.
///
/// Rendered as the stable strings used in logs and JSON output, e.g.
/// `heuristic-incomplete:unbalanced-brackets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerdictReason {
    /// Heuristics found nothing and no judge was consulted.
    Balanced,
    LlmJudgedComplete,
    LlmJudgedIncomplete,
    HeuristicIncomplete(HeuristicSignal),
    /// The judge timed out or failed; heuristics alone decided.
    JudgeUnavailable,
    /// The judge answered with neither COMPLETE nor INCOMPLETE.
    JudgeInconclusive,
}

impl std::fmt::Display for VerdictReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictReason::Balanced => f.write_str("balanced"),
            VerdictReason::LlmJudgedComplete => f.write_str("llm-judged-complete"),
            VerdictReason::LlmJudgedIncomplete => f.write_str("llm-judged-incomplete"),
            VerdictReason::HeuristicIncomplete(signal) => {
                write!(f, "heuristic-incomplete:{}", signal.as_str())
            }
            VerdictReason::JudgeUnavailable => f.write_str("judge-unavailable"),
            VerdictReason::JudgeInconclusive => f.write_str("judge-inconclusive"),
        }
    }
}

impl Serialize for VerdictReason {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Outcome of a completeness evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionVerdict {
    pub complete: bool,
    pub reason: VerdictReason,
}

impl CompletionVerdict {
    pub fn complete(reason: VerdictReason) -> Self {
        Self {
            complete: true,
            reason,
        }
    }

    pub fn incomplete(reason: VerdictReason) -> Self {
        Self {
            complete: false,
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_strings_are_stable() {
        assert_eq!(VerdictReason::Balanced.to_string(), "balanced");
        assert_eq!(
            VerdictReason::HeuristicIncomplete(HeuristicSignal::UnbalancedBrackets).to_string(),
            "heuristic-incomplete:unbalanced-brackets"
        );
        assert_eq!(
            VerdictReason::HeuristicIncomplete(HeuristicSignal::DanglingConjunction).to_string(),
            "heuristic-incomplete:dangling-conjunction"
        );
        assert_eq!(VerdictReason::JudgeUnavailable.to_string(), "judge-unavailable");
    }

    #[test]
    fn verdict_serializes_reason_as_string() {
        let verdict = CompletionVerdict::incomplete(VerdictReason::LlmJudgedIncomplete);
        let json = serde_json::to_string(&verdict).unwrap();
        assert_eq!(json, r#"{"complete":false,"reason":"llm-judged-incomplete"}"#);
    }
}
