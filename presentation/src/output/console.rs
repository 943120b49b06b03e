//! Console output for generation results, exclusions and provider rankings

use colored::Colorize;
use relay_application::{GenerationOutcome, RankedProvider};
use relay_domain::{ExclusionSet, Model, SessionState};

/// Formats relay results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// The merged answer, newline-terminated
    pub fn format_text(outcome: &GenerationOutcome) -> String {
        let mut output = outcome.text.clone();
        if !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    /// Format the full outcome as JSON
    pub fn format_json(outcome: &GenerationOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// One-line session summary for progress output
    pub fn format_summary(outcome: &GenerationOutcome) -> String {
        let state = match outcome.state {
            SessionState::Complete => outcome.state.as_str().green(),
            SessionState::Active => outcome.state.as_str().normal(),
            SessionState::Exhausted | SessionState::Aborted => outcome.state.as_str().yellow(),
        };
        let mut summary = format!(
            "{} {} via {} ({} fragment{}, {} continuation{}",
            "->".cyan(),
            state.bold(),
            outcome.provider,
            outcome.fragments,
            plural(outcome.fragments),
            outcome.continuation_attempts,
            plural(outcome.continuation_attempts as usize),
        );
        if outcome.reselections > 0 {
            summary.push_str(&format!(
                ", {} reselection{}",
                outcome.reselections,
                plural(outcome.reselections as usize)
            ));
        }
        summary.push(')');
        summary
    }

    /// Notice for results that may be cut off, `None` when complete
    pub fn incomplete_notice(outcome: &GenerationOutcome) -> Option<String> {
        if !outcome.possibly_incomplete {
            return None;
        }
        let detail = match (&outcome.abort_reason, outcome.state) {
            (Some(reason), _) => reason.to_string(),
            (None, SessionState::Exhausted) if outcome.last_verdict.is_none() => {
                "auto-continue disabled, completeness not checked".to_string()
            }
            (None, SessionState::Exhausted) => format!(
                "continuation limit reached after {} attempt{}",
                outcome.continuation_attempts,
                plural(outcome.continuation_attempts as usize)
            ),
            (None, state) => state.to_string(),
        };
        Some(format!(
            "{} the answer is possibly incomplete ({})",
            "warning:".yellow().bold(),
            detail
        ))
    }

    /// The exclusion list, one id per line
    pub fn format_exclusions(exclusions: &ExclusionSet) -> String {
        if exclusions.is_empty() {
            return format!("{}\n", "No providers are excluded".dimmed());
        }
        let mut output = format!("{}\n", "Excluded providers:".cyan().bold());
        for id in exclusions.iter() {
            output.push_str(&format!("  {} {}\n", "x".red(), id));
        }
        output
    }

    /// Ranked providers for `model`, best first
    pub fn format_rankings(model: &Model, ranked: &[RankedProvider]) -> String {
        let mut output = format!(
            "{} {}\n",
            "Providers for".cyan().bold(),
            model.as_str().bold()
        );
        if ranked.is_empty() {
            output.push_str(&format!("  {}\n", "(none configured)".dimmed()));
            return output;
        }

        for (rank, entry) in ranked.iter().enumerate() {
            let descriptor = &entry.descriptor;
            let mut line = format!(
                "  {:>2}. {} {}",
                rank + 1,
                descriptor.id.as_str().bold(),
                format!("priority={}", descriptor.priority).dimmed()
            );
            if !descriptor.tags.is_empty() {
                let tags: Vec<&str> = descriptor.tags.iter().map(String::as_str).collect();
                line.push_str(&format!(" [{}]", tags.join(", ")));
            }
            if entry.excluded {
                line.push_str(&format!(" {}", "(excluded)".red()));
            }
            output.push_str(&line);
            output.push('\n');
        }
        output
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_domain::{
        AbortReason, CompletionVerdict, ProviderDescriptor, ProviderId, VerdictReason,
    };

    fn pid(s: &str) -> ProviderId {
        s.parse().unwrap()
    }

    fn outcome(state: SessionState, possibly_incomplete: bool) -> GenerationOutcome {
        GenerationOutcome {
            text: "Partial answer".to_string(),
            state,
            possibly_incomplete,
            abort_reason: None,
            provider: pid("primary"),
            providers_tried: vec![pid("primary")],
            fragments: 1,
            continuation_attempts: 3,
            reselections: 0,
            last_verdict: None,
        }
    }

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_format_text_adds_trailing_newline() {
        let result = outcome(SessionState::Complete, false);
        assert_eq!(ConsoleFormatter::format_text(&result), "Partial answer\n");
    }

    #[test]
    fn test_format_json_has_outcome_fields() {
        let result = outcome(SessionState::Exhausted, true);
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&result)).unwrap();
        assert_eq!(value["state"], "exhausted");
        assert_eq!(value["possibly_incomplete"], true);
        assert_eq!(value["provider"], "primary");
        assert!(value.get("abort_reason").is_none());
    }

    #[test]
    fn test_incomplete_notice() {
        plain();
        assert!(ConsoleFormatter::incomplete_notice(&outcome(SessionState::Complete, false)).is_none());

        let mut exhausted = outcome(SessionState::Exhausted, true);
        exhausted.last_verdict = Some(CompletionVerdict::incomplete(VerdictReason::LlmJudgedIncomplete));
        let notice = ConsoleFormatter::incomplete_notice(&exhausted).unwrap();
        assert!(notice.contains("possibly incomplete"));
        assert!(notice.contains("after 3 attempts"));

        let mut unchecked = outcome(SessionState::Exhausted, true);
        unchecked.continuation_attempts = 0;
        let notice = ConsoleFormatter::incomplete_notice(&unchecked).unwrap();
        assert!(notice.contains("completeness not checked"));

        let mut aborted = outcome(SessionState::Aborted, true);
        aborted.abort_reason = Some(AbortReason::Cancelled);
        let notice = ConsoleFormatter::incomplete_notice(&aborted).unwrap();
        assert!(notice.contains("(cancelled)"));
    }

    #[test]
    fn test_format_exclusions() {
        plain();
        assert_eq!(
            ConsoleFormatter::format_exclusions(&ExclusionSet::new()),
            "No providers are excluded\n"
        );

        let set: ExclusionSet = [pid("b"), pid("a")].into_iter().collect();
        let output = ConsoleFormatter::format_exclusions(&set);
        let a = output.find("  x a").unwrap();
        let b = output.find("  x b").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_format_rankings_marks_excluded() {
        plain();
        let ranked = vec![
            RankedProvider {
                descriptor: ProviderDescriptor::new(pid("fast"), 10).with_tag("cloud"),
                excluded: false,
            },
            RankedProvider {
                descriptor: ProviderDescriptor::new(pid("flaky"), 20),
                excluded: true,
            },
        ];
        let output = ConsoleFormatter::format_rankings(&Model::Gpt4o, &ranked);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Providers for gpt-4o");
        assert_eq!(lines[1], "   1. fast priority=10 [cloud]");
        assert_eq!(lines[2], "   2. flaky priority=20 (excluded)");
    }

    #[test]
    fn test_summary_mentions_reselections() {
        plain();
        let mut result = outcome(SessionState::Complete, false);
        result.reselections = 1;
        result.continuation_attempts = 1;
        assert_eq!(
            ConsoleFormatter::format_summary(&result),
            "-> complete via primary (1 fragment, 1 continuation, 1 reselection)"
        );
    }
}
