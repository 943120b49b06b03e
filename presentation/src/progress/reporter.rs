//! Progress reporting for generation requests

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use relay_application::ContinuationProgress;
use relay_domain::{CompletionVerdict, ProviderId, SessionState};
use std::sync::Mutex;
use std::time::Duration;

/// Spinner on stderr that follows the continuation loop
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn with_spinner(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.spinner.lock()
            && let Some(pb) = guard.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ContinuationProgress for ProgressReporter {
    fn on_provider_selected(&self, provider: &ProviderId) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(provider.to_string());
        pb.set_message("Generating...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut guard) = self.spinner.lock()
            && let Some(previous) = guard.replace(pb)
        {
            previous.finish_and_clear();
        }
    }

    fn on_verdict(&self, verdict: &CompletionVerdict) {
        let mark = if verdict.complete {
            "v".green()
        } else {
            "~".yellow()
        };
        self.with_spinner(|pb| pb.set_message(format!("{} {}", mark, verdict.reason)));
    }

    fn on_continuation_start(&self, attempt: u32, max_attempts: u32) {
        self.with_spinner(|pb| {
            pb.set_message(format!("Continuing ({}/{})...", attempt, max_attempts))
        });
    }

    fn on_provider_replaced(&self, failed: &ProviderId, next: &ProviderId) {
        self.with_spinner(|pb| {
            pb.println(format!("  {} {} failed, switching to {}", "x".red(), failed, next));
            pb.set_prefix(next.to_string());
        });
    }

    fn on_session_end(&self, _state: SessionState) {
        if let Ok(mut guard) = self.spinner.lock()
            && let Some(pb) = guard.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Line-based progress on stderr (no terminal control codes)
///
/// Used while streaming, where a spinner would interleave with the answer.
pub struct SimpleProgress;

impl SimpleProgress {
    fn line(event: ProgressLine<'_>) -> String {
        match event {
            ProgressLine::Selected(provider) => format!("{} {}", "->".cyan(), provider.as_str().bold()),
            ProgressLine::Continuation(attempt, max) => {
                format!("  {} continuing ({}/{})", "+".cyan(), attempt, max)
            }
            ProgressLine::Replaced(failed, next) => {
                format!("  {} {} failed, switching to {}", "x".red(), failed, next)
            }
            ProgressLine::End(state) => match state {
                SessionState::Complete => format!("  {} {}", "v".green(), state),
                _ => format!("  {} {}", "!".yellow(), state),
            },
        }
    }
}

enum ProgressLine<'a> {
    Selected(&'a ProviderId),
    Continuation(u32, u32),
    Replaced(&'a ProviderId, &'a ProviderId),
    End(SessionState),
}

impl ContinuationProgress for SimpleProgress {
    fn on_provider_selected(&self, provider: &ProviderId) {
        eprintln!("{}", Self::line(ProgressLine::Selected(provider)));
    }

    fn on_continuation_start(&self, attempt: u32, max_attempts: u32) {
        eprintln!("{}", Self::line(ProgressLine::Continuation(attempt, max_attempts)));
    }

    fn on_provider_replaced(&self, failed: &ProviderId, next: &ProviderId) {
        eprintln!("{}", Self::line(ProgressLine::Replaced(failed, next)));
    }

    fn on_session_end(&self, state: SessionState) {
        eprintln!("{}", Self::line(ProgressLine::End(state)));
    }
}
