//! Shared utilities for use cases.
//!
//! Contains cancellation checking and the bounded, cancellable provider call
//! used by both the blocking and the streaming generation paths.

use crate::ports::provider::ProviderError;
use crate::use_cases::continue_generation::GenerateError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How a provider call ended.
pub(crate) enum CallOutcome<T> {
    Done(T),
    Failed(ProviderError),
    Cancelled,
}

/// Check if cancellation has been requested.
///
/// Returns `Err(GenerateError::Cancelled)` if the token is cancelled.
pub(crate) fn check_cancelled(token: &CancellationToken) -> Result<(), GenerateError> {
    if token.is_cancelled() {
        return Err(GenerateError::Cancelled);
    }
    Ok(())
}

/// Await a provider call under an optional timeout, racing cancellation.
///
/// A timeout is reported as [`ProviderError::Timeout`] so it triggers
/// replace-on-failure like any other transport failure.
pub(crate) async fn call_provider<T, F>(
    cancel: &CancellationToken,
    timeout: Option<Duration>,
    call: F,
) -> CallOutcome<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    let bounded = async {
        match timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(ProviderError::Timeout)),
            None => call.await,
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => CallOutcome::Cancelled,
        result = bounded => match result {
            Ok(value) => CallOutcome::Done(value),
            Err(e) => CallOutcome::Failed(e),
        },
    }
}
