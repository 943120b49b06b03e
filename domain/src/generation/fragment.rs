//! Response fragment value object

use crate::providers::descriptor::ProviderId;
use serde::{Deserialize, Serialize};

/// Text produced by one provider call. Immutable once produced.
///
/// `overlap` is the number of leading bytes of `text` that repeated the
/// already-merged answer and were dropped when the fragment was appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFragment {
    index: usize,
    provider: ProviderId,
    text: String,
    overlap: usize,
}

impl ResponseFragment {
    pub(crate) fn new(index: usize, provider: ProviderId, text: String, overlap: usize) -> Self {
        debug_assert!(text.is_char_boundary(overlap));
        Self {
            index,
            provider,
            text,
            overlap,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// The text exactly as the provider returned it.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// The part of the fragment that extended the merged answer.
    pub fn contributed(&self) -> &str {
        &self.text[self.overlap..]
    }
}
