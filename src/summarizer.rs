/// Text summarization collaborator.
///
/// The parser can optionally run query text through a summarizer before
/// matching. The trait keeps that collaborator narrow and injectable:
/// production uses `HttpSummarizer` against a local model server, tests
/// use `IdentitySummarizer` (or a failing stub) so nothing in the core
/// depends on network access or model weights.
mod client;

pub use client::{HttpSummarizer, HttpSummarizerBuilder, SummarizerError};

/// Compresses free text into a shorter paraphrase.
pub trait Summarizer: Send + Sync {
    /// Summarizes `text`. Implementations may be slow (seconds) and
    /// non-deterministic; callers decide how to handle failure.
    fn summarize(&self, text: &str) -> Result<String, SummarizerError>;
}

/// A summarizer that returns its input unchanged. The stand-in used when
/// deterministic behavior is required.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySummarizer;

impl Summarizer for IdentitySummarizer {
    fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        Ok(text.to_string())
    }
}
