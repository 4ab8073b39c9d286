//! The seam between the translator and a remote completion service.

use async_trait::async_trait;
use reef_core::Result;

/// A text-in, text-out completion service.
///
/// The translator builds one prompt per user request and expects one short
/// reply. Implementations map every transport or service failure to
/// `ReefError::RemoteUnavailable` so the translator can fall back to the
/// local pattern rules.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name shown in the `ai` status output.
    fn name(&self) -> &str;

    /// Sends one prompt and returns the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}
