use anyhow::Result;
use async_trait::async_trait;

/// Text-generation capability used by the guidance operations.
///
/// Implementations perform the only network I/O in a guidance call. They
/// return the model's raw text; the caller is responsible for bounding the
/// call with a deadline and for validating the reply.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Short identifier for logs, e.g. "gemini:gemini-1.5-flash".
    fn name(&self) -> String;
}
