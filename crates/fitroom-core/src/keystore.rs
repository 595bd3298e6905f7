//! API key store trait.
//!
//! Defines the interface for loading and persisting the provider API key.

use crate::error::Result;

/// Store for the single provider credential.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - The backing file has appropriate permissions (e.g. 600 on Unix)
/// - The key is never logged or embedded in error messages
/// - A failed persist keeps the in-memory value usable for the rest of the
///   run; persistence failure is logged, not surfaced as a blocking error
#[async_trait::async_trait]
pub trait KeyStore: Send + Sync {
    /// Loads the stored API key, if one has been saved.
    async fn load(&self) -> Result<Option<String>>;

    /// Stores the API key, persisting it for later runs.
    ///
    /// Must succeed from the caller's point of view whenever the in-memory
    /// value was accepted, even if writing to disk failed.
    async fn store(&self, key: &str) -> Result<()>;
}
