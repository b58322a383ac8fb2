/*!
 * Translation providers used to fill segments that lack a secondary-language
 * rendition.
 *
 * - DeepL: DeepL REST API (free and pro endpoints)
 * - Mock: deterministic translator for tests
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::language_utils::Language;

/// Common trait for machine translation backends
///
/// Implementations must be shareable across the episodes processed in parallel.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate `text` from `source` into `target`
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The translated text or an error
    async fn translate(&self, text: &str, source: Language, target: Language) -> Result<String, ProviderError>;

    /// Short name used in log lines
    fn name(&self) -> &str;
}

pub mod deepl;
pub mod mock;
