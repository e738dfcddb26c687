// Translation pipeline: memo cache, backend providers, sentence chunking and
// the ordered fallback chain that ties them together.

pub mod backend;
pub mod cache;
pub mod chain;
pub mod chunk;

pub use backend::TranslateBackend;
pub use cache::TranslationCache;
pub use chain::TranslationService;
