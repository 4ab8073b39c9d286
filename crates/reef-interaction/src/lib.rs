pub mod backend;
pub mod config;
pub mod gemini_api_agent;
pub mod patterns;
pub mod translator;

// Re-export public API
pub use backend::CompletionBackend;
pub use gemini_api_agent::{DEFAULT_GEMINI_MODEL, GeminiApiAgent};
pub use translator::{
    NaturalLanguageTranslator, Translation, TranslationSource, looks_like_natural_language,
};
