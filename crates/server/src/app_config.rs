//! Application configuration builders.
//!
//! Constructs the store, transformer, speech, and question-bank subsystems
//! from `Config`. Optional subsystems fail soft: a missing API key disables
//! the feature with a warning instead of refusing to start.

use studymorph_core::Config;
use studymorph_quiz::QuestionBank;
use studymorph_store::NoteStore;
use studymorph_transform::{ContentTransformer, SpeechProvider};
use tracing::info;

/// Load configuration from `.env` and environment variables.
pub fn load_config() -> Config {
    studymorph_core::config::load_dotenv();
    Config::from_env()
}

pub fn build_store(config: &Config) -> anyhow::Result<Box<dyn NoteStore>> {
    let store = studymorph_store::create_store(&config.store, &config.storage.data_dir)?;
    info!("Note store ready (backend: {})", config.store.backend);
    Ok(store)
}

/// Build the content transformer. Returns None when no LLM provider is
/// configured; the /transform routes then answer 503.
pub fn build_transformer(config: &Config) -> Option<ContentTransformer> {
    match ContentTransformer::from_config(&config.llm, &config.ollama) {
        Ok(t) => {
            info!("Content transformer ready (provider: {})", config.llm.provider);
            Some(t)
        }
        Err(e) => {
            tracing::warn!(
                "Content transformer not available: {} — /transform routes will answer 503",
                e
            );
            None
        }
    }
}

/// Build the speech provider. Returns None when TTS is not configured;
/// audio responses then carry the narration script only.
pub fn build_speech(config: &Config) -> Option<Box<dyn SpeechProvider>> {
    match studymorph_transform::create_speech(&config.speech) {
        Ok(s) => {
            info!(
                "Speech provider ready (model: {}, voice: {})",
                config.speech.model, config.speech.voice
            );
            Some(s)
        }
        Err(e) => {
            tracing::warn!(
                "Speech provider not available: {} — audio responses carry the script only",
                e
            );
            None
        }
    }
}

/// Load the learning-style question bank, falling back to the embedded
/// default when a configured override file cannot be read.
pub fn load_question_bank(config: &Config) -> QuestionBank {
    match QuestionBank::load(&config.quiz) {
        Ok(bank) => {
            info!("Question bank ready ({} questions)", bank.len());
            bank
        }
        Err(e) => {
            tracing::warn!("Failed to load question bank: {} — using embedded bank", e);
            QuestionBank::embedded()
        }
    }
}
