use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;
use studymorph_core::config::SpeechConfig;
use tracing::debug;

/// Text-to-speech backend for narrated study notes.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Synthesize speech for the given text, returning encoded audio (MP3).
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("speech not configured: {0}")]
    NotConfigured(String),
}

impl SpeechError {
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            SpeechError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// OpenAI speech endpoint, also reachable through compatible gateways via
/// a custom base URL.
pub struct OpenAiSpeech {
    client: reqwest::Client,
    api_key: String,
    model: String,
    voice: String,
    base_url: String,
}

impl OpenAiSpeech {
    pub fn new(api_key: String, model: String, voice: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            voice,
            base_url,
        }
    }
}

#[async_trait]
impl SpeechProvider for OpenAiSpeech {
    async fn synthesize(&self, text: &str) -> Result<Bytes, SpeechError> {
        let url = format!("{}/v1/audio/speech", self.base_url);

        debug!(model = %self.model, voice = %self.voice, chars = text.len(), "tts request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": text,
            }))
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::Api { status, body });
        }

        Ok(response.bytes().await?)
    }
}

/// Create the speech provider from config.
pub fn create_speech(config: &SpeechConfig) -> Result<Box<dyn SpeechProvider>, SpeechError> {
    let api_key = config.api_key.clone().ok_or_else(|| {
        SpeechError::NotConfigured("TTS_API_KEY or OPENAI_API_KEY not set".into())
    })?;
    Ok(Box::new(OpenAiSpeech::new(
        api_key,
        config.model.clone(),
        config.voice.clone(),
        config.base_url.clone(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = SpeechConfig {
            api_key: None,
            model: "tts-1".into(),
            voice: "alloy".into(),
            base_url: "https://api.openai.com".into(),
        };
        assert!(matches!(
            create_speech(&config),
            Err(SpeechError::NotConfigured(_))
        ));
    }

    #[test]
    fn api_error_exposes_upstream_status() {
        let err = SpeechError::Api {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(err.upstream_status(), Some(429));
    }
}
