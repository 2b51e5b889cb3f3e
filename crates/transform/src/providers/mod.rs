pub mod claude;
pub mod ollama;
pub mod openai;

use studymorph_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{LlmError, LlmProvider};

/// Create the LLM provider selected by config.
pub fn create_provider(
    llm: &LlmConfig,
    ollama: &OllamaConfig,
) -> Result<Box<dyn LlmProvider>, LlmError> {
    match llm.provider.as_str() {
        "openai" => {
            let api_key = llm
                .openai_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiProvider::new(
                api_key.clone(),
                llm.openai_model.clone(),
                base_url.to_string(),
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(claude::ClaudeProvider::new(
                api_key.clone(),
                llm.anthropic_model.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            ollama.url.clone(),
            ollama.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_llm_config() -> LlmConfig {
        LlmConfig {
            provider: "ollama".into(),
            openai_api_key: None,
            openai_model: "gpt-4o".into(),
            openai_base_url: None,
            anthropic_api_key: None,
            anthropic_model: "claude-sonnet-4-5-20250929".into(),
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    fn ollama_config() -> OllamaConfig {
        OllamaConfig {
            url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
        }
    }

    #[test]
    fn ollama_needs_no_key() {
        assert!(create_provider(&base_llm_config(), &ollama_config()).is_ok());
    }

    #[test]
    fn openai_without_key_is_not_configured() {
        let mut config = base_llm_config();
        config.provider = "openai".into();
        let err = create_provider(&config, &ollama_config()).unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured(_)));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let mut config = base_llm_config();
        config.provider = "skynet".into();
        assert!(create_provider(&config, &ollama_config()).is_err());
    }
}
