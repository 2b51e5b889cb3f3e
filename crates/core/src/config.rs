use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub store: StoreConfig,
    pub extraction: ExtractionConfig,
    pub ocr: OcrConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
    pub speech: SpeechConfig,
    pub quiz: QuizConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `STUDYMORPH_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("STUDYMORPH_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            storage: StorageConfig::from_env_profiled(p),
            store: StoreConfig::from_env_profiled(p),
            extraction: ExtractionConfig::from_env_profiled(p),
            ocr: OcrConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
            ollama: OllamaConfig::from_env_profiled(p),
            speech: SpeechConfig::from_env_profiled(p),
            quiz: QuizConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() {
            "default"
        } else {
            &self.profile
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:      port={}", self.server.port);
        tracing::info!("  storage:     data_dir={}", self.storage.data_dir.display());
        tracing::info!(
            "  store:       backend={}, remote={}",
            self.store.backend,
            self.store.notes_api_url.as_deref().unwrap_or("(none)")
        );
        tracing::info!(
            "  extraction:  extractor_url={}",
            self.extraction.extractor_url.as_deref().unwrap_or("(embedded)")
        );
        tracing::info!(
            "  ocr:         command={}",
            self.ocr.command.as_deref().unwrap_or("(disabled)")
        );
        tracing::info!("  llm:         provider={}", self.llm.provider);
        tracing::info!("  ollama:      url={}", self.ollama.url);
        tracing::info!(
            "  speech:      model={}, voice={}, configured={}",
            self.speech.model,
            self.speech.voice,
            self.speech.is_configured()
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "profile": self.profile_label(),
            "server": { "host": self.server.host, "port": self.server.port },
            "storage": { "data_dir": self.storage.data_dir },
            "store": {
                "backend": self.store.backend,
                "notes_api_url": self.store.notes_api_url,
                "configured": self.store.is_configured(),
            },
            "extraction": {
                "extractor_url": self.extraction.extractor_url,
                "embedded": self.extraction.extractor_url.is_none(),
            },
            "ocr": { "enabled": self.ocr.command.is_some() },
            "llm": {
                "provider": self.llm.provider,
                "configured": self.llm.is_configured(),
            },
            "ollama": { "url": self.ollama.url, "model": self.ollama.model },
            "speech": {
                "model": self.speech.model,
                "voice": self.speech.voice,
                "configured": self.speech.is_configured(),
            },
        })
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 4000),
            cors_origin: profiled_env_or(p, "CORS_ORIGIN", "*"),
        }
    }
}

// ── Storage ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            data_dir: PathBuf::from(profiled_env_or(p, "DATA_DIR", "data")),
        }
    }
}

// ── Note store ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// "local" (guest mode, JSON file) or "remote" (hosted notes API).
    pub backend: String,
    pub notes_api_url: Option<String>,
    pub notes_api_key: Option<String>,
}

impl StoreConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            backend: profiled_env_or(p, "STORE_BACKEND", "local"),
            notes_api_url: profiled_env_opt(p, "NOTES_API_URL"),
            notes_api_key: profiled_env_opt(p, "NOTES_API_KEY"),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.backend.as_str() {
            "local" => true,
            "remote" => self.notes_api_url.is_some(),
            _ => false,
        }
    }
}

// ── Extraction ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Remote extraction service implementing the `/extract` contract.
    /// When unset, the same logic runs in-process.
    pub extractor_url: Option<String>,
}

impl ExtractionConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            extractor_url: profiled_env_opt(p, "EXTRACTOR_URL"),
        }
    }
}

// ── OCR ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Helper command rendering PDF pages and running OCR over them,
    /// e.g. "python3 scripts/ocr_pdf.py". Unset disables the OCR stage.
    pub command: Option<String>,
}

impl OcrConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            command: profiled_env_opt(p, "OCR_COMMAND"),
        }
    }
}

// ── LLM (OpenAI / Anthropic / Ollama) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "ollama"),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_model: profiled_env_or(p, "OPENAI_MODEL", "gpt-4o"),
            openai_base_url: profiled_env_opt(p, "OPENAI_BASE_URL"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            anthropic_model: profiled_env_or(p, "ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: profiled_env_or(p, "LLM_TEMPERATURE", "0.7")
                .parse()
                .unwrap_or(0.7),
            max_tokens: profiled_env_opt(p, "LLM_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(4096),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
            model: profiled_env_or(p, "OLLAMA_MODEL", "llama3.2"),
        }
    }
}

// ── Quiz bank ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Override path for the learning-style question bank (YAML).
    /// Unset uses the embedded default bank.
    pub file: Option<PathBuf>,
}

impl QuizConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            file: profiled_env_opt(p, "QUIZ_FILE").map(PathBuf::from),
        }
    }
}

// ── Speech synthesis (narrated audio) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub voice: String,
    pub base_url: String,
}

impl SpeechConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            // Falls back to the OpenAI key so one key covers both services.
            api_key: profiled_env_opt(p, "TTS_API_KEY")
                .or_else(|| profiled_env_opt(p, "OPENAI_API_KEY")),
            model: profiled_env_or(p, "TTS_MODEL", "tts-1"),
            voice: profiled_env_or(p, "TTS_VOICE", "alloy"),
            base_url: profiled_env_or(p, "TTS_BASE_URL", "https://api.openai.com"),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
