use serde::{Deserialize, Serialize};
use studymorph_core::config::{LlmConfig, OllamaConfig};
use studymorph_core::LearningStyle;
use tracing::{debug, info};

use crate::provider::{LlmError, LlmProvider, Message};
use crate::providers::create_provider;

const FLASHCARDS_TEMPLATE: &str = include_str!("../prompts/flashcards.md");
const QUIZ_TEMPLATE: &str = include_str!("../prompts/quiz.md");
const NOTES_TEMPLATE: &str = include_str!("../prompts/enhanced_notes.md");
const AUDIO_TEMPLATE: &str = include_str!("../prompts/audio_script.md");
const CONSOLIDATE_TEMPLATE: &str = include_str!("../prompts/consolidate.md");

/// Placeholder in style-aware templates that gets replaced with guidance
/// for the student's learning style.
const STYLE_PLACEHOLDER: &str = "<<<style>>>";

/// One transformation to run over note content.
#[derive(Debug, Clone)]
pub enum TransformRequest {
    Flashcards { content: String, count: usize },
    Quiz { content: String, question_count: usize },
    EnhancedNotes { content: String, style: LearningStyle },
    AudioScript { content: String, style: LearningStyle },
    Consolidate { sections: Vec<NoteSection> },
}

/// A note's contribution to a consolidated study guide.
#[derive(Debug, Clone)]
pub struct NoteSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone)]
pub enum TransformOutput {
    Flashcards(Vec<Flashcard>),
    Quiz(Vec<QuizItem>),
    EnhancedNotes(String),
    AudioScript(String),
    Consolidated(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("no usable content to transform")]
    EmptyContent,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("invalid model response: {reason}")]
    InvalidResponse { reason: String, raw_response: String },
}

/// Runs note content through an LLM to produce study material. One entry
/// point for all transformation kinds, so adding a kind never touches
/// callers.
pub struct ContentTransformer {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl ContentTransformer {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    /// Build from config, creating the configured provider.
    pub fn from_config(llm: &LlmConfig, ollama: &OllamaConfig) -> Result<Self, LlmError> {
        let provider = create_provider(llm, ollama)?;
        Ok(Self::new(provider, llm.temperature, llm.max_tokens))
    }

    pub async fn transform(
        &self,
        request: TransformRequest,
    ) -> Result<TransformOutput, TransformError> {
        match request {
            TransformRequest::Flashcards { content, count } => {
                let content = require_content(&content)?;
                info!(count, chars = content.len(), "generating flashcards");
                let user = format!(
                    "Create {count} flashcards from these notes:\n\n{content}\n\n\
                     Respond ONLY with valid JSON, no explanation."
                );
                let response = self.complete(FLASHCARDS_TEMPLATE.to_string(), user).await?;
                let cards: Vec<Flashcard> = parse_json(&response)?;
                if cards.is_empty() {
                    return Err(invalid("model returned no flashcards", &response));
                }
                Ok(TransformOutput::Flashcards(cards))
            }
            TransformRequest::Quiz {
                content,
                question_count,
            } => {
                let content = require_content(&content)?;
                info!(question_count, chars = content.len(), "generating quiz");
                let user = format!(
                    "Write {question_count} multiple-choice questions from these notes:\n\n\
                     {content}\n\nRespond ONLY with valid JSON, no explanation."
                );
                let response = self.complete(QUIZ_TEMPLATE.to_string(), user).await?;
                let items: Vec<QuizItem> = parse_json(&response)?;
                validate_quiz(&items, &response)?;
                Ok(TransformOutput::Quiz(items))
            }
            TransformRequest::EnhancedNotes { content, style } => {
                let content = require_content(&content)?;
                info!(style = %style, chars = content.len(), "rewriting notes");
                let system = NOTES_TEMPLATE.replace(STYLE_PLACEHOLDER, style_guidance(style));
                let user = format!("Rewrite these notes:\n\n{content}");
                let markdown = self.complete(system, user).await?;
                Ok(TransformOutput::EnhancedNotes(markdown.trim().to_string()))
            }
            TransformRequest::AudioScript { content, style } => {
                let content = require_content(&content)?;
                info!(style = %style, chars = content.len(), "writing narration script");
                let system = AUDIO_TEMPLATE.replace(STYLE_PLACEHOLDER, style_guidance(style));
                let user = format!("Narrate these notes:\n\n{content}");
                let script = self.complete(system, user).await?;
                Ok(TransformOutput::AudioScript(script.trim().to_string()))
            }
            TransformRequest::Consolidate { sections } => {
                let sections: Vec<&NoteSection> = sections
                    .iter()
                    .filter(|s| !s.content.trim().is_empty())
                    .collect();
                if sections.is_empty() {
                    return Err(TransformError::EmptyContent);
                }
                info!(notes = sections.len(), "consolidating notes");
                let body = sections
                    .iter()
                    .map(|s| format!("## {}\n\n{}", s.title, s.content))
                    .collect::<Vec<_>>()
                    .join("\n\n---\n\n");
                let user = format!("Merge these notes into one study guide:\n\n{body}");
                let guide = self.complete(CONSOLIDATE_TEMPLATE.to_string(), user).await?;
                Ok(TransformOutput::Consolidated(guide.trim().to_string()))
            }
        }
    }

    async fn complete(&self, system: String, user: String) -> Result<String, TransformError> {
        let messages = vec![Message::system(system), Message::user(user)];
        let response = self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await?;
        debug!(chars = response.len(), "llm response received");
        Ok(response)
    }
}

fn require_content(content: &str) -> Result<&str, TransformError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(TransformError::EmptyContent);
    }
    Ok(trimmed)
}

fn invalid(reason: &str, raw: &str) -> TransformError {
    TransformError::InvalidResponse {
        reason: reason.to_string(),
        raw_response: raw.to_string(),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(response: &str) -> Result<T, TransformError> {
    let json = extract_json(response);
    serde_json::from_str(json).map_err(|e| TransformError::InvalidResponse {
        reason: e.to_string(),
        raw_response: response.to_string(),
    })
}

fn validate_quiz(items: &[QuizItem], raw: &str) -> Result<(), TransformError> {
    if items.is_empty() {
        return Err(invalid("model returned no questions", raw));
    }
    for (i, item) in items.iter().enumerate() {
        if item.options.len() != 4 {
            return Err(invalid(
                &format!("question {i} has {} options, expected 4", item.options.len()),
                raw,
            ));
        }
        if item.correct_index >= item.options.len() {
            return Err(invalid(
                &format!("question {i} correct_index out of range"),
                raw,
            ));
        }
    }
    Ok(())
}

fn style_guidance(style: LearningStyle) -> &'static str {
    match style {
        LearningStyle::Visual => {
            "This student learns visually. Use tables, hierarchies and clear \
             spatial structure. Describe diagrams and layouts in words. Attach \
             imagery to key terms."
        }
        LearningStyle::Auditory => {
            "This student learns by listening. Use rhythm and repetition, \
             restate key points in different words, and phrase material so it \
             works read aloud. Suggest sayable mnemonics."
        }
        LearningStyle::Reading => {
            "This student learns by reading and writing. Use precise prose, \
             numbered sequences, definitions and a glossary of key terms."
        }
        LearningStyle::Kinesthetic => {
            "This student learns by doing. Anchor each concept in a worked \
             example, a real-world application or a short practice exercise."
        }
    }
}

/// Extract JSON from an LLM response, handling markdown code fences and
/// surrounding prose. Finds either an object or an array, whichever
/// opens first.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip a language identifier on the fence line.
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    let (open, close) = match (trimmed.find('{'), trimmed.find('[')) {
        (Some(obj), Some(arr)) if arr < obj => ('[', ']'),
        (Some(_), _) => ('{', '}'),
        (None, Some(_)) => ('[', ']'),
        (None, None) => return trimmed,
    };
    if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close)) {
        if end > start {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    /// Stub provider: returns a canned response, records what it was sent.
    #[derive(Debug)]
    struct Canned {
        response: &'static str,
        seen: Arc<Mutex<Vec<Message>>>,
    }

    impl Canned {
        fn new(response: &'static str) -> Self {
            Self {
                response,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for Canned {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            self.seen.lock().unwrap().extend(messages);
            Ok(self.response.to_string())
        }
    }

    fn transformer(response: &'static str) -> ContentTransformer {
        ContentTransformer::new(Box::new(Canned::new(response)), 0.7, 4096)
    }

    #[test]
    fn extract_json_finds_arrays() {
        assert_eq!(extract_json(r#"[{"front":"a"}]"#), r#"[{"front":"a"}]"#);
        assert_eq!(
            extract_json("Here you go:\n```json\n[1, 2]\n```"),
            "[1, 2]"
        );
        assert_eq!(extract_json("Sure! [1, 2] there."), "[1, 2]");
    }

    #[test]
    fn extract_json_finds_objects() {
        assert_eq!(extract_json(r#"text {"a": 1} trailing"#), r#"{"a": 1}"#);
        assert_eq!(
            extract_json("```\n{\"a\": 1}\n```"),
            r#"{"a": 1}"#
        );
    }

    #[test]
    fn extract_json_prefers_earliest_delimiter() {
        assert_eq!(extract_json(r#"[{"a": 1}]"#), r#"[{"a": 1}]"#);
        assert_eq!(extract_json(r#"{"a": [1, 2]}"#), r#"{"a": [1, 2]}"#);
    }

    #[test]
    fn style_templates_have_one_placeholder() {
        assert_eq!(NOTES_TEMPLATE.matches(STYLE_PLACEHOLDER).count(), 1);
        assert_eq!(AUDIO_TEMPLATE.matches(STYLE_PLACEHOLDER).count(), 1);
        assert_eq!(FLASHCARDS_TEMPLATE.matches(STYLE_PLACEHOLDER).count(), 0);
    }

    #[tokio::test]
    async fn flashcards_parse_from_fenced_json() {
        let response = "Here are your cards:\n```json\n[{\"front\":\"Q\",\"back\":\"A\"}]\n```";
        let t = transformer(response);
        let out = t
            .transform(TransformRequest::Flashcards {
                content: "cell biology notes".into(),
                count: 1,
            })
            .await
            .unwrap();
        match out {
            TransformOutput::Flashcards(cards) => {
                assert_eq!(cards.len(), 1);
                assert_eq!(cards[0].front, "Q");
            }
            other => panic!("wrong output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_content_is_rejected_before_any_llm_call() {
        let t = transformer("should never be used");
        let err = t
            .transform(TransformRequest::Quiz {
                content: "   \n ".into(),
                question_count: 5,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::EmptyContent));
    }

    #[tokio::test]
    async fn quiz_with_wrong_option_count_is_invalid() {
        let response = r#"[{"question":"?","options":["a","b","c"],"correct_index":0}]"#;
        let t = transformer(response);
        let err = t
            .transform(TransformRequest::Quiz {
                content: "some valid notes".into(),
                question_count: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn quiz_with_out_of_range_index_is_invalid() {
        let response = r#"[{"question":"?","options":["a","b","c","d"],"correct_index":4}]"#;
        let t = transformer(response);
        let err = t
            .transform(TransformRequest::Quiz {
                content: "some valid notes".into(),
                question_count: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn garbage_response_carries_raw_text_back() {
        let t = transformer("I refuse to answer in JSON.");
        let err = t
            .transform(TransformRequest::Flashcards {
                content: "some valid notes".into(),
                count: 3,
            })
            .await
            .unwrap_err();
        match err {
            TransformError::InvalidResponse { raw_response, .. } => {
                assert!(raw_response.contains("refuse"));
            }
            other => panic!("wrong error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn enhanced_notes_inject_style_guidance() {
        let provider = Canned::new("## Rewritten");
        let seen = provider.seen.clone();
        let t = ContentTransformer::new(Box::new(provider), 0.7, 4096);
        let out = t
            .transform(TransformRequest::EnhancedNotes {
                content: "photosynthesis notes".into(),
                style: LearningStyle::Kinesthetic,
            })
            .await
            .unwrap();
        assert!(matches!(out, TransformOutput::EnhancedNotes(ref s) if s == "## Rewritten"));
        let seen = seen.lock().unwrap();
        assert!(seen[0].content.contains("learns by doing"));
        assert!(!seen[0].content.contains(STYLE_PLACEHOLDER));
    }

    #[tokio::test]
    async fn consolidate_skips_empty_sections() {
        let provider = Canned::new("# Study guide");
        let seen = provider.seen.clone();
        let t = ContentTransformer::new(Box::new(provider), 0.7, 4096);
        t.transform(TransformRequest::Consolidate {
            sections: vec![
                NoteSection {
                    title: "Kept".into(),
                    content: "real content".into(),
                },
                NoteSection {
                    title: "Dropped".into(),
                    content: "   ".into(),
                },
            ],
        })
        .await
        .unwrap();
        let seen = seen.lock().unwrap();
        assert!(seen[1].content.contains("## Kept"));
        assert!(!seen[1].content.contains("## Dropped"));
    }

    #[tokio::test]
    async fn consolidate_with_nothing_usable_is_empty_content() {
        let t = transformer("never called");
        let err = t
            .transform(TransformRequest::Consolidate {
                sections: vec![NoteSection {
                    title: "Empty".into(),
                    content: "".into(),
                }],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, TransformError::EmptyContent));
    }
}
