//! AI content transformations: flashcards, practice quizzes, rewritten
//! notes and narration scripts, generated from extracted note text by a
//! configurable LLM backend, plus text-to-speech for the audio path.

pub mod provider;
pub mod providers;
pub mod speech;
pub mod transformer;

pub use provider::{LlmError, LlmProvider, Message, Role};
pub use speech::{create_speech, SpeechError, SpeechProvider};
pub use transformer::{
    ContentTransformer, Flashcard, NoteSection, QuizItem, TransformError, TransformOutput,
    TransformRequest,
};
