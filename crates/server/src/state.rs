use studymorph_core::Config;
use studymorph_extract::ExtractionPipeline;
use studymorph_quiz::QuestionBank;
use studymorph_store::NoteStore;
use studymorph_transform::{ContentTransformer, SpeechProvider};

pub struct AppState {
    pub config: Config,
    /// Notes repository: local JSON file (guest mode) or hosted notes API.
    pub store: Box<dyn NoteStore>,
    pub pipeline: ExtractionPipeline,
    /// None when no LLM provider is configured; /transform routes answer 503.
    pub transformer: Option<ContentTransformer>,
    /// None when TTS is not configured; audio responses carry the script only.
    pub speech: Option<Box<dyn SpeechProvider>>,
    pub question_bank: QuestionBank,
    /// Client for fetches done by the /extract contract endpoint.
    pub http: reqwest::Client,
}
