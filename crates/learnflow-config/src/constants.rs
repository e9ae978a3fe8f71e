//! Static tables shared by the content features.

use serde::Serialize;

/// Model names used by the content backends.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AiModels {
    /// Gemini first, OpenAI as fallback.
    pub quiz_generator: &'static str,
    pub tutor_chat: &'static str,
}

pub const AI_MODELS: AiModels = AiModels {
    quiz_generator: "gemini-1.5-flash",
    tutor_chat: "gemini-1.5-flash",
};

/// Quiz generation parameters.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuizParams {
    pub num_questions: u32,
    pub num_options: u32,
    pub temperature: f32,
    pub max_tokens: u32,
}

pub const DEFAULT_QUIZ_PARAMS: QuizParams = QuizParams {
    num_questions: 5,
    num_options: 4,
    temperature: 0.7,
    max_tokens: 2000,
};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Language {
    pub id: &'static str,
    pub name: &'static str,
}

pub const SUPPORTED_LANGUAGES: &[Language] = &[
    Language {
        id: "english",
        name: "English",
    },
    Language {
        id: "hindi",
        name: "Hindi",
    },
    Language {
        id: "hinglish",
        name: "Hinglish",
    },
];
