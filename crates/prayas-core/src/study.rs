//! Study-companion requests built on top of the gateway
//!
//! Each feature (mentor chat, daily affirmation, answer evaluation) fixes a
//! persona and a sampling temperature and shapes the caller's input into a
//! [`GenerationRequest`].

use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, Result};
use crate::providers::types::{Attachment, GenerationRequest};

const MENTOR_TEMPERATURE: f32 = 0.6;
const AFFIRMATION_TEMPERATURE: f32 = 0.7;
const EVALUATION_TEMPERATURE: f32 = 0.4;

const AFFIRMATION_SYSTEM: &str = "You are a gentle motivation coach for UPSC aspirants. Write 1 short daily affirmation (1-2 sentences).";
const AFFIRMATION_PROMPT: &str = "Generate today's affirmation.";

const EVALUATOR_SYSTEM: &str = "You are a UPSC answer evaluator. Provide rubric-based feedback with structure, keywords, flow, tone, and improvement tips. Keep it concise but actionable.";
const EVALUATOR_BASE_PROMPT: &str = "Evaluate this UPSC answer and provide bullet-point feedback.";

pub const MISSING_KEY_MESSAGE: &str = "AI key missing. Configure .env.local.";

/// Persona used by the mentor chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MentorMode {
    #[default]
    Strategy,
    Motivation,
    Counselling,
}

impl MentorMode {
    pub fn system_instruction(&self) -> &'static str {
        match self {
            Self::Strategy => {
                "You are a strategic UPSC mentor. Give structured, step-by-step guidance. Keep tone calm and practical."
            }
            Self::Motivation => {
                "You are an empathetic motivation coach for UPSC aspirants. Encourage consistency and self-compassion."
            }
            Self::Counselling => {
                "You are a supportive, non-medical counsellor. Provide gentle coping suggestions and encourage seeking professional help for severe distress."
            }
        }
    }

    /// Lenient parse: unknown modes get the strategy mentor
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl FromStr for MentorMode {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "strategy" => Ok(Self::Strategy),
            "motivation" => Ok(Self::Motivation),
            "counselling" => Ok(Self::Counselling),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown mentor mode: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MentorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Strategy => "strategy",
            Self::Motivation => "motivation",
            Self::Counselling => "counselling",
        };
        f.write_str(name)
    }
}

/// A mentor chat turn
pub fn mentor_request(message: &str, mode: MentorMode) -> Result<GenerationRequest> {
    if message.trim().is_empty() {
        return Err(GatewayError::InvalidRequest("Message required".to_string()));
    }
    Ok(GenerationRequest::new(mode.system_instruction(), message).with_temperature(MENTOR_TEMPERATURE))
}

/// Today's affirmation
pub fn affirmation_request() -> GenerationRequest {
    GenerationRequest::new(AFFIRMATION_SYSTEM, AFFIRMATION_PROMPT).with_temperature(AFFIRMATION_TEMPERATURE)
}

/// Feedback on a written answer, given as text, a photo of the page, or both
pub fn evaluation_request(answer: Option<&str>, image: Option<Attachment>) -> Result<GenerationRequest> {
    let answer = answer.filter(|a| !a.trim().is_empty());
    let image = image.filter(|i| !i.data.is_empty());

    let prompt = match (answer, &image) {
        (Some(answer), Some(_)) => format!(
            "{}\n\nAnswer text:\n{}\n\nUse the attached image as reference.",
            EVALUATOR_BASE_PROMPT, answer
        ),
        (Some(answer), None) => format!("{}\n\n{}", EVALUATOR_BASE_PROMPT, answer),
        (None, Some(_)) => format!("{}\n\nUse the attached image.", EVALUATOR_BASE_PROMPT),
        (None, None) => {
            return Err(GatewayError::InvalidRequest(
                "Answer text or image required".to_string(),
            ));
        }
    };

    let mut request = GenerationRequest::new(EVALUATOR_SYSTEM, prompt).with_temperature(EVALUATION_TEMPERATURE);
    if let Some(image) = image {
        request = request.with_attachment(image);
    }
    Ok(request)
}

/// Message to show the student when a feature's call failed
pub fn user_message(err: &GatewayError, feature: &str) -> String {
    match err {
        GatewayError::MissingCredential { .. } => MISSING_KEY_MESSAGE.to_string(),
        GatewayError::UnsupportedCapability { .. } => {
            "Image input is only supported with Gemini.".to_string()
        }
        GatewayError::InvalidRequest(reason) => reason.clone(),
        _ => format!("{} unavailable offline.", feature),
    }
}
