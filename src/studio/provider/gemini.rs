use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::PortraitProvider;
use crate::db::repos::settings;
use crate::db::DbPool;
use crate::error::AppError;
use crate::studio::{input, prompt};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Settings key consulted when no API key env var is set.
const API_KEY_SETTING: &str = "gemini_api_key";

/// Gemini image-editing provider (generateContent with an inline source image).
pub struct GeminiPortraitProvider {
    http: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct InlineData<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "imageConfig")]
    image_config: ImageConfig,
}

#[derive(Serialize)]
struct ImageConfig {
    #[serde(rename = "aspectRatio")]
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    // The API has emitted both spellings; accept either.
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<CandidateInlineData>,
}

#[derive(Deserialize)]
struct CandidateInlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    data: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

// ============================================================================
// Provider
// ============================================================================

impl GeminiPortraitProvider {
    pub fn new(api_key: String) -> Self {
        // No request timeout: the generation call resolves or rejects on its
        // own schedule and the orchestrator never cancels it.
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
        }
    }

    /// Resolve the API key from the environment (`GEMINI_API_KEY`, then
    /// `GOOGLE_API_KEY`), falling back to the settings store so the key can
    /// be configured from the UI.
    pub fn from_config(pool: &DbPool) -> Result<Self, AppError> {
        let api_key = non_empty_env("GEMINI_API_KEY")
            .or_else(|| non_empty_env("GOOGLE_API_KEY"))
            .or_else(|| settings::get(pool, API_KEY_SETTING).ok().flatten())
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AppError::Generation("未配置 Gemini API Key".into()))?;
        Ok(Self::new(api_key))
    }

    #[cfg(test)]
    fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base, self.model)
    }

    fn build_request<'a>(
        original_image: &'a str,
        mime_type: &'a str,
        instruction: &'a str,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![
                    Part {
                        inline_data: Some(InlineData {
                            mime_type,
                            data: input::data_url_body(original_image),
                        }),
                        text: None,
                    },
                    Part {
                        inline_data: None,
                        text: Some(instruction),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                image_config: ImageConfig {
                    aspect_ratio: prompt::ASPECT_RATIO,
                },
            },
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pull the first image part out of a generateContent response.
fn first_image_data_url(response: &GenerateContentResponse) -> Option<String> {
    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            if let Some(inline) = &part.inline_data {
                if let Some(data) = inline.data.as_deref().filter(|d| !d.is_empty()) {
                    let mime = inline.mime_type.as_deref().unwrap_or("image/png");
                    return Some(format!("data:{mime};base64,{data}"));
                }
            }
        }
    }
    None
}

/// Derive a human-readable message from a non-success response body.
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("Gemini API error: {status}"))
}

#[async_trait]
impl PortraitProvider for GeminiPortraitProvider {
    async fn stylize(&self, original_image: &str, style_prompt: &str) -> Result<String, AppError> {
        let instruction = prompt::portrait_instruction(style_prompt);
        let mime = input::data_url_mime(original_image).unwrap_or("image/png");
        let body = Self::build_request(original_image, mime, &instruction);

        tracing::debug!(model = %self.model, "Dispatching portrait generation");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::warn!(status = %status, "Portrait generation rejected: {message}");
            return Err(AppError::Generation(message));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        first_image_data_url(&parsed)
            .ok_or_else(|| AppError::Generation("未能从 AI 响应中提取到图像".into()))
    }
}
