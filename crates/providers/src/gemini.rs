use crate::{GenerationOptions, Part, ProviderError, TextGenerator};
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Client for the `generateContent` endpoint. Audio is sent inline, base64 encoded.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    cfg: Arc<GeminiConfig>,
}

impl GeminiProvider {
    pub fn new(cfg: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.model
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content>,
    generation_config: &'a GenerationOptions,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text { text: String },
    Inline { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
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
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn to_wire(parts: &[Part]) -> Vec<WirePart> {
    parts
        .iter()
        .map(|p| match p {
            Part::Text(text) => WirePart::Text { text: text.clone() },
            Part::InlineData { mime_type, data } => WirePart::Inline {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(data),
                },
            },
        })
        .collect()
}

fn first_candidate_text(resp: GenerateResponse) -> Option<String> {
    let content = resp.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiProvider {
    async fn generate(
        &self,
        parts: &[Part],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: to_wire(parts),
            }],
            generation_config: options,
        };
        debug!(model = %self.cfg.model, parts = parts.len(), "gemini generateContent");

        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.cfg.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        first_candidate_text(parsed)
            .ok_or_else(|| ProviderError::RequestFailed("response had no candidate text".into()))
    }
}
