use crate::{GenerationOptions, Part, ProviderError, TextGenerator};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub chat_model: String,
}

/// OpenAI-compatible chat completions. Text parts only.
#[derive(Clone)]
pub struct OpenAiProvider {
    client: Client,
    cfg: Arc<OpenAiConfig>,
}

impl OpenAiProvider {
    pub fn new(cfg: OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }
}

fn join_text_parts(parts: &[Part]) -> Result<String, ProviderError> {
    let mut texts = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            Part::Text(t) => texts.push(t.as_str()),
            Part::InlineData { mime_type, .. } => {
                return Err(ProviderError::Unsupported(format!(
                    "inline {} data is not supported by chat completions",
                    mime_type
                )))
            }
        }
    }
    Ok(texts.join("\n\n"))
}

#[async_trait::async_trait]
impl TextGenerator for OpenAiProvider {
    async fn generate(
        &self,
        parts: &[Part],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        #[derive(serde::Serialize)]
        struct ChatMessage<'a> {
            role: &'static str,
            content: &'a str,
        }
        #[derive(serde::Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
            max_tokens: u32,
            #[serde(skip_serializing_if = "Option::is_none")]
            top_p: Option<f32>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessageResp,
        }
        #[derive(Deserialize)]
        struct ChatMessageResp {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct ChatApiResponse {
            choices: Vec<Choice>,
        }

        let prompt = join_text_parts(parts)?;
        let body = ChatRequest {
            model: &self.cfg.chat_model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: options.temperature,
            max_tokens: options.max_output_tokens,
            top_p: options.top_p,
        };

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.cfg.base_url))
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let parsed: ChatApiResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::RequestFailed("response had no choices".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_audio_is_rejected() {
        let parts = vec![
            Part::text("notes please"),
            Part::InlineData {
                mime_type: "audio/mpeg".into(),
                data: vec![1, 2, 3],
            },
        ];
        assert!(matches!(
            join_text_parts(&parts),
            Err(ProviderError::Unsupported(_))
        ));
    }

    #[test]
    fn text_parts_are_joined() {
        let parts = vec![Part::text("a"), Part::text("b")];
        assert_eq!(join_text_parts(&parts).unwrap(), "a\n\nb");
    }
}
