//! Deterministic generator that replays canned answers in order.

use crate::{GenerationOptions, Part, ProviderError, TextGenerator};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub parts: Vec<Part>,
    pub options: GenerationOptions,
}

impl RecordedCall {
    pub fn prompt(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn has_inline_data(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p, Part::InlineData { .. }))
    }
}

#[derive(Debug, Default)]
pub struct ScriptedProvider {
    answers: Mutex<VecDeque<Result<String, ProviderError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(|a| Ok(a.into())).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn from_results(answers: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedProvider {
    async fn generate(
        &self,
        parts: &[Part],
        options: &GenerationOptions,
    ) -> Result<String, ProviderError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                parts: parts.to_vec(),
                options: options.clone(),
            });
        }
        let next = self.answers.lock().ok().and_then(|mut a| a.pop_front());
        next.unwrap_or_else(|| Err(ProviderError::RequestFailed("script exhausted".into())))
    }
}
