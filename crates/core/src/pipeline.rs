use crate::classifier;
use crate::config::AppConfig;
use crate::models::{GeneratedNote, Note, NoteInput};
use crate::prompts;
use anyhow::Context;
use providers::gemini::{GeminiConfig, GeminiProvider, DEFAULT_BASE_URL};
use providers::noop::NoopProvider;
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::{GenerationOptions, Part, ProviderError, ProviderRegistry, TextGenerator};
use std::sync::Arc;
use storage::NoteStore;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("input text is empty")]
    EmptyInput,
    #[error("audio payload is {size} bytes, the limit is {limit}")]
    AudioTooLarge { size: usize, limit: usize },
    #[error("unsupported audio type: {0}")]
    UnsupportedAudio(String),
    #[error("note generation failed: {0}")]
    Provider(#[from] ProviderError),
    #[error("model returned empty notes")]
    EmptyNotes,
}

fn validate(input: &NoteInput, cfg: &AppConfig) -> Result<(), GenerationError> {
    match input {
        NoteInput::Text { content } if content.trim().is_empty() => Err(GenerationError::EmptyInput),
        NoteInput::Text { .. } => Ok(()),
        NoteInput::Audio {
            mime_type, data, ..
        } => {
            if !mime_type.starts_with("audio/") {
                return Err(GenerationError::UnsupportedAudio(mime_type.clone()));
            }
            if data.len() > cfg.limits.max_audio_bytes {
                return Err(GenerationError::AudioTooLarge {
                    size: data.len(),
                    limit: cfg.limits.max_audio_bytes,
                });
            }
            Ok(())
        }
    }
}

async fn generate_text(
    llm: &dyn TextGenerator,
    parts: &[Part],
    options: &GenerationOptions,
) -> Result<String, GenerationError> {
    let notes = llm.generate(parts, options).await?;
    let notes = notes.trim();
    if notes.is_empty() {
        return Err(GenerationError::EmptyNotes);
    }
    Ok(notes.to_string())
}

/// Asks the model to rewrite `notes` entirely in `language`. Keeps the
/// original notes when the call fails or comes back empty.
pub async fn correct_language(
    llm: &dyn TextGenerator,
    notes: String,
    language: &str,
    options: &GenerationOptions,
) -> String {
    let prompt = prompts::language_correction(&notes, language);
    match llm.generate(&[Part::Text(prompt)], options).await {
        Ok(corrected) if !corrected.trim().is_empty() => corrected.trim().to_string(),
        Ok(_) => {
            warn!(language, "language correction returned nothing, keeping original notes");
            notes
        }
        Err(e) => {
            warn!(error = %e, language, "language correction failed, keeping original notes");
            notes
        }
    }
}

/// Classifies the input, generates notes and runs the correction pass.
/// Nothing is persisted.
pub async fn generate_note(
    llm: &dyn TextGenerator,
    cfg: &AppConfig,
    input: &NoteInput,
) -> Result<GeneratedNote, GenerationError> {
    validate(input, cfg)?;
    let notes_options = cfg.generation.notes_options();

    let (generated_notes, classification) = match input {
        NoteInput::Text { content } => {
            let classification = classifier::classify(llm, content).await;
            info!(language = %classification.language, subject = %classification.subject, "text input classified");
            let prompt =
                prompts::text_notes(content, &classification.language, classification.subject);
            let notes = generate_text(llm, &[Part::Text(prompt)], &notes_options).await?;
            let notes = correct_language(
                llm,
                notes,
                &classification.language,
                &cfg.generation.correction_options(),
            )
            .await;
            (notes, classification)
        }
        NoteInput::Audio {
            transcript: Some(transcript),
            ..
        } if !transcript.trim().is_empty() => {
            let classification = classifier::classify(llm, transcript).await;
            info!(language = %classification.language, subject = %classification.subject, "transcript classified");
            let prompt = prompts::audio_transcript_notes(
                transcript,
                &classification.language,
                classification.subject,
            );
            let notes = generate_text(llm, &[Part::Text(prompt)], &notes_options).await?;
            let notes = correct_language(
                llm,
                notes,
                &classification.language,
                &cfg.generation.correction_options(),
            )
            .await;
            (notes, classification)
        }
        NoteInput::Audio {
            mime_type, data, ..
        } => {
            let parts = [
                Part::Text(prompts::audio_file_notes()),
                Part::InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            ];
            let notes = generate_text(llm, &parts, &notes_options).await?;
            // The language is only known once the model has heard the audio.
            let classification = classifier::classify(llm, &notes).await;
            info!(language = %classification.language, subject = %classification.subject, "audio notes classified");
            (notes, classification)
        }
    };

    Ok(GeneratedNote {
        input_type: input.input_type(),
        generated_notes,
        detected_language: classification.language,
        detected_subject: classification.subject,
        original_content: input.original_content(),
    })
}

pub async fn generate_and_save(
    llm: &dyn TextGenerator,
    store: &NoteStore,
    cfg: &AppConfig,
    input: &NoteInput,
) -> anyhow::Result<Note> {
    let generated = generate_note(llm, cfg, input).await?;
    let row = store
        .save(generated.into_new_note())
        .await
        .context("saving generated note")?;
    info!(id = row.id, "note stored");
    Note::try_from(row)
}

/// Opens the configured database and provider, then generates and stores a note.
pub async fn run_generate(config: &AppConfig, input: &NoteInput) -> anyhow::Result<Note> {
    let store = storage::open(&config.database.path)
        .await
        .context("opening note database")?;
    let registry = build_registry(config);
    let llm = registry.generator(None).with_context(|| {
        format!(
            "provider '{}' is not available (registered: {})",
            config.provider.name,
            registry.names().join(", ")
        )
    })?;
    generate_and_save(llm.as_ref(), &store, config, input).await
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new().with_generator("noop", Arc::new(NoopProvider));
    let base_url_for = |name: &str, fallback: String| {
        if config.provider.name == name {
            config.provider.base_url.clone().unwrap_or(fallback)
        } else {
            fallback
        }
    };

    if let Some(key) = std::env::var_os("GEMINI_API_KEY") {
        let provider = GeminiProvider::new(GeminiConfig {
            api_key: key.to_string_lossy().into_owned(),
            base_url: base_url_for("gemini", DEFAULT_BASE_URL.to_string()),
            model: config.provider.model.clone(),
        });
        reg = reg.with_generator("gemini", Arc::new(provider));
    }

    if let Some(key) = std::env::var_os("OPENAI_API_KEY") {
        let fallback = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let provider = OpenAiProvider::new(OpenAiConfig {
            api_key: key.to_string_lossy().into_owned(),
            base_url: base_url_for("openai", fallback),
            chat_model: config.provider.model.clone(),
        });
        reg = reg.with_generator("openai", Arc::new(provider));
    }

    reg.set_preferred(&config.provider.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::Subject;
    use providers::scripted::ScriptedProvider;

    #[test]
    fn audio_must_be_small_and_audio_typed() {
        let mut cfg = AppConfig::default();
        cfg.limits.max_audio_bytes = 4;
        let big = NoteInput::Audio {
            file_name: "a.mp3".into(),
            mime_type: "audio/mpeg".into(),
            data: vec![0; 5],
            transcript: None,
        };
        assert!(matches!(
            validate(&big, &cfg),
            Err(GenerationError::AudioTooLarge { size: 5, limit: 4 })
        ));
        let video = NoteInput::Audio {
            file_name: "a.mp4".into(),
            mime_type: "video/mp4".into(),
            data: vec![0; 1],
            transcript: None,
        };
        assert!(matches!(
            validate(&video, &cfg),
            Err(GenerationError::UnsupportedAudio(_))
        ));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_call() {
        let llm = ScriptedProvider::new(["French"]);
        let input = NoteInput::Text {
            content: "  \n".into(),
        };
        let err = generate_note(&llm, &AppConfig::default(), &input)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::EmptyInput));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn correction_failure_keeps_original_notes() {
        let llm = ScriptedProvider::failing();
        let notes = correct_language(
            &llm,
            "# Notes".to_string(),
            "French",
            &GenerationOptions::new(0.3, 100),
        )
        .await;
        assert_eq!(notes, "# Notes");
    }

    #[tokio::test]
    async fn primary_generation_failure_propagates() {
        let llm = ScriptedProvider::from_results(vec![
            Ok("French".into()),
            Ok("History".into()),
            Err(ProviderError::RequestFailed("quota".into())),
        ]);
        let input = NoteInput::Text {
            content: "La révolution de 1789 et la chute de la monarchie.".into(),
        };
        let err = generate_note(&llm, &AppConfig::default(), &input)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Provider(_)));
    }

    #[tokio::test]
    async fn text_flow_uses_detected_language_everywhere() {
        let llm = ScriptedProvider::new([
            "French",
            "History",
            "# La Révolution\nsome english left",
            "# La Révolution\ntout en français",
        ]);
        let input = NoteInput::Text {
            content: "La révolution de 1789 et la chute de la monarchie.".into(),
        };
        let note = generate_note(&llm, &AppConfig::default(), &input)
            .await
            .unwrap();
        assert_eq!(note.detected_language, "French");
        assert_eq!(note.detected_subject, Subject::History);
        assert_eq!(note.generated_notes, "# La Révolution\ntout en français");

        let calls = llm.calls();
        assert_eq!(calls.len(), 4);
        assert!(calls[2].prompt().contains("entirely in French"));
        assert_eq!(calls[2].options.max_output_tokens, 8192);
        assert!(calls[3].prompt().contains("some english left"));
    }
}
