use notes_core::config::AppConfig;
use notes_core::models::{InputType, NoteInput};
use notes_core::pipeline;
use notes_core::taxonomy::Subject;
use providers::scripted::ScriptedProvider;
use providers::ProviderError;
use storage::NoteFilter;

#[tokio::test]
async fn text_note_is_generated_and_stored() {
    let store = storage::open("sqlite::memory:").await.unwrap();
    let cfg = AppConfig::default();
    let llm = ScriptedProvider::new([
        "Spanish",
        "Physics.",
        "# Cinemática\nvelocidad y aceleración",
        "# Cinemática\nvelocidad y aceleración (corregido)",
    ]);
    let input = NoteInput::Text {
        content: "Hoy estudiamos la velocidad y la aceleración de los cuerpos.".into(),
    };

    let note = pipeline::generate_and_save(&llm, &store, &cfg, &input)
        .await
        .unwrap();
    assert!(note.id > 0);
    assert_eq!(note.input_type, InputType::Text);
    assert_eq!(note.detected_language, "Spanish");
    assert_eq!(note.detected_subject, Subject::Physics);
    assert!(note.generated_notes.ends_with("(corregido)"));
    assert_eq!(
        note.original_content,
        "Hoy estudiamos la velocidad y la aceleración de los cuerpos."
    );

    let stored = store.list(&NoteFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].detected_subject, "Physics");
}

#[tokio::test]
async fn audio_file_is_classified_from_generated_notes() {
    let store = storage::open("sqlite::memory:").await.unwrap();
    let cfg = AppConfig::default();
    let llm = ScriptedProvider::new([
        "# Einführung\nDie Ableitung und das Integral",
        "German",
        "Mathematics",
    ]);
    let input = NoteInput::Audio {
        file_name: "vorlesung.mp3".into(),
        mime_type: "audio/mpeg".into(),
        data: vec![0xFF, 0xFB, 0x90, 0x00],
        transcript: None,
    };

    let note = pipeline::generate_and_save(&llm, &store, &cfg, &input)
        .await
        .unwrap();
    assert_eq!(note.input_type, InputType::Audio);
    assert_eq!(note.detected_language, "German");
    assert_eq!(note.detected_subject, Subject::Mathematics);
    assert_eq!(note.original_content, "[Audio file: vorlesung.mp3]");

    let calls = llm.calls();
    // Generation, language, subject. No correction pass for audio files.
    assert_eq!(calls.len(), 3);
    assert!(calls[0].has_inline_data());
    assert!(calls[1].prompt().contains("Die Ableitung"));
}

#[tokio::test]
async fn transcript_is_treated_like_text() {
    let cfg = AppConfig::default();
    let llm = ScriptedProvider::new(["Italian", "Music", "# Armonia", "# Armonia (it)"]);
    let input = NoteInput::Audio {
        file_name: "lezione.wav".into(),
        mime_type: "audio/wav".into(),
        data: vec![1, 2, 3],
        transcript: Some("Oggi parliamo di armonia e melodia.".into()),
    };

    let note = pipeline::generate_note(&llm, &cfg, &input).await.unwrap();
    assert_eq!(note.detected_language, "Italian");
    assert_eq!(note.detected_subject, Subject::Music);
    assert_eq!(note.generated_notes, "# Armonia (it)");

    let calls = llm.calls();
    assert!(calls.iter().all(|c| !c.has_inline_data()));
    assert!(calls[2].prompt().contains("Transcript:"));
}

#[tokio::test]
async fn detection_failures_degrade_and_correction_failure_keeps_notes() {
    let cfg = AppConfig::default();
    let llm = ScriptedProvider::from_results(vec![
        Err(ProviderError::RequestFailed("down".into())),
        Err(ProviderError::RequestFailed("down".into())),
        Err(ProviderError::RequestFailed("down".into())),
        Ok("# Notes".into()),
        Err(ProviderError::RequestFailed("down".into())),
    ]);
    let input = NoteInput::Text {
        content: "Some lecture about nothing in particular.".into(),
    };

    let note = pipeline::generate_note(&llm, &cfg, &input).await.unwrap();
    assert_eq!(note.detected_language, "English");
    assert_eq!(note.detected_subject, Subject::General);
    assert_eq!(note.generated_notes, "# Notes");
}
