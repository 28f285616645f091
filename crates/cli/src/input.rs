use anyhow::{Context, Result};
use notes_core::models::NoteInput;
use std::fs;
use std::path::Path;

pub fn guess_audio_mime(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| match ext.to_lowercase().as_str() {
            "mp3" => Some("audio/mpeg"),
            "wav" => Some("audio/wav"),
            "m4a" | "mp4a" => Some("audio/mp4"),
            "aac" => Some("audio/aac"),
            "ogg" | "oga" => Some("audio/ogg"),
            "flac" => Some("audio/flac"),
            "webm" => Some("audio/webm"),
            "aiff" | "aif" => Some("audio/aiff"),
            _ => None,
        })
        .map(|s| s.to_string())
}

/// Inline text wins over a file.
pub fn read_text(text: Option<String>, file: Option<&Path>) -> Result<String> {
    match (text, file) {
        (Some(t), _) => Ok(t),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        (None, None) => anyhow::bail!("either --text or --file is required"),
    }
}

pub fn text_input(text: Option<String>, file: Option<&Path>) -> Result<NoteInput> {
    let content = read_text(text, file)?;
    Ok(NoteInput::Text { content })
}

/// Sniffs the content first, then falls back to the file extension.
pub fn detect_audio_mime(path: &Path, data: &[u8]) -> Option<String> {
    infer::get(data)
        .map(|kind| kind.mime_type())
        .filter(|mime| mime.starts_with("audio/"))
        .map(|mime| mime.replacen("audio/x-", "audio/", 1))
        .or_else(|| guess_audio_mime(path))
}

pub fn audio_input(path: &Path, transcript: Option<&Path>) -> Result<NoteInput> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mime_type = detect_audio_mime(path, &data)
        .with_context(|| format!("unrecognised audio format: {}", path.display()))?;
    let transcript = transcript
        .map(|p| fs::read_to_string(p).with_context(|| format!("reading {}", p.display())))
        .transpose()?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    Ok(NoteInput::Audio {
        file_name,
        mime_type,
        data,
        transcript,
    })
}

/// Replacement notes for `edit`.
pub fn edited_notes(notes: Option<String>, file: Option<&Path>) -> Result<String> {
    let notes = match (notes, file) {
        (Some(n), _) => n,
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        (None, None) => anyhow::bail!("either --notes or --notes-file is required"),
    };
    if notes.trim().is_empty() {
        anyhow::bail!("refusing to replace notes with empty text");
    }
    Ok(notes)
}
