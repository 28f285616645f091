use crate::taxonomy::Subject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storage::models::{NewNote, NoteRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Audio,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Audio => "audio",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(InputType::Text),
            "audio" => Ok(InputType::Audio),
            other => anyhow::bail!("unknown input type: {}", other),
        }
    }
}

/// What the user submitted.
#[derive(Debug, Clone)]
pub enum NoteInput {
    Text {
        content: String,
    },
    Audio {
        file_name: String,
        mime_type: String,
        data: Vec<u8>,
        transcript: Option<String>,
    },
}

impl NoteInput {
    pub fn input_type(&self) -> InputType {
        match self {
            NoteInput::Text { .. } => InputType::Text,
            NoteInput::Audio { .. } => InputType::Audio,
        }
    }

    /// Raw text for text input, a file name placeholder for audio.
    pub fn original_content(&self) -> String {
        match self {
            NoteInput::Text { content } => content.clone(),
            NoteInput::Audio { file_name, .. } => format!("[Audio file: {}]", file_name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub language: String,
    pub subject: Subject,
}

/// Generation output that has not been persisted yet.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedNote {
    pub input_type: InputType,
    pub generated_notes: String,
    pub detected_language: String,
    pub detected_subject: Subject,
    pub original_content: String,
}

impl GeneratedNote {
    pub fn into_new_note(self) -> NewNote {
        NewNote {
            input_type: self.input_type.as_str().to_string(),
            generated_notes: self.generated_notes,
            detected_language: self.detected_language,
            detected_subject: self.detected_subject.label().to_string(),
            original_content: self.original_content,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: i64,
    pub input_type: InputType,
    pub generated_notes: String,
    pub detected_language: String,
    pub detected_subject: Subject,
    pub original_content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<NoteRow> for Note {
    type Error = anyhow::Error;

    fn try_from(row: NoteRow) -> Result<Self, Self::Error> {
        // Rows written outside this crate may carry a label we do not know.
        let detected_subject = row.detected_subject.parse().unwrap_or(Subject::General);
        Ok(Note {
            id: row.id,
            input_type: row.input_type.parse()?,
            generated_notes: row.generated_notes,
            detected_language: row.detected_language,
            detected_subject,
            original_content: row.original_content,
            created_at: timestamp(row.created_at)?,
            updated_at: timestamp(row.updated_at)?,
        })
    }
}

fn timestamp(secs: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .ok_or_else(|| anyhow::anyhow!("timestamp out of range: {}", secs))
}
