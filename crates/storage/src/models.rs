use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct NoteRow {
    pub id: i64,
    pub input_type: String,
    pub generated_notes: String,
    pub detected_language: String,
    pub detected_subject: String,
    pub original_content: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone)]
pub struct NewNote {
    pub input_type: String,
    pub generated_notes: String,
    pub detected_language: String,
    pub detected_subject: String,
    pub original_content: String,
}

#[derive(Debug, Clone, Default)]
pub struct NoteFilter {
    pub subject: Option<String>,
    pub language: Option<String>,
    pub input_type: Option<String>,
    pub search: Option<String>,
    pub limit: Option<u32>,
}
