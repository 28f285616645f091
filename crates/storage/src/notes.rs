use crate::models::{NewNote, NoteFilter, NoteRow};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
#[error("note {0} not found")]
pub struct NoteNotFound(pub i64);

const NOTE_COLUMNS: &str = "id, input_type, generated_notes, detected_language, detected_subject, original_content, created_at, updated_at";

#[derive(Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, note: NewNote) -> anyhow::Result<NoteRow> {
        let result = sqlx::query(
            r#"
            INSERT INTO notes (input_type, generated_notes, detected_language, detected_subject, original_content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, CAST(strftime('%s','now') AS INTEGER), CAST(strftime('%s','now') AS INTEGER))
            "#,
        )
        .bind(&note.input_type)
        .bind(&note.generated_notes)
        .bind(&note.detected_language)
        .bind(&note.detected_subject)
        .bind(&note.original_content)
        .execute(&self.pool)
        .await?;
        let id = result.last_insert_rowid();
        debug!(id, subject = %note.detected_subject, "note saved");
        self.get(id).await
    }

    pub async fn find(&self, id: i64) -> anyhow::Result<Option<NoteRow>> {
        let sql = format!("SELECT {} FROM notes WHERE id = ?1", NOTE_COLUMNS);
        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn get(&self, id: i64) -> anyhow::Result<NoteRow> {
        self.find(id).await?.ok_or_else(|| NoteNotFound(id).into())
    }

    /// Replaces the generated notes of an existing note and bumps `updated_at`.
    pub async fn update_generated_notes(&self, id: i64, notes: &str) -> anyhow::Result<NoteRow> {
        let result = sqlx::query(
            "UPDATE notes SET generated_notes = ?1, updated_at = CAST(strftime('%s','now') AS INTEGER) WHERE id = ?2",
        )
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(NoteNotFound(id).into());
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> anyhow::Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(NoteNotFound(id).into());
        }
        Ok(())
    }

    /// Newest first.
    pub async fn list(&self, filter: &NoteFilter) -> anyhow::Result<Vec<NoteRow>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM notes WHERE 1 = 1", NOTE_COLUMNS));
        if let Some(subject) = &filter.subject {
            qb.push(" AND detected_subject = ").push_bind(subject.clone());
        }
        if let Some(language) = &filter.language {
            qb.push(" AND lower(detected_language) = lower(")
                .push_bind(language.clone())
                .push(")");
        }
        if let Some(input_type) = &filter.input_type {
            qb.push(" AND input_type = ").push_bind(input_type.clone());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (generated_notes LIKE ")
                .push_bind(pattern.clone())
                .push(" OR original_content LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        qb.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }
        let rows = qb.build_query_as::<NoteRow>().fetch_all(&self.pool).await?;
        Ok(rows)
    }

    pub async fn count_by_subject(&self) -> anyhow::Result<Vec<(String, i64)>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT detected_subject, COUNT(*) FROM notes GROUP BY detected_subject ORDER BY COUNT(*) DESC, detected_subject",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
