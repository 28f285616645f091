use notes_core::models::Note;
use notes_core::taxonomy::Subject;

const PREVIEW_CHARS: usize = 60;

fn preview(text: &str) -> String {
    let line = text
        .lines()
        .map(|l| l.trim_start_matches('#').trim())
        .find(|l| !l.is_empty())
        .unwrap_or("");
    if line.chars().count() > PREVIEW_CHARS {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

pub fn note_line(note: &Note) -> String {
    format!(
        "{:>5}  {:<16}  {:<12}  {:<5}  {}  {}",
        note.id,
        note.detected_subject.label(),
        note.detected_language,
        note.input_type.as_str(),
        note.created_at.format("%Y-%m-%d %H:%M"),
        preview(&note.generated_notes)
    )
}

pub fn note_detail(note: &Note) -> String {
    format!(
        "id:       {}\ninput:    {}\nlanguage: {}\nsubject:  {}\ncreated:  {}\nupdated:  {}\nsource:   {}\n\n{}",
        note.id,
        note.input_type,
        note.detected_language,
        note.detected_subject,
        note.created_at.to_rfc3339(),
        note.updated_at.to_rfc3339(),
        preview(&note.original_content),
        note.generated_notes
    )
}

pub fn subjects_table(counts: &[(String, i64)]) -> Vec<String> {
    Subject::ALL
        .iter()
        .map(|subject| {
            let stored = counts
                .iter()
                .find(|(label, _)| label == subject.label())
                .map(|(_, n)| *n)
                .unwrap_or(0);
            format!(
                "{:<16}  {:>3} keywords  {:>5} notes",
                subject.label(),
                subject.keywords().len(),
                stored
            )
        })
        .collect()
}
