//! Prompt templates sent to the generation model.

use crate::taxonomy::Subject;

/// Characters of input used for language detection.
pub const LANGUAGE_SAMPLE_CHARS: usize = 500;
/// Characters of input used for subject detection.
pub const SUBJECT_SAMPLE_CHARS: usize = 2000;

/// Returns at most `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub fn language_detection(text: &str) -> String {
    format!(
        "Identify the language of the following text. \
         Respond with only the name of the language in English (for example: English, French, Spanish, Arabic). \
         Do not add any explanation, punctuation or formatting.\n\n\
         Text:\n{}",
        truncate_chars(text, LANGUAGE_SAMPLE_CHARS)
    )
}

pub fn subject_detection(text: &str) -> String {
    let labels: Vec<&str> = Subject::ALL.iter().map(Subject::label).collect();
    format!(
        "Classify the academic subject of the following lecture content. \
         Choose exactly one of these subjects and respond with the subject name only, \
         spelled exactly as listed: {}.\n\n\
         Content:\n{}",
        labels.join(", "),
        truncate_chars(text, SUBJECT_SAMPLE_CHARS)
    )
}

const NOTE_SECTIONS: &str = "Structure the notes in Markdown with these sections:\n\
1. A title (# heading)\n\
2. Summary: a short overview of the lecture\n\
3. Key Concepts: the main ideas, each with a brief explanation\n\
4. Detailed Notes: organised by topic with bullet points\n\
5. Examples: worked examples or illustrations mentioned in the lecture\n\
6. Key Takeaways: the points a student should remember";

pub fn text_notes(content: &str, language: &str, subject: Subject) -> String {
    format!(
        "You are an expert {subject} teacher preparing lecture notes for students.\n\
         Create comprehensive, well-organised study notes from the lecture content below.\n\
         The content is written in {language}. Write the notes entirely in {language}; \
         do not translate them into any other language.\n\n\
         {sections}\n\n\
         Lecture content:\n{content}",
        subject = subject.label(),
        language = language,
        sections = NOTE_SECTIONS,
        content = content,
    )
}

pub fn audio_file_notes() -> String {
    format!(
        "You are an expert teacher preparing lecture notes for students.\n\
         Listen to the attached lecture recording. First determine the language that is spoken, \
         then create comprehensive, well-organised study notes written entirely in that same language. \
         Do not translate the notes into English unless the lecture itself is in English.\n\n\
         {}",
        NOTE_SECTIONS
    )
}

pub fn audio_transcript_notes(transcript: &str, language: &str, subject: Subject) -> String {
    format!(
        "You are an expert {subject} teacher preparing lecture notes for students.\n\
         Below is the transcript of a recorded lecture, spoken in {language}. \
         Transcripts may contain filler words, repetitions and recognition errors; ignore them.\n\
         Create comprehensive, well-organised study notes written entirely in {language}.\n\n\
         {sections}\n\n\
         Transcript:\n{transcript}",
        subject = subject.label(),
        language = language,
        sections = NOTE_SECTIONS,
        transcript = transcript,
    )
}

pub fn language_correction(notes: &str, language: &str) -> String {
    format!(
        "Rewrite the following lecture notes so that they are written entirely in {language}. \
         Translate any part that is in another language into {language}. \
         Keep the Markdown structure, headings and technical content unchanged. \
         Respond with the rewritten notes only.\n\n\
         Notes:\n{notes}",
        language = language,
        notes = notes,
    )
}
