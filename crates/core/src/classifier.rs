use crate::models::Classification;
use crate::prompts;
use crate::taxonomy::{Subject, SubjectScores, SYNONYMS};
use providers::{GenerationOptions, Part, TextGenerator};
use tracing::{debug, warn};

/// Returned by language detection when the model could not be used.
pub const UNKNOWN_LANGUAGE: &str = "unknown";
/// Language assumed when detection stays inconclusive.
pub const DEFAULT_LANGUAGE: &str = "English";

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

fn language_options() -> GenerationOptions {
    GenerationOptions::new(0.1, 20)
}

fn subject_options() -> GenerationOptions {
    GenerationOptions::new(0.0, 20)
}

/// First line, cut at the first period, trimmed.
fn first_sentence(raw: &str) -> &str {
    let line = raw.trim().lines().next().unwrap_or("");
    line.split('.').next().unwrap_or("").trim()
}

pub fn clean_language_answer(raw: &str) -> String {
    first_sentence(raw).to_string()
}

pub fn clean_subject_answer(raw: &str) -> String {
    let unquoted: String = raw.chars().filter(|c| !QUOTE_CHARS.contains(c)).collect();
    first_sentence(&unquoted).to_string()
}

/// Answers that warrant one more detection attempt.
pub fn needs_language_retry(language: &str) -> bool {
    language == UNKNOWN_LANGUAGE || language.contains("English") || language.contains("##")
}

pub fn resolve_language(language: String) -> String {
    if language == UNKNOWN_LANGUAGE {
        DEFAULT_LANGUAGE.to_string()
    } else {
        language
    }
}

/// Maps a cleaned model answer onto the taxonomy.
///
/// Tries, in order: exact label, label contained in the answer, synonym
/// contained in the answer. All comparisons ignore case.
pub fn normalize_subject(cleaned: &str) -> Option<Subject> {
    let lowered = cleaned.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if let Ok(subject) = lowered.parse::<Subject>() {
        return Some(subject);
    }
    if let Some(subject) = Subject::ALL
        .iter()
        .find(|s| lowered.contains(&s.label().to_lowercase()))
    {
        return Some(*subject);
    }
    SYNONYMS
        .iter()
        .find(|(alias, _)| lowered.contains(alias))
        .map(|(_, subject)| *subject)
}

/// Combines the model vote with the keyword scores.
///
/// A model vote is overridden only by a different keyword winner scoring at
/// least 2 and strictly more than the model's own label.
pub fn decide_subject(model_vote: Option<Subject>, scores: &SubjectScores) -> Subject {
    let (top, top_score) = scores.top();
    match model_vote {
        Some(model) => {
            let model_score = scores.score(model);
            if top != model && top_score >= 2 && top_score > model_score {
                top
            } else {
                model
            }
        }
        None if top_score > 0 => top,
        None => Subject::General,
    }
}

/// Asks the model for the language name. Never fails; returns
/// [`UNKNOWN_LANGUAGE`] when the call fails or the input is blank.
pub async fn detect_language(llm: &dyn TextGenerator, text: &str) -> String {
    if text.trim().is_empty() {
        return UNKNOWN_LANGUAGE.to_string();
    }
    let prompt = prompts::language_detection(text);
    match llm.generate(&[Part::Text(prompt)], &language_options()).await {
        Ok(answer) => {
            let language = clean_language_answer(&answer);
            if language.is_empty() {
                UNKNOWN_LANGUAGE.to_string()
            } else {
                language
            }
        }
        Err(e) => {
            warn!(error = %e, "language detection failed");
            UNKNOWN_LANGUAGE.to_string()
        }
    }
}

/// Runs [`detect_language`] and re-runs it once with the same input when the
/// first answer is suspicious. The second answer is kept as is.
pub async fn detect_language_with_retry(llm: &dyn TextGenerator, text: &str) -> String {
    let first = detect_language(llm, text).await;
    if !needs_language_retry(&first) {
        return first;
    }
    debug!(first = %first, "retrying language detection");
    detect_language(llm, text).await
}

/// Model vote plus keyword heuristic. Never fails; returns
/// [`Subject::General`] when the call fails or the input is blank.
pub async fn detect_subject(llm: &dyn TextGenerator, text: &str) -> Subject {
    if text.trim().is_empty() {
        return Subject::General;
    }
    let prompt = prompts::subject_detection(text);
    let answer = match llm.generate(&[Part::Text(prompt)], &subject_options()).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "subject detection failed");
            return Subject::General;
        }
    };
    let cleaned = clean_subject_answer(&answer);
    let model_vote = normalize_subject(&cleaned);
    let scores = SubjectScores::compute(text);
    let subject = decide_subject(model_vote, &scores);
    debug!(
        answer = %cleaned,
        model_vote = ?model_vote,
        heuristic = ?scores.top(),
        subject = %subject,
        "subject detected"
    );
    subject
}

/// Language (with retry and fallback) then subject, sequentially.
pub async fn classify(llm: &dyn TextGenerator, text: &str) -> Classification {
    let language = resolve_language(detect_language_with_retry(llm, text).await);
    let subject = detect_subject(llm, text).await;
    Classification { language, subject }
}

#[cfg(test)]
mod tests {
    use super::*;
    use providers::scripted::ScriptedProvider;

    #[test]
    fn subject_answer_cleaning() {
        assert_eq!(
            clean_subject_answer("Computer Science.\nExtra text"),
            "Computer Science"
        );
        assert_eq!(clean_subject_answer("\u{201C}Physics\u{201D}"), "Physics");
        assert_eq!(clean_subject_answer("  'History'  "), "History");
    }

    #[test]
    fn language_answer_cleaning() {
        assert_eq!(clean_language_answer("French.\nThe text is French."), "French");
        assert_eq!(clean_language_answer("  Spanish  "), "Spanish");
        assert_eq!(clean_language_answer(""), "");
    }

    #[test]
    fn normalization_order() {
        assert_eq!(
            normalize_subject("Computer Science"),
            Some(Subject::ComputerScience)
        );
        assert_eq!(normalize_subject("mathematics"), Some(Subject::Mathematics));
        assert_eq!(
            normalize_subject("The subject is Biology"),
            Some(Subject::Biology)
        );
        assert_eq!(
            normalize_subject("I think its about coding"),
            Some(Subject::Programming)
        );
        assert_eq!(normalize_subject("no idea"), None);
        assert_eq!(normalize_subject(""), None);
    }

    #[test]
    fn retry_triggers() {
        assert!(needs_language_retry("unknown"));
        assert!(needs_language_retry("English"));
        assert!(needs_language_retry("British English"));
        assert!(needs_language_retry("## Language"));
        assert!(!needs_language_retry("French"));
    }

    #[test]
    fn unknown_language_resolves_to_english() {
        assert_eq!(resolve_language("unknown".into()), "English");
        assert_eq!(resolve_language("Korean".into()), "Korean");
    }

    #[test]
    fn strong_heuristic_overrides_disagreeing_model() {
        let scores = SubjectScores::from_pairs(&[(Subject::Chemistry, 3), (Subject::Physics, 1)]);
        assert_eq!(
            decide_subject(Some(Subject::Physics), &scores),
            Subject::Chemistry
        );
    }

    #[test]
    fn weak_or_tied_heuristic_keeps_model_vote() {
        let weak = SubjectScores::from_pairs(&[(Subject::Chemistry, 1)]);
        assert_eq!(decide_subject(Some(Subject::Art), &weak), Subject::Art);

        let tied = SubjectScores::from_pairs(&[(Subject::Chemistry, 2), (Subject::Physics, 2)]);
        assert_eq!(
            decide_subject(Some(Subject::Physics), &tied),
            Subject::Physics
        );

        let agree = SubjectScores::from_pairs(&[(Subject::Music, 5)]);
        assert_eq!(decide_subject(Some(Subject::Music), &agree), Subject::Music);
    }

    #[test]
    fn no_model_vote_falls_back_to_heuristic_then_general() {
        let some = SubjectScores::from_pairs(&[(Subject::Sports, 1)]);
        assert_eq!(decide_subject(None, &some), Subject::Sports);
        let none = SubjectScores::from_pairs(&[]);
        assert_eq!(decide_subject(None, &none), Subject::General);
    }

    #[test]
    fn decision_always_lands_in_taxonomy() {
        for model in Subject::ALL.iter().copied().map(Some).chain([None]) {
            for (i, subject) in Subject::ALL.iter().enumerate() {
                let scores = SubjectScores::from_pairs(&[(*subject, i % 4)]);
                let decided = decide_subject(model, &scores);
                assert!(Subject::ALL.contains(&decided));
            }
        }
    }

    #[tokio::test]
    async fn failures_return_sentinels() {
        let llm = ScriptedProvider::failing();
        assert_eq!(detect_language(&llm, "Bonjour à tous").await, "unknown");
        assert_eq!(detect_subject(&llm, "Bonjour à tous").await, Subject::General);
    }

    #[tokio::test]
    async fn blank_input_skips_the_model() {
        let llm = ScriptedProvider::new(["French", "Physics"]);
        assert_eq!(detect_language(&llm, "   ").await, "unknown");
        assert_eq!(detect_subject(&llm, "").await, Subject::General);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn keywords_win_without_usable_model_answer() {
        let llm = ScriptedProvider::new(["I'm not sure."]);
        let text = "Today: the integral, the derivative and the fundamental theorem.";
        assert_eq!(detect_subject(&llm, text).await, Subject::Mathematics);
    }

    #[tokio::test]
    async fn synonym_answer_is_normalized() {
        let llm = ScriptedProvider::new(["I think it's about coding"]);
        assert_eq!(
            detect_subject(&llm, "we talked for an hour").await,
            Subject::Programming
        );
    }

    #[tokio::test]
    async fn heuristic_overrides_model_when_keywords_are_strong() {
        let llm = ScriptedProvider::new(["History"]);
        let text = "Balancing a chemical reaction: each molecule, the catalyst and oxidation states.";
        assert_eq!(detect_subject(&llm, text).await, Subject::Chemistry);
    }

    #[tokio::test]
    async fn subject_call_uses_zero_temperature() {
        let llm = ScriptedProvider::new(["Music"]);
        detect_subject(&llm, "a melody").await;
        let calls = llm.calls();
        assert_eq!(calls[0].options.temperature, 0.0);
        assert!(calls[0].prompt().contains("Entertainment"));
    }

    #[tokio::test]
    async fn suspicious_language_is_rerolled_once() {
        let llm = ScriptedProvider::new(["## English", "German", "Polish"]);
        assert_eq!(detect_language_with_retry(&llm, "Guten Tag").await, "German");
        assert_eq!(llm.call_count(), 2);

        let llm = ScriptedProvider::new(["English", "English"]);
        assert_eq!(detect_language_with_retry(&llm, "Hello").await, "English");
        assert_eq!(llm.call_count(), 2);

        let llm = ScriptedProvider::new(["Japanese"]);
        assert_eq!(detect_language_with_retry(&llm, "こんにちは").await, "Japanese");
        assert_eq!(llm.call_count(), 1);

        // Both calls identical: the retry is a re-roll, not a new question.
        let llm = ScriptedProvider::new(["unknown", "Dutch"]);
        detect_language_with_retry(&llm, "Goedemorgen").await;
        let calls = llm.calls();
        assert_eq!(calls[0].prompt(), calls[1].prompt());
    }

    #[tokio::test]
    async fn classify_falls_back_to_english() {
        let llm = ScriptedProvider::from_results(vec![
            Err(providers::ProviderError::NotImplemented),
            Err(providers::ProviderError::NotImplemented),
            Ok("Physics".to_string()),
        ]);
        let result = classify(&llm, "momentum and velocity").await;
        assert_eq!(result.language, "English");
        assert_eq!(result.subject, Subject::Physics);
    }

    #[tokio::test]
    async fn keyword_vote_scans_text_past_the_model_sample() {
        let mut text = "x".repeat(2500);
        text.push_str(" integral derivative theorem");
        let llm = ScriptedProvider::new(["no idea"]);
        let subject = detect_subject(&llm, &text).await;
        assert!(!llm.calls()[0].prompt().contains("integral"));
        assert_eq!(subject, Subject::Mathematics);
    }
}
