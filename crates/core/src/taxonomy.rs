//! The fixed subject taxonomy, its keyword lists and the synonym table.
//!
//! All tables are `const` and ordered; iteration order is the tie-breaker for
//! keyword scoring and label matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Mathematics,
    Physics,
    Chemistry,
    Biology,
    Programming,
    #[serde(rename = "Computer Science")]
    ComputerScience,
    History,
    Geography,
    Literature,
    Language,
    Art,
    Music,
    Sports,
    Entertainment,
    General,
}

impl Subject {
    /// Declaration order of the taxonomy.
    pub const ALL: [Subject; 15] = [
        Subject::Mathematics,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::Programming,
        Subject::ComputerScience,
        Subject::History,
        Subject::Geography,
        Subject::Literature,
        Subject::Language,
        Subject::Art,
        Subject::Music,
        Subject::Sports,
        Subject::Entertainment,
        Subject::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Subject::Mathematics => "Mathematics",
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Biology => "Biology",
            Subject::Programming => "Programming",
            Subject::ComputerScience => "Computer Science",
            Subject::History => "History",
            Subject::Geography => "Geography",
            Subject::Literature => "Literature",
            Subject::Language => "Language",
            Subject::Art => "Art",
            Subject::Music => "Music",
            Subject::Sports => "Sports",
            Subject::Entertainment => "Entertainment",
            Subject::General => "General",
        }
    }

    /// Lower-case keywords scored against input text.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Subject::Mathematics => &[
                "equation",
                "theorem",
                "integral",
                "derivative",
                "algebra",
                "geometry",
                "calculus",
                "matrix",
                "polynomial",
                "probability",
                "statistics",
                "logarithm",
                "trigonometry",
                "fraction",
                "lemma",
            ],
            Subject::Physics => &[
                "velocity",
                "acceleration",
                "force",
                "energy",
                "momentum",
                "quantum",
                "gravity",
                "newton",
                "thermodynamics",
                "electromagnetic",
                "wavelength",
                "friction",
                "relativity",
                "particle",
                "kinetic",
            ],
            Subject::Chemistry => &[
                "molecule",
                "atom",
                "chemical",
                "reaction",
                "compound",
                "periodic table",
                "acid",
                "covalent",
                "electron",
                "oxidation",
                "catalyst",
                "molar",
                "isotope",
                "ionic",
                "stoichiometry",
            ],
            Subject::Biology => &[
                "cell",
                "dna",
                "genetic",
                "evolution",
                "organism",
                "protein",
                "photosynthesis",
                "species",
                "enzyme",
                "mitosis",
                "ecosystem",
                "anatomy",
                "bacteria",
                "chromosome",
                "metabolism",
            ],
            Subject::Programming => &[
                "code",
                "function",
                "variable",
                "python",
                "javascript",
                "compiler",
                "debugging",
                "syntax",
                "array",
                "recursion",
                "programming",
                "software",
                "github",
                "framework",
                "boolean",
            ],
            Subject::ComputerScience => &[
                "algorithm",
                "data structure",
                "complexity",
                "computation",
                "turing",
                "binary",
                "network",
                "operating system",
                "database",
                "machine learning",
                "artificial intelligence",
                "cryptography",
                "graph theory",
                "automata",
                "computer science",
            ],
            Subject::History => &[
                "world war",
                "civil war",
                "empire",
                "revolution",
                "century",
                "ancient",
                "dynasty",
                "kingdom",
                "civilization",
                "medieval",
                "colonial",
                "treaty",
                "monarchy",
                "battle",
                "archaeology",
            ],
            Subject::Geography => &[
                "continent",
                "climate",
                "mountain",
                "population",
                "latitude",
                "longitude",
                "ocean",
                "tectonic",
                "erosion",
                "capital city",
                "desert",
                "hemisphere",
                "urbanization",
                "glacier",
                "terrain",
            ],
            Subject::Literature => &[
                "novel",
                "poem",
                "poetry",
                "author",
                "narrative",
                "metaphor",
                "shakespeare",
                "literary",
                "protagonist",
                "fiction",
                "stanza",
                "prose",
                "sonnet",
                "tragedy",
                "symbolism",
            ],
            Subject::Language => &[
                "grammar",
                "vocabulary",
                "verb",
                "noun",
                "pronunciation",
                "past tense",
                "adjective",
                "conjugation",
                "linguistic",
                "phonetic",
                "idiom",
                "translation",
                "sentence structure",
                "preposition",
                "dialect",
            ],
            Subject::Art => &[
                "painting",
                "sculpture",
                "artist",
                "canvas",
                "renaissance",
                "gallery",
                "drawing",
                "portrait",
                "impressionism",
                "brushstroke",
                "color theory",
                "museum",
                "abstract art",
                "watercolor",
                "fresco",
            ],
            Subject::Music => &[
                "melody",
                "rhythm",
                "harmony",
                "chord",
                "tempo",
                "composer",
                "symphony",
                "orchestra",
                "instrument",
                "song",
                "octave",
                "piano",
                "guitar",
                "notation",
                "musical",
            ],
            Subject::Sports => &[
                "football",
                "soccer",
                "basketball",
                "tennis",
                "athlete",
                "olympic",
                "tournament",
                "coach",
                "goalkeeper",
                "stadium",
                "marathon",
                "referee",
                "league",
                "championship",
                "cricket",
            ],
            Subject::Entertainment => &[
                "movie",
                "film",
                "television",
                "celebrity",
                "actor",
                "actress",
                "netflix",
                "cinema",
                "video game",
                "streaming",
                "comedy",
                "concert",
                "episode",
                "box office",
                "sitcom",
            ],
            Subject::General => &[],
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown subject: {0}")]
pub struct UnknownSubject(pub String);

/// Case-insensitive exact match against the taxonomy labels.
impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Subject::ALL
            .iter()
            .copied()
            .find(|subject| subject.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownSubject(s.to_string()))
    }
}

/// Lower-case alias -> canonical subject, matched by containment in order.
pub const SYNONYMS: &[(&str, Subject)] = &[
    ("math", Subject::Mathematics),
    ("calculus", Subject::Mathematics),
    ("algebra", Subject::Mathematics),
    ("geometry", Subject::Mathematics),
    ("statistic", Subject::Mathematics),
    ("mechanics", Subject::Physics),
    ("quantum", Subject::Physics),
    ("astronomy", Subject::Physics),
    ("chem", Subject::Chemistry),
    ("genetic", Subject::Biology),
    ("anatomy", Subject::Biology),
    ("ecology", Subject::Biology),
    ("coding", Subject::Programming),
    ("software", Subject::Programming),
    ("code", Subject::Programming),
    ("developer", Subject::Programming),
    ("computing", Subject::ComputerScience),
    ("algorithm", Subject::ComputerScience),
    ("informatics", Subject::ComputerScience),
    ("data science", Subject::ComputerScience),
    ("historical", Subject::History),
    ("ancient", Subject::History),
    ("geology", Subject::Geography),
    ("earth science", Subject::Geography),
    ("poetry", Subject::Literature),
    ("novel", Subject::Literature),
    ("linguistic", Subject::Language),
    ("grammar", Subject::Language),
    ("painting", Subject::Art),
    ("design", Subject::Art),
    ("song", Subject::Music),
    ("physical education", Subject::Sports),
    ("sport", Subject::Sports),
    ("movie", Subject::Entertainment),
    ("film", Subject::Entertainment),
    ("gaming", Subject::Entertainment),
];

/// Keyword hit counts per subject, in taxonomy order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectScores {
    scores: Vec<(Subject, usize)>,
}

impl SubjectScores {
    /// Counts, for every subject, how many of its keywords occur in `text`.
    pub fn compute(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let scores = Subject::ALL
            .iter()
            .map(|subject| {
                let hits = subject
                    .keywords()
                    .iter()
                    .filter(|kw| lowered.contains(*kw))
                    .count();
                (*subject, hits)
            })
            .collect();
        Self { scores }
    }

    pub fn from_pairs(pairs: &[(Subject, usize)]) -> Self {
        let scores = Subject::ALL
            .iter()
            .map(|subject| {
                let hits = pairs
                    .iter()
                    .find(|(s, _)| s == subject)
                    .map(|(_, n)| *n)
                    .unwrap_or(0);
                (*subject, hits)
            })
            .collect();
        Self { scores }
    }

    pub fn score(&self, subject: Subject) -> usize {
        self.scores
            .iter()
            .find(|(s, _)| *s == subject)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Highest score; the earliest subject in taxonomy order wins ties.
    pub fn top(&self) -> (Subject, usize) {
        let mut best = (Subject::General, 0usize);
        let mut found = false;
        for &(subject, hits) in &self.scores {
            if !found || hits > best.1 {
                best = (subject, hits);
                found = true;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip_through_from_str() {
        for subject in Subject::ALL {
            assert_eq!(subject.label().parse::<Subject>().unwrap(), subject);
        }
        assert_eq!(
            "computer science".parse::<Subject>().unwrap(),
            Subject::ComputerScience
        );
        let err = "Astrology".parse::<Subject>().unwrap_err();
        assert_eq!(err, UnknownSubject("Astrology".into()));
        assert_eq!(err.to_string(), "unknown subject: Astrology");
    }

    #[test]
    fn serde_uses_display_labels() {
        let v = serde_json::to_value(Subject::ComputerScience).unwrap();
        assert_eq!(v, "Computer Science");
        let back: Subject = serde_json::from_value(serde_json::json!("Physics")).unwrap();
        assert_eq!(back, Subject::Physics);
    }

    #[test]
    fn keywords_are_lower_case_and_general_has_none() {
        for subject in Subject::ALL {
            for kw in subject.keywords() {
                assert_eq!(*kw, kw.to_lowercase());
            }
        }
        assert!(Subject::General.keywords().is_empty());
    }

    #[test]
    fn synonyms_are_lower_case() {
        assert!(SYNONYMS.iter().all(|(k, _)| *k == k.to_lowercase()));
        assert!(SYNONYMS
            .iter()
            .any(|(k, s)| *k == "coding" && *s == Subject::Programming));
    }

    #[test]
    fn scores_count_distinct_keywords_case_insensitively() {
        let scores = SubjectScores::compute("The INTEGRAL of a Derivative; a theorem, a theorem.");
        assert_eq!(scores.score(Subject::Mathematics), 3);
        assert_eq!(scores.top(), (Subject::Mathematics, 3));
    }

    #[test]
    fn top_breaks_ties_by_taxonomy_order() {
        let scores = SubjectScores::from_pairs(&[(Subject::Music, 2), (Subject::Physics, 2)]);
        assert_eq!(scores.top(), (Subject::Physics, 2));

        let empty = SubjectScores::compute("");
        assert_eq!(empty.top(), (Subject::Mathematics, 0));
    }
}
