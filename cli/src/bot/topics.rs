//! # Topic Detection
//!
//! File: cli/src/bot/topics.rs
//!
//! Maps a free-text message onto one of the conversation topics by whole-word
//! keyword matching, so "message" is not a question about the mess and
//! "feedback" is not one about fees. Topics are checked in a fixed order:
//! a message with triggers for both fees and placements is an admissions
//! question.
//!
use crate::core::error::EdubotError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conversation topics, each backed by its own handler in the conversation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    NalandaInfo,
    Admissions,
    Placements,
    Courses,
    CampusLife,
    General,
}

/// Detection order and trigger keywords. `General` is the fallback.
///
/// Keywords match whole words (plurals included). A trailing `*` marks a stem
/// that matches as a word prefix; keywords with spaces or dots match as phrases.
const KEYWORDS: &[(Topic, &[&str])] = &[
    (
        Topic::Admissions,
        &[
            "admission", "apply", "eligib*", "fee", "scholarship", "document", "entrance",
            "jee", "gate score", "deadline",
        ],
    ),
    (
        Topic::Placements,
        &[
            "placement", "job", "career", "internship", "recruit*", "package", "salary",
            "salaries", "compan*", "hiring",
        ],
    ),
    (
        Topic::Courses,
        &[
            "course", "program", "programme", "branch", "branches", "department", "b.tech",
            "btech", "m.tech", "mtech", "phd", "ph.d", "specialization", "syllabus",
        ],
    ),
    (
        Topic::CampusLife,
        &[
            "campus", "hostel", "library", "libraries", "lab", "laborator*", "sport", "canteen",
            "food", "mess", "club", "facilit*", "transport*", "bus", "buses", "fest",
            "festival", "event",
        ],
    ),
    (
        Topic::NalandaInfo,
        &[
            "nalanda", "college", "institute", "contact", "address", "phone", "email",
            "accredit*", "ranking",
        ],
    ),
];

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::NalandaInfo,
        Topic::Admissions,
        Topic::Placements,
        Topic::Courses,
        Topic::CampusLife,
        Topic::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::NalandaInfo => "nalanda_info",
            Topic::Admissions => "admissions",
            Topic::Placements => "placements",
            Topic::Courses => "courses",
            Topic::CampusLife => "campus_life",
            Topic::General => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Topic {
    type Err = EdubotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| EdubotError::Validation(format!("Unknown topic '{}'", s)))
    }
}

/// Lower-cased alphanumeric words of `lowered`.
pub(crate) fn words(lowered: &str) -> Vec<&str> {
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Whether `keyword` occurs in a lower-cased message split into `words`.
pub(crate) fn keyword_matches(lowered: &str, words: &[&str], keyword: &str) -> bool {
    if let Some(prefix) = keyword.strip_suffix('*') {
        return words.iter().any(|w| w.starts_with(prefix));
    }
    if keyword.contains(|c: char| !c.is_alphanumeric()) {
        return lowered.contains(keyword);
    }
    words
        .iter()
        .any(|w| *w == keyword || w.strip_suffix('s') == Some(keyword))
}

/// Picks the first topic whose keywords appear in the message.
pub fn detect_topic(message: &str) -> Topic {
    let lowered = message.to_lowercase();
    let words = words(&lowered);
    KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| keyword_matches(&lowered, &words, k)))
        .map(|(topic, _)| *topic)
        .unwrap_or(Topic::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_each_topic() {
        assert_eq!(detect_topic("What are the admission requirements?"), Topic::Admissions);
        assert_eq!(detect_topic("Placement statistics please"), Topic::Placements);
        assert_eq!(detect_topic("What courses do you offer?"), Topic::Courses);
        assert_eq!(detect_topic("Tell me about the HOSTEL"), Topic::CampusLife);
        assert_eq!(detect_topic("Tell me about Nalanda"), Topic::NalandaInfo);
        assert_eq!(detect_topic("Hello"), Topic::General);
    }

    #[test]
    fn test_detection_order_prefers_admissions() {
        // Mentions both fees and placements.
        assert_eq!(detect_topic("fee and placement details"), Topic::Admissions);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        assert_eq!(detect_topic("I sent a message"), Topic::General);
        assert_eq!(detect_topic("Is feedback available?"), Topic::General);
        assert_eq!(detect_topic("I run a business"), Topic::General);
        assert_eq!(detect_topic("coffee?"), Topic::General);
        assert_eq!(detect_topic("Tell me about yourself"), Topic::General);
    }

    #[test]
    fn test_plurals_stems_and_phrases() {
        assert_eq!(detect_topic("What are the fees?"), Topic::Admissions);
        assert_eq!(detect_topic("Eligibility for M.Tech"), Topic::Admissions);
        assert_eq!(detect_topic("Which companies visit?"), Topic::Placements);
        assert_eq!(detect_topic("Top recruiters"), Topic::Placements);
        assert_eq!(detect_topic("Is there a B.Tech in AI?"), Topic::Courses);
        assert_eq!(detect_topic("List the branches"), Topic::Courses);
        assert_eq!(detect_topic("Any labs or buses?"), Topic::CampusLife);
        assert_eq!(detect_topic("What facilities exist?"), Topic::CampusLife);
        assert_eq!(detect_topic("Is it accredited?"), Topic::NalandaInfo);
    }

    #[test]
    fn test_round_trip_names() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>().unwrap(), topic);
        }
        assert!("weather".parse::<Topic>().is_err());
    }

    #[test]
    fn test_serde_snake_case() {
        let json = serde_json::to_string(&Topic::CampusLife).unwrap();
        assert_eq!(json, "\"campus_life\"");
    }
}
