//! # Autocomplete
//!
//! File: cli/src/bot/autocomplete.rs
//!
//! Question suggestions for the chat input box. Candidates come from a fixed
//! list of popular questions and from what users have recently asked. A
//! candidate is offered when it starts with the typed text or is similar
//! enough to it (see [`crate::bot::similarity::ratio`]).
//!
use crate::bot::similarity::ratio;
use crate::core::config::AutocompleteSection;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::debug;

const ACADEMIC: &[&str] = &[
    "What is Newton's law of motion?",
    "Explain photosynthesis",
    "How do I calculate derivatives?",
    "What are the types of chemical bonds?",
    "Explain the theory of relativity",
];

const STUDY: &[&str] = &[
    "How can I improve my study habits?",
    "What are effective note-taking methods?",
    "How do I prepare for exams?",
    "How do I memorize formulas?",
    "What are good study techniques?",
];

const COLLEGE: &[&str] = &[
    "What are the admission requirements?",
    "Tell me about the courses offered",
    "What is the fee structure?",
    "How do I apply for scholarships?",
    "What are the placement statistics?",
];

const FEATURES: &[&str] = &[
    "Show my lecture notes",
    "Create a study plan",
    "Summarize this lecture",
    "Generate practice questions",
    "Export chat history",
];

const POPULAR_QUESTIONS: &[&str] = &[
    "What is Newton's law of motion?",
    "Explain photosynthesis",
    "How do I calculate derivatives?",
    "What are the types of chemical bonds?",
    "Explain the water cycle",
    "What is machine learning?",
    "How does DNA replication work?",
    "Explain the theory of relativity",
    "What is Pythagorean theorem?",
    "How do I solve quadratic equations?",
    "How can I improve my study habits?",
    "What are effective note-taking methods?",
    "How do I prepare for exams?",
    "Can you explain this topic?",
    "I need help with homework",
    "How do I memorize formulas?",
    "What are good study techniques?",
    "How much time should I study daily?",
    "What are the admission requirements?",
    "Tell me about the courses offered",
    "What is the fee structure?",
    "How do I apply for scholarships?",
    "What are the placement statistics?",
    "Tell me about campus facilities",
    "What extracurricular activities are available?",
    "Show my lecture notes",
    "Create a study plan",
    "Summarize this lecture",
    "Generate practice questions",
    "Test my knowledge",
    "Export chat history",
];

/// Number of most recent queries considered for trending.
const TRENDING_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Popular,
    History,
}

impl Source {
    fn icon(self) -> &'static str {
        match self {
            Source::Popular => "⭐",
            Source::History => "🕒",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub text: String,
    pub score: f64,
    pub source: Source,
    pub icon: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct AutocompleteStats {
    pub popular_questions: usize,
    pub user_history_size: usize,
    pub max_history: usize,
    pub min_similarity: f64,
}

#[derive(Debug)]
pub struct Autocomplete {
    history: Mutex<VecDeque<String>>,
    max_history: usize,
    min_similarity: f64,
}

impl Autocomplete {
    pub fn new(settings: &AutocompleteSection) -> Self {
        Self {
            history: Mutex::new(VecDeque::new()),
            max_history: settings.max_history,
            min_similarity: settings.min_similarity,
        }
    }

    /// Up to `limit` suggestions for a partially typed query, best first.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<Suggestion> {
        if query.chars().count() < 2 {
            return Vec::new();
        }
        let query = query.trim().to_lowercase();

        let history: Vec<String> = self.history.lock().iter().rev().cloned().collect();
        let candidates = POPULAR_QUESTIONS
            .iter()
            .map(|q| (q.to_string(), Source::Popular))
            .chain(history.into_iter().map(|q| (q, Source::History)));

        let mut seen = HashSet::new();
        let mut suggestions: Vec<Suggestion> = candidates
            .filter_map(|(text, source)| {
                let lowered = text.to_lowercase();
                let score = similarity(&query, &lowered);
                let matches = score > self.min_similarity || lowered.starts_with(&query);
                (matches && seen.insert(lowered)).then(|| Suggestion {
                    text,
                    score,
                    source,
                    icon: source.icon(),
                })
            })
            .collect();

        // Stable, so equal scores keep popular-before-history order.
        suggestions.sort_by(|a, b| b.score.total_cmp(&a.score));
        suggestions.truncate(limit);
        debug!("{} suggestions for '{}'", suggestions.len(), query);
        suggestions
    }

    pub fn add_to_history(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }
        let mut history = self.history.lock();
        history.push_back(query.to_string());
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    /// Canned questions for `academic`, `study`, `college` or `features`.
    pub fn category_suggestions(&self, category: &str, limit: usize) -> Vec<&'static str> {
        let questions: &[&str] = match category {
            "academic" => ACADEMIC,
            "study" => STUDY,
            "college" => COLLEGE,
            "features" => FEATURES,
            _ => &[],
        };
        questions.iter().take(limit).copied().collect()
    }

    /// Most frequent of the recent queries; ties keep first-seen order.
    pub fn trending(&self, limit: usize) -> Vec<String> {
        let history = self.history.lock();
        let skip = history.len().saturating_sub(TRENDING_WINDOW);

        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for query in history.iter().skip(skip) {
            let count = counts.entry(query.as_str()).or_insert(0);
            if *count == 0 {
                order.push(query.as_str());
            }
            *count += 1;
        }
        order.sort_by(|a, b| counts[b].cmp(&counts[a]));
        order.into_iter().take(limit).map(String::from).collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
        debug!("Autocomplete history cleared");
    }

    pub fn stats(&self) -> AutocompleteStats {
        AutocompleteStats {
            popular_questions: POPULAR_QUESTIONS.len(),
            user_history_size: self.history.lock().len(),
            max_history: self.max_history,
            min_similarity: self.min_similarity,
        }
    }
}

/// 1.0 for a prefix match, otherwise the gestalt ratio.
fn similarity(query: &str, candidate: &str) -> f64 {
    if candidate.starts_with(query) {
        1.0
    } else {
        ratio(query, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Autocomplete {
        Autocomplete::new(&AutocompleteSection::default())
    }

    #[test]
    fn test_short_query_returns_nothing() {
        let ac = engine();
        assert!(ac.suggestions("w", 5).is_empty());
        assert!(ac.suggestions("", 5).is_empty());
    }

    #[test]
    fn test_prefix_matches_score_one() {
        let ac = engine();
        let results = ac.suggestions("What are", 10);
        assert!(!results.is_empty());
        assert!(results.iter().all(|s| s.text.to_lowercase().starts_with("what are")));
        assert!(results.iter().all(|s| s.score == 1.0));
        assert_eq!(results[0].source, Source::Popular);
        assert_eq!(results[0].icon, "⭐");
    }

    #[test]
    fn test_limit_applied() {
        let ac = engine();
        assert_eq!(ac.suggestions("how", 3).len(), 3);
    }

    #[test]
    fn test_history_deduplicated_against_popular() {
        let ac = engine();
        ac.add_to_history("what is the FEE structure?");
        ac.add_to_history("what is hostel fee");
        let results = ac.suggestions("what is", 50);
        let fee_hits = results
            .iter()
            .filter(|s| s.text.to_lowercase() == "what is the fee structure?")
            .count();
        assert_eq!(fee_hits, 1);
        assert!(results
            .iter()
            .any(|s| s.text == "what is hostel fee" && s.source == Source::History));
    }

    #[test]
    fn test_history_capped() {
        let ac = Autocomplete::new(&AutocompleteSection {
            max_history: 3,
            min_similarity: 0.6,
        });
        for q in ["a1", "a2", "a3", "a4", "  "] {
            ac.add_to_history(q);
        }
        assert_eq!(ac.stats().user_history_size, 3);
        assert_eq!(ac.trending(10), vec!["a2", "a3", "a4"]);
    }

    #[test]
    fn test_trending_by_frequency() {
        let ac = engine();
        for q in ["fees", "hostel", "hostel", "fees", "hostel", "library"] {
            ac.add_to_history(q);
        }
        assert_eq!(ac.trending(2), vec!["hostel", "fees"]);
        ac.clear_history();
        assert!(ac.trending(5).is_empty());
    }

    #[test]
    fn test_category_suggestions() {
        let ac = engine();
        assert_eq!(ac.category_suggestions("college", 2).len(), 2);
        assert_eq!(ac.category_suggestions("features", 10).len(), 5);
        assert!(ac.category_suggestions("cooking", 5).is_empty());
    }

    #[test]
    fn test_similar_but_not_prefix() {
        let ac = engine();
        let results = ac.suggestions("explain photosynthesiss", 5);
        assert_eq!(results[0].text, "Explain photosynthesis");
        assert!(results[0].score < 1.0 && results[0].score > 0.6);
    }
}
