//! Query intent analysis
//!
//! Classifies free-text queries, extracts key terms and expands them with
//! known abbreviations. Pure and synchronous: no cache, no graph.
//!
//! Classification runs an ordered list of pattern rules over the
//! normalized text (lower-cased, whitespace collapsed). The first rule
//! that matches decides the intent; the order is comparative, procedural,
//! conceptual, factual, exploratory. No match means [`QueryIntent::Unknown`].
//!
//! # Example
//!
//! ```
//! use conceptscope::intent::{QueryIntent, QueryIntentAnalyzer};
//!
//! let analyzer = QueryIntentAnalyzer::new();
//! let analysis = analyzer.analyze("Compare machine learning and deep learning");
//! assert_eq!(analysis.intent, QueryIntent::Comparative);
//! assert!(analysis.expanded_terms.contains(&"ml".to_string()));
//! ```

mod lexicon;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use crate::analytics::ViewKind;
use crate::utils::{normalize_whitespace, truncate_text};

/// Minimum key-term length in characters
const MIN_TERM_CHARS: usize = 2;

/// Longest phrase looked up in the synonym table, in words
const MAX_PHRASE_WORDS: usize = 3;

/// What a query is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// "what is X", "define X"
    Factual,
    /// "why does X", "explain X"
    Conceptual,
    /// "compare X and Y", "X vs Y"
    Comparative,
    /// "how to X", "steps to X"
    Procedural,
    /// "overview of X", "topics related to X"
    Exploratory,
    Unknown,
}

impl QueryIntent {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Factual => "factual",
            QueryIntent::Conceptual => "conceptual",
            QueryIntent::Comparative => "comparative",
            QueryIntent::Procedural => "procedural",
            QueryIntent::Exploratory => "exploratory",
            QueryIntent::Unknown => "unknown",
        }
    }

    /// The analytic view best suited to answer this kind of query
    #[must_use]
    pub fn suggested_view(&self) -> Option<ViewKind> {
        match self {
            QueryIntent::Comparative => Some(ViewKind::Comparison),
            QueryIntent::Exploratory | QueryIntent::Factual => Some(ViewKind::Frequency),
            QueryIntent::Conceptual | QueryIntent::Procedural => Some(ViewKind::Evolution),
            QueryIntent::Unknown => None,
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    pub intent: QueryIntent,
    /// Content words in first-occurrence order
    pub key_terms: Vec<String>,
    /// Key terms followed by their known expansions, deduplicated
    pub expanded_terms: Vec<String>,
    /// Lower-cased, whitespace-collapsed query
    pub normalized: String,
}

struct IntentRule {
    intent: QueryIntent,
    pattern: Regex,
}

/// Rule-based intent classifier and term extractor
pub struct QueryIntentAnalyzer {
    rules: Vec<IntentRule>,
    token: Regex,
}

impl QueryIntentAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: Self::build_rules(),
            token: Regex::new(r"[\w+#]+(?:[-'][\w+#]+)*").expect("Invalid regex pattern"),
        }
    }

    /// Process-wide analyzer; the rules are compiled once
    pub fn shared() -> &'static QueryIntentAnalyzer {
        static ANALYZER: OnceLock<QueryIntentAnalyzer> = OnceLock::new();
        ANALYZER.get_or_init(QueryIntentAnalyzer::new)
    }

    fn build_rules() -> Vec<IntentRule> {
        let rule = |intent, pattern: &str| IntentRule {
            intent,
            pattern: Regex::new(pattern).expect("Invalid regex pattern"),
        };

        vec![
            rule(
                QueryIntent::Comparative,
                r"\b(compare|comparing|comparison|versus|vs|contrast|differen(ce|ces|t) between|similarit(y|ies) between|better than)\b",
            ),
            rule(
                QueryIntent::Procedural,
                r"\b(how (to|do i|do you|can i|should i|would i)|steps? (to|for)|step[- ]by[- ]step|procedure for|guide to)\b",
            ),
            rule(
                QueryIntent::Conceptual,
                r"^(why|explain)\b|\b(explain|explanation of|intuition|understand|meaning of|concept of|how does .+ work)\b",
            ),
            rule(
                QueryIntent::Factual,
                r"^(what|who|when|where|which)\b|\b(define|definition of|what (is|are))\b",
            ),
            rule(
                QueryIntent::Exploratory,
                r"\b(overview|explore|examples? of|related to|tell me about|introduction to|learn about|topics)\b",
            ),
        ]
    }

    /// Analyze one query
    pub fn analyze(&self, text: &str) -> QueryAnalysis {
        let normalized = normalize_whitespace(&text.to_lowercase());
        let intent = self.classify(&normalized);
        let tokens = self.content_tokens(&normalized);
        let expanded_terms = expand(&tokens);
        let key_terms = dedupe(tokens);

        tracing::debug!(
            query = %truncate_text(&normalized, 80),
            intent = %intent,
            terms = key_terms.len(),
            "Analyzed query"
        );

        QueryAnalysis {
            intent,
            key_terms,
            expanded_terms,
            normalized,
        }
    }

    /// First matching rule's intent
    pub fn classify(&self, normalized: &str) -> QueryIntent {
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(normalized))
            .map_or(QueryIntent::Unknown, |rule| rule.intent)
    }

    /// Content words of `text`, deduplicated case-insensitively
    pub fn key_terms(&self, text: &str) -> Vec<String> {
        dedupe(self.content_tokens(text))
    }

    /// Lower-cased content words in query order, repeats kept
    fn content_tokens(&self, text: &str) -> Vec<String> {
        self.token
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .filter(|t| t.chars().count() >= MIN_TERM_CHARS && !lexicon::is_stop_word(t))
            .collect()
    }
}

fn dedupe(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms.into_iter().filter(|t| seen.insert(t.clone())).collect()
}

impl Default for QueryIntentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Content tokens followed by their expansions, deduplicated
///
/// Adjacent tokens are also looked up as phrases, so "machine learning"
/// expands to "ml". Phrases are formed before deduplication, so a word
/// repeated later in the query still completes its phrase. Unknown terms
/// pass through unchanged.
fn expand(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |term: &str| {
        if seen.insert(term.to_string()) {
            out.push(term.to_string());
        }
    };

    for (i, term) in tokens.iter().enumerate() {
        push(term);
        for synonym in lexicon::synonyms(term) {
            push(synonym);
        }
        for words in 2..=MAX_PHRASE_WORDS {
            let Some(window) = tokens.get(i..i + words) else {
                break;
            };
            for synonym in lexicon::synonyms(&window.join(" ")) {
                push(synonym);
            }
        }
    }

    out
}

/// Analyze with the shared analyzer
pub fn analyze(text: &str) -> QueryAnalysis {
    QueryIntentAnalyzer::shared().analyze(text)
}
