//! Static word lists for key-term extraction and expansion

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Words dropped from key terms: English function words plus the
/// scaffolding that only signals intent ("compare", "explain", ...)
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "all", "also", "am", "an", "and", "any", "are", "as",
    "at", "be", "been", "before", "being", "between", "both", "but", "by", "can", "could", "did",
    "do", "does", "doing", "during", "each", "for", "from", "further", "had", "has", "have",
    "having", "he", "her", "here", "him", "his", "i", "if", "in", "into", "is", "it", "its",
    "just", "me", "more", "most", "my", "no", "nor", "not", "of", "on", "once", "only", "or",
    "other", "our", "out", "over", "own", "same", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "would", "you", "your",
    // query scaffolding
    "compare", "comparing", "comparison", "versus", "vs", "difference", "differences",
    "contrast", "how", "explain", "explanation", "describe", "define", "definition", "meaning",
    "tell", "show", "give", "list", "overview", "examples", "example", "steps", "step",
    "guide", "work", "works", "use", "used", "using", "mean", "means", "please",
];

/// Abbreviations and the phrases they stand for, both directions
const SYNONYMS: &[(&str, &[&str])] = &[
    ("ai", &["artificial intelligence"]),
    ("algo", &["algorithm"]),
    ("api", &["application programming interface"]),
    ("bfs", &["breadth first search"]),
    ("bst", &["binary search tree"]),
    ("cnn", &["convolutional neural network"]),
    ("cs", &["computer science"]),
    ("db", &["database"]),
    ("dbms", &["database management system"]),
    ("dfs", &["depth first search"]),
    ("dl", &["deep learning"]),
    ("dp", &["dynamic programming"]),
    ("ds", &["data structure"]),
    ("gc", &["garbage collection"]),
    ("llm", &["large language model"]),
    ("ml", &["machine learning"]),
    ("nlp", &["natural language processing"]),
    ("nn", &["neural network"]),
    ("oop", &["object oriented programming"]),
    ("os", &["operating system"]),
    ("rnn", &["recurrent neural network"]),
    ("sql", &["structured query language"]),
    ("artificial intelligence", &["ai"]),
    ("binary search tree", &["bst"]),
    ("breadth first search", &["bfs"]),
    ("database", &["db"]),
    ("deep learning", &["dl", "neural network"]),
    ("depth first search", &["dfs"]),
    ("dynamic programming", &["dp"]),
    ("large language model", &["llm"]),
    ("machine learning", &["ml"]),
    ("natural language processing", &["nlp"]),
    ("neural network", &["nn"]),
    ("operating system", &["os"]),
];

pub(crate) fn is_stop_word(token: &str) -> bool {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(token)
}

/// Expansions for a lower-case term or phrase
pub(crate) fn synonyms(term: &str) -> &'static [&'static str] {
    static MAP: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    MAP.get_or_init(|| SYNONYMS.iter().copied().collect())
        .get(term)
        .copied()
        .unwrap_or(&[])
}
