//! The shared build/query tokenization pipeline: Unicode lowercase, split on
//! non-alphanumeric, drop short tokens and stopwords.

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it",
    "its", "of", "on", "that", "the", "to", "was", "will", "with", "or", "but", "not", "this",
    "these", "they", "them", "their", "there", "then", "than", "so", "if", "when", "where", "why",
    "how", "what", "which", "who", "whom", "whose", "can", "could", "should", "would", "may",
    "might", "must", "shall", "do", "does", "did", "have", "had", "having",
];

/// Tokens shorter than this carry almost no lexical signal in this corpus
/// (unit labels, list markers) and are dropped.
const MIN_TOKEN_LEN: usize = 3;

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// Tokenize `text` for indexing or querying.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() >= MIN_TOKEN_LEN && !is_stop_word(t))
        .collect()
}
