//! In-memory keyword scan shared by the topic and homework mocks.

/// Words too common to count as topics
const STOPWORDS: [&str; 16] = [
    "the", "and", "of", "to", "in", "a", "for", "is", "on", "with", "that", "this", "an", "as",
    "by", "from",
];

/// Extract up to six recurring key terms from free text.
///
/// Lowercases the input, collapses everything outside the letter alphabet
/// into separators, drops stopwords, counts occurrences, and returns the
/// most frequent tokens. Ties keep first-encountered order (stable sort).
/// Empty or whitespace-only input yields an empty list.
pub fn extract(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    let mut counts: Vec<(String, usize)> = Vec::new();
    for token in cleaned.split_whitespace() {
        if STOPWORDS.contains(&token) {
            continue;
        }
        match counts.iter_mut().find(|(word, _)| word.as_str() == token) {
            Some((_, count)) => *count += 1,
            None => counts.push((token.to_string(), 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(6).map(|(word, _)| word).collect()
}

/// Split text into trimmed sentence-like fragments.
///
/// Used by the homework generator to cycle question prompts through the
/// source material.
pub fn sentence_fragments(text: &str) -> Vec<String> {
    text.split(['.', '!', '?', '\n'])
        .map(|fragment| fragment.trim())
        .filter(|fragment| !fragment.is_empty())
        .map(|fragment| fragment.to_string())
        .collect()
}
