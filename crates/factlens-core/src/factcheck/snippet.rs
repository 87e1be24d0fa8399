//! Claim-relevant snippet extraction from candidate evidence text.

use std::collections::BTreeSet;

/// Snippets are capped at this many characters.
pub const MAX_SNIPPET_LEN: usize = 200;

/// Picks the sentence of `text` most relevant to `claim`.
///
/// Sentences are scored by the number of claim words they contain
/// (case-insensitive, whitespace-tokenized); the max-overlap sentence
/// wins and is truncated to [`MAX_SNIPPET_LEN`] with an ellipsis if
/// longer. When no sentence scores above zero the first 200 characters
/// of the text are returned instead.
pub fn extract_relevant_snippet(claim: &str, text: &str) -> String {
    let claim_words: BTreeSet<String> = claim
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();

    let mut best: Option<(&str, usize)> = None;
    for sentence in split_sentences(text) {
        let score = sentence
            .split_whitespace()
            .filter(|w| claim_words.contains(&w.to_lowercase()))
            .count();

        let replace = match best {
            Some((_, best_score)) => score > best_score,
            None => score > 0,
        };
        if replace {
            best = Some((sentence, score));
        }
    }

    match best {
        Some((sentence, _)) => truncate_with_ellipsis(sentence),
        None => text.chars().take(MAX_SNIPPET_LEN).collect(),
    }
}

/// Splits text into sentences at `.`, `!` and `?` boundaries.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if matches!(c, '.' | '!' | '?') {
            let end = i + c.len_utf8();
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }

    sentences
}

fn truncate_with_ellipsis(text: &str) -> String {
    if text.chars().count() <= MAX_SNIPPET_LEN {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(MAX_SNIPPET_LEN - 3).collect();
    truncated.push_str("...");
    truncated
}
