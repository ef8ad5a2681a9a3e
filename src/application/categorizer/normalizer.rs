//! Deterministic text cleanup applied before feature extraction.
//!
//! Bank statement descriptions are noisy: mixed casing, Portuguese
//! diacritics, card-network punctuation. Everything outside `[a-z0-9 ]` is
//! dropped so that "PAG*NetFlix.com" and "pagamento netflix" share tokens.

/// Portuguese articles and prepositions that carry no category signal.
const STOPWORDS: &[&str] = &[
    "a", "o", "de", "da", "do", "em", "para", "com", "por", "e", "ou", "na", "no", "as", "os",
    "das", "dos",
];

/// Fold Latin diacritics to their ASCII base letter. Covers the Portuguese
/// range seen in the seed corpus and statement exports.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => c,
    }
}

/// Normalize a free-text description: lowercase, strip accents, keep only
/// `[a-z0-9 ]`, collapse whitespace, drop stopwords.
pub fn normalize(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());

    for c in text.chars().flat_map(|c| c.to_lowercase()) {
        let c = fold_accent(c);
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }

    cleaned
        .split_whitespace()
        .filter(|w| !STOPWORDS.contains(w))
        .collect::<Vec<_>>()
        .join(" ")
}
