//! Word and n-gram extraction for narrative text

/// Lowercased words of two or more alphanumeric characters
pub fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// All word n-grams for n in 1..=max_n, space-joined
pub fn ngrams(text: &str, max_n: usize) -> Vec<String> {
    let words = words(text);
    let mut terms = Vec::with_capacity(words.len() * max_n.max(1));
    for n in 1..=max_n.max(1) {
        if n > words.len() {
            break;
        }
        terms.extend(words.windows(n).map(|w| w.join(" ")));
    }
    terms
}
