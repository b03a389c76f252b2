//! Token-set building from raw spreadsheet cells
//!
//! Cells arrive in whatever shape the export produced: delimited strings,
//! stringified list literals, JSON arrays or nothing at all. Every shape
//! collapses to a set of slugs; a cell that cannot be read yields an empty set.

use serde_json::Value;

use crate::core::types::{Token, TokenSet};

/// Placeholder values that carry no information about the character
pub const JUNK_TOKENS: &[&str] = &["", "none", "n_a", "na", "n", "weapon", "armor", "unarmed"];

/// Lowercase slug with runs of non-alphanumeric characters collapsed to `_`
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.push(c);
        } else {
            pending_sep = true;
        }
    }

    slug
}

/// Split a list-like cell on `|`, `,`, `;` or `/` and slug each piece
pub fn split_listish(cell: &str) -> Vec<Token> {
    cell.split(['|', ',', ';', '/'])
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(slugify)
        .collect()
}

/// Parse `['a', 'b']` style literals; `None` when the text is not bracketed
fn parse_list_literal(text: &str) -> Option<Vec<Token>> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?;
    Some(
        inner
            .split(',')
            .map(|piece| piece.trim().trim_matches(|c| c == '\'' || c == '"'))
            .filter(|piece| !piece.is_empty())
            .map(slugify)
            .collect(),
    )
}

/// Tokens from a single raw cell, before junk filtering
pub fn cell_tokens(cell: &Value) -> Vec<Token> {
    match cell {
        Value::Null | Value::Bool(_) | Value::Object(_) => Vec::new(),
        Value::Number(n) => vec![slugify(&n.to_string())],
        Value::String(s) => {
            let s = s.trim();
            parse_list_literal(s).unwrap_or_else(|| split_listish(s))
        }
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(slugify(s)),
                Value::Number(n) => Some(slugify(&n.to_string())),
                _ => None,
            })
            .collect(),
    }
}

/// Cleaned token set for one cell: duplicates collapsed, junk removed
pub fn build_token_set(cell: Option<&Value>) -> TokenSet {
    cell.map(cell_tokens)
        .unwrap_or_default()
        .into_iter()
        .filter(|token| !JUNK_TOKENS.contains(&token.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Great Weapon Master"), "great_weapon_master");
        assert_eq!(slugify("  Tasha's Caustic  Brew "), "tasha_s_caustic_brew");
        assert_eq!(slugify("Half-Plate"), "half_plate");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_split_listish_delimiters() {
        assert_eq!(
            split_listish("Longsword, Shield | Dagger;Light Crossbow / Sling"),
            vec!["longsword", "shield", "dagger", "light_crossbow", "sling"]
        );
    }

    #[test]
    fn test_list_literal_cell() {
        let set = build_token_set(Some(&json!("['Alert', 'Lucky']")));
        assert_eq!(set.len(), 2);
        assert!(set.contains("alert"));
        assert!(set.contains("lucky"));
    }

    #[test]
    fn test_junk_and_duplicates_removed() {
        let set = build_token_set(Some(&json!("None, Dagger, dagger, Unarmed, N/A")));
        // "N/A" splits on '/' into "n" and "a"; "n" is junk
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec!["a", "dagger"]);
    }

    #[test]
    fn test_array_cell() {
        let set = build_token_set(Some(&json!(["Shield", "Plate Armor", null])));
        assert!(set.contains("shield"));
        assert!(set.contains("plate_armor"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_missing_or_malformed_cells_are_empty() {
        assert!(build_token_set(None).is_empty());
        assert!(build_token_set(Some(&Value::Null)).is_empty());
        assert!(build_token_set(Some(&json!({"weird": 1}))).is_empty());
        assert!(build_token_set(Some(&json!(""))).is_empty());
    }
}
