//! Product lookup: exact part-number containment, then token-overlap scoring.

use crate::types::Product;
use crate::vectorize;

/// Tokens at or below this length carry no signal for fuzzy matching.
const MIN_TOKEN_LEN: usize = 2;

/// Find the product best matching a free-text query.
///
/// An exact part-number substring match wins outright, first in corpus order,
/// and skips scoring entirely. Otherwise each product is scored by how many
/// of the query's substantial tokens appear in its precomputed search text;
/// only a strictly higher score displaces the current best, so ties keep the
/// first-seen product. All scores zero means no match.
pub fn best_match<'a>(query: &str, products: &'a [Product]) -> Option<&'a Product> {
    let query_lower = query.to_lowercase();

    for product in products {
        if query_lower.contains(&product.part_number.to_lowercase()) {
            return Some(product);
        }
    }

    let tokens: Vec<String> = vectorize::tokenize(&query_lower)
        .into_iter()
        .filter(|t| t.len() > MIN_TOKEN_LEN)
        .collect();

    let mut best: Option<&Product> = None;
    let mut best_score = 0usize;

    for product in products {
        let score = tokens
            .iter()
            .filter(|t| product.search_text.contains(t.as_str()))
            .count();
        if score > best_score {
            best_score = score;
            best = Some(product);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, description: &str, part_number: &str) -> Product {
        Product {
            search_text: Product::derive_search_text(name, description, part_number),
            name: name.to_string(),
            description: description.to_string(),
            price: "$19.00".to_string(),
            part_number: part_number.to_string(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(
                "APPLE PENCIL PRO",
                "Pressure-sensitive stylus for iPad Pro",
                "MX2D3AM/A",
            ),
            product(
                "SMART FOLIO FOR IPAD PRO",
                "Folio cover for 11-inch iPad Pro",
                "MWK73LL/A",
            ),
            product(
                "USB-C POWER ADAPTER",
                "20W USB-C power adapter for iPad",
                "MU8F2AM/A",
            ),
        ]
    }

    #[test]
    fn exact_part_number_wins_over_any_fuzzy_score() {
        let products = catalog();
        // Heavy token overlap with the folio, but the query names the
        // adapter's part number.
        let hit = best_match(
            "smart folio cover for ipad pro, part MU8F2AM/A",
            &products,
        )
        .unwrap();
        assert_eq!(hit.part_number, "MU8F2AM/A");
    }

    #[test]
    fn part_number_match_is_case_insensitive() {
        let products = catalog();
        let hit = best_match("price of mwk73ll/a please", &products).unwrap();
        assert_eq!(hit.part_number, "MWK73LL/A");
    }

    #[test]
    fn fuzzy_match_picks_highest_token_overlap() {
        let products = catalog();
        let hit = best_match("how much is the usb-c power adapter", &products).unwrap();
        assert_eq!(hit.part_number, "MU8F2AM/A");
    }

    #[test]
    fn short_tokens_are_excluded_from_scoring() {
        let products = catalog();
        // Every token is <= 2 chars, so nothing scores.
        assert!(best_match("an is of to", &products).is_none());
    }

    #[test]
    fn all_zero_scores_mean_no_match() {
        let products = catalog();
        assert!(best_match("weather forecast tomorrow", &products).is_none());
    }

    #[test]
    fn ties_keep_corpus_order() {
        let products = vec![
            product("WIDGET ALPHA", "A widget for testing overlap", "AAA-1"),
            product("WIDGET BETA", "A widget for testing overlap", "BBB-2"),
        ];
        let hit = best_match("widget overlap", &products).unwrap();
        assert_eq!(hit.part_number, "AAA-1");
    }
}
