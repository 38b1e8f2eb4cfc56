//! Structured product extraction from raw catalog text.
//!
//! Catalog PDFs render price tables as flat text: a product name line, a
//! description line, then a `$price PART-NUMBER` pair. The extractor finds
//! every price/part-number occurrence and reconstructs the record by scanning
//! the preceding lines backward.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::Product;

/// How far back (in bytes) to look for the name/description of a match.
const CONTEXT_WINDOW_BYTES: usize = 300;
/// Lines at or below this length are too short to be a name or description.
const MIN_LINE_LEN: usize = 10;
/// When no all-caps name line exists, the name is this prefix of the description.
const NAME_FALLBACK_LEN: usize = 60;

/// A currency amount immediately followed by a part-number-shaped token,
/// optionally carrying an Apple-style `AM/A` / `LL/A` suffix.
static PRICE_PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(\d+\.\d+)\s+([A-Z0-9/-]+(?:AM/A|LL/A)?)").expect("price/part regex is valid")
});

/// Backward scan over the context window. A line can satisfy the description
/// check and the name check in the same step; finding a name always stops the
/// scan. This ordering is load-bearing for which line ends up as the
/// description, so it must not be "simplified".
enum ScanState {
    SeekingDescription,
    SeekingName,
}

/// Extract every product record from the concatenated corpus text.
///
/// A record is emitted only when the backward scan finds a description. A
/// match whose window holds nothing but table headers (or nothing at all)
/// produces no record, which is a coverage gap rather than an error.
pub fn extract_products(text: &str) -> Vec<Product> {
    let mut products = Vec::new();

    for caps in PRICE_PART_RE.captures_iter(text) {
        let price = &caps[1];
        let part_number = &caps[2];
        let match_start = caps.get(0).map(|m| m.start()).unwrap_or(0);

        let context = context_before(text, match_start);
        let (description, name) = scan_backward(context);

        let Some(description) = description else {
            continue;
        };

        // The fallback name is not part of the searchable text: only an
        // actually-found caps line contributes beyond the description itself.
        let search_text =
            Product::derive_search_text(name.unwrap_or(""), description, part_number);
        let name = name.map(str::to_string).unwrap_or_else(|| {
            description.chars().take(NAME_FALLBACK_LEN).collect()
        });

        products.push(Product {
            search_text,
            name,
            description: description.to_string(),
            price: format!("${}", price),
            part_number: part_number.to_string(),
        });
    }

    products
}

/// Up to `CONTEXT_WINDOW_BYTES` of text immediately preceding the match,
/// snapped back to a char boundary.
fn context_before(text: &str, match_start: usize) -> &str {
    let mut start = match_start.saturating_sub(CONTEXT_WINDOW_BYTES);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    &text[start..match_start]
}

/// Walk the window's trimmed, non-empty lines from the end backward, skipping
/// table-header labels. The first substantial line becomes the description;
/// the first all-caps line becomes the name and terminates the scan.
fn scan_backward(context: &str) -> (Option<&str>, Option<&str>) {
    let lines: Vec<&str> = context
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut description = None;
    let mut name = None;
    let mut state = ScanState::SeekingDescription;

    for line in lines.into_iter().rev() {
        if is_header_label(line) {
            continue;
        }

        if matches!(state, ScanState::SeekingDescription) && line.len() > MIN_LINE_LEN {
            description = Some(line);
            state = ScanState::SeekingName;
        }

        if is_name_line(line) {
            name = Some(line);
            break;
        }
    }

    (description, name)
}

fn is_header_label(line: &str) -> bool {
    line.contains("DESCRIPTION") || line.contains("PRICE") || line.contains("PART NUMBER")
}

/// Product names are rendered as substantial all-caps lines.
fn is_name_line(line: &str) -> bool {
    line.len() > MIN_LINE_LEN
        && line == line.to_uppercase()
        && line.chars().any(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = "\
APPLE PENCIL PRO FOR IPAD\n\
Pressure-sensitive stylus with haptic feedback for iPad Pro\n\
$129.00 MX2D3AM/A\n\
\n\
Smart Folio cover for 11-inch iPad Pro, Denim color\n\
$79.00 MWK73LL/A\n";

    #[test]
    fn extracts_price_part_and_description() {
        let products = extract_products(CATALOG);
        assert_eq!(products.len(), 2);

        assert_eq!(products[0].name, "APPLE PENCIL PRO FOR IPAD");
        assert_eq!(
            products[0].description,
            "Pressure-sensitive stylus with haptic feedback for iPad Pro"
        );
        assert_eq!(products[0].price, "$129.00");
        assert_eq!(products[0].part_number, "MX2D3AM/A");
    }

    #[test]
    fn name_falls_back_to_description_prefix() {
        let text = "Smart Folio cover for 11-inch iPad Pro, Denim color\n$79.00 MWK73LL/A\n";
        let products = extract_products(text);
        assert_eq!(products.len(), 1);
        assert_eq!(
            products[0].name,
            "Smart Folio cover for 11-inch iPad Pro, Denim color"
        );
        // The fallback name does not leak into the searchable text.
        assert!(products[0].search_text.starts_with(' '));
    }

    #[test]
    fn earlier_price_rows_can_be_picked_up_as_name_lines() {
        // A preceding product's price row has no lowercase letters, so the
        // backward scan accepts it as a name. Downstream product identity
        // depends on this, so it is pinned rather than filtered out.
        let products = extract_products(CATALOG);
        assert_eq!(products[1].name, "$129.00 MX2D3AM/A");
        assert_eq!(
            products[1].description,
            "Smart Folio cover for 11-inch iPad Pro, Denim color"
        );
    }

    #[test]
    fn search_text_is_lowercase_and_precomputed() {
        let products = extract_products(CATALOG);
        let p = &products[0];
        assert!(p.search_text.contains("apple pencil pro"));
        assert!(p.search_text.contains("mx2d3am/a"));
        assert_eq!(p.search_text, p.search_text.to_lowercase());
    }

    #[test]
    fn header_only_context_yields_no_product() {
        let text = "DESCRIPTION PRICE PART NUMBER\n$19.00 MK0C2AM/A\n";
        assert!(extract_products(text).is_empty());
    }

    #[test]
    fn match_with_empty_window_yields_no_product() {
        let text = "$19.00 MK0C2AM/A\n";
        assert!(extract_products(text).is_empty());
    }

    #[test]
    fn short_lines_are_not_descriptions() {
        let text = "iPad\n$19.00 MK0C2AM/A\n";
        assert!(extract_products(text).is_empty());
    }

    #[test]
    fn description_line_may_double_as_name() {
        // A single substantial all-caps line serves as both.
        let text = "USB-C TO LIGHTNING ADAPTER\n$29.00 MUQX3AM/A\n";
        let products = extract_products(text);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "USB-C TO LIGHTNING ADAPTER");
        assert_eq!(products[0].description, "USB-C TO LIGHTNING ADAPTER");
    }

    #[test]
    fn window_is_bounded() {
        // A name placed beyond the context window is invisible to the scan.
        let filler = "x".repeat(CONTEXT_WINDOW_BYTES + 50);
        let text = format!(
            "FAR AWAY PRODUCT NAME\n{}\nA nearby description line for the adapter\n$9.00 MM0A3AM/A\n",
            filler
        );
        let products = extract_products(&text);
        assert_eq!(products.len(), 1);
        assert_ne!(products[0].name, "FAR AWAY PRODUCT NAME");
    }
}
