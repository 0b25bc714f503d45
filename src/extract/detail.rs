use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

static BOLD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("b").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

/// Literal warning shown by the age-verification interstitial.
pub const AGE_GATE_TEXT: &str = "Please enter your birth date to continue:";

/// Genres from a game detail page: the `<b>Genre:</b>` label is followed by
/// a sibling `<span>` holding one link per genre. Returns them in document
/// order; an empty vec when the page has no genre block.
pub fn extract_genres(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    for bold in document.select(&BOLD_SEL) {
        let text: String = bold.text().collect();
        if text.trim() != "Genre:" {
            continue;
        }
        let span = bold
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "span");
        return match span {
            Some(span) => span
                .select(&ANCHOR_SEL)
                .map(|a| a.text().collect::<String>().trim().to_string())
                .collect(),
            None => Vec::new(),
        };
    }

    Vec::new()
}

/// True when the markup carries the age-gate interstitial instead of the
/// game page itself.
pub fn detect_age_gate(html: &str) -> bool {
    html.contains(AGE_GATE_TEXT)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{name}.html")).unwrap()
    }

    #[test]
    fn genres_extracted_in_document_order() {
        let genres = extract_genres(&fixture("game_detail"));
        assert_eq!(genres, ["Action", "Indie"]);
    }

    #[test]
    fn page_without_genre_label_yields_empty() {
        assert!(extract_genres("<html><body><b>Title:</b></body></html>").is_empty());
    }

    #[test]
    fn genre_label_without_span_yields_empty() {
        assert!(extract_genres("<html><body><b>Genre:</b><p>none</p></body></html>").is_empty());
    }

    #[test]
    fn age_gate_detected_by_literal_text() {
        assert!(detect_age_gate(&fixture("age_gate")));
        assert!(detect_age_gate(
            "<div>Please enter your birth date to continue:</div>"
        ));
        assert!(!detect_age_gate(&fixture("game_detail")));
        assert!(!detect_age_gate(""));
    }
}
