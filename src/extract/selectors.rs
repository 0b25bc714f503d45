use anyhow::{anyhow, Result};
use scraper::Selector;

/// Storefront class names for the yearly listing pages, held as data so a
/// markup change is a configuration change rather than a code change. The
/// class names are build hashes and identical across all four snapshots and
/// all three page kinds.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    pub group: String,
    pub group_label: String,
    pub card: String,
    pub card_image: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            group: "_2NfLqUpH_h0Ba0jlv9M9ZE".to_string(),
            group_label: "_3FRxVBrTtFQLhmHRstBbC_".to_string(),
            card: "_2yyhUHhk3d1DRpG4Sx9_og".to_string(),
            card_image: "cODQhXeXS-Yn-vLIBNwyW".to_string(),
        }
    }
}

impl ListingSelectors {
    pub fn compile(&self) -> Result<CompiledSelectors> {
        Ok(CompiledSelectors {
            group: class_selector(&self.group)?,
            group_label: class_selector(&self.group_label)?,
            card: class_selector(&self.card)?,
            card_image: class_selector(&self.card_image)?,
            anchor: Selector::parse("a").map_err(|e| anyhow!("anchor selector: {e}"))?,
        })
    }
}

/// Compiled counterparts ready for `scraper` queries.
pub struct CompiledSelectors {
    pub group: Selector,
    pub group_label: Selector,
    pub card: Selector,
    pub card_image: Selector,
    pub anchor: Selector,
}

fn class_selector(class: &str) -> Result<Selector> {
    // A configured class must be one CSS identifier; anything else would
    // still parse once wrapped in ".{class}" (e.g. a space turns it into a
    // descendant selector) and silently match the wrong elements.
    if !is_css_identifier(class) {
        return Err(anyhow!("class name {class:?} is not a CSS identifier"));
    }
    Selector::parse(&format!(".{class}")).map_err(|e| anyhow!("selector .{class}: {e}"))
}

fn is_css_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Controls on the age-verification interstitial. The year select and the
/// confirm button keep stable ids, unlike the hashed listing classes.
#[derive(Debug, Clone)]
pub struct AgeGateSelectors {
    pub year_select: String,
    pub view_button: String,
}

impl Default for AgeGateSelectors {
    fn default() -> Self {
        Self {
            year_select: "select#ageYear".to_string(),
            view_button: "#view_product_page_btn".to_string(),
        }
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selectors_compile() {
        assert!(ListingSelectors::default().compile().is_ok());
    }

    #[test]
    fn bad_class_is_rejected() {
        for bad in ["not a class", "", ".leading-dot", "1starts-with-digit"] {
            let selectors = ListingSelectors {
                group: bad.to_string(),
                ..Default::default()
            };
            assert!(selectors.compile().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn hashed_class_names_are_identifiers() {
        let defaults = ListingSelectors::default();
        for class in [
            defaults.group.as_str(),
            defaults.group_label.as_str(),
            defaults.card.as_str(),
            defaults.card_image.as_str(),
        ] {
            assert!(is_css_identifier(class), "{class:?}");
        }
    }
}
