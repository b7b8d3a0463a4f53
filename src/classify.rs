// src/classify.rs
//! Relevance gate and multi-label keyword classifier.
//!
//! Both are case-insensitive raw substring scans over the item text, kept as
//! plain functions over the taxonomy's rule table. Stem matching is the
//! point: the term `утечк` is meant to hit `утечка` and `утечки`, so there is
//! no word-boundary requirement and no stemming.

use crate::config::Taxonomy;

/// Build the text an item is filtered and classified on.
pub fn item_text(title: &str, summary: &str) -> String {
    format!("{title} {summary}")
}

/// True when any term occurs in the lowercased text. An empty term set
/// disables the gate entirely and everything passes.
pub fn is_relevant(text: &str, terms: &[String]) -> bool {
    if terms.is_empty() {
        return true;
    }
    let low = text.to_lowercase();
    terms.iter().any(|t| low.contains(t.as_str()))
}

/// Assign labels in taxonomy declaration order; a label applies when any of
/// its terms occurs in the text. Falls back to the taxonomy's default label,
/// so the result is never empty.
///
/// Terms are held lowercase by `Taxonomy::normalize_terms`.
pub fn classify(text: &str, taxonomy: &Taxonomy) -> Vec<String> {
    let low = text.to_lowercase();
    let mut labels: Vec<String> = taxonomy
        .categories
        .iter()
        .filter(|rule| rule.terms.iter().any(|t| low.contains(t.as_str())))
        .map(|rule| rule.label.clone())
        .collect();
    if labels.is_empty() {
        labels.push(taxonomy.default_label.clone());
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CategoryRule, Taxonomy};

    fn fire_cyber_taxonomy() -> Taxonomy {
        let mut tax = Taxonomy {
            default_label: "General".to_string(),
            relevance_terms: Vec::new(),
            categories: vec![
                CategoryRule {
                    label: "Fire".to_string(),
                    terms: vec!["fire".to_string(), "explosion".to_string()],
                },
                CategoryRule {
                    label: "Cyber".to_string(),
                    terms: vec!["hack".to_string(), "malware".to_string()],
                },
            ],
        };
        tax.normalize_terms();
        tax
    }

    #[test]
    fn single_label_match() {
        let tax = fire_cyber_taxonomy();
        assert_eq!(classify("Refinery fire forces shutdown", &tax), vec!["Fire"]);
    }

    #[test]
    fn no_match_falls_back_to_default_label() {
        let tax = fire_cyber_taxonomy();
        assert_eq!(classify("Routine maintenance update", &tax), vec!["General"]);
    }

    #[test]
    fn multi_label_follows_taxonomy_order() {
        let tax = fire_cyber_taxonomy();
        assert_eq!(
            classify("Pipeline hack causes fire", &tax),
            vec!["Cyber", "Fire"]
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let tax = fire_cyber_taxonomy();
        let text = "Explosion reported after malware incident";
        assert_eq!(classify(text, &tax), classify(text, &tax));
    }

    #[test]
    fn matching_ignores_case() {
        let tax = fire_cyber_taxonomy();
        assert_eq!(classify("EXPLOSION at plant", &tax), vec!["Fire"]);
    }

    #[test]
    fn cyrillic_stems_match_inside_words() {
        let mut tax = Taxonomy {
            default_label: "Прочее".to_string(),
            relevance_terms: Vec::new(),
            categories: vec![CategoryRule {
                label: "Инфобез".to_string(),
                terms: vec!["утечк".to_string()],
            }],
        };
        tax.normalize_terms();
        assert_eq!(classify("Зафиксирована утечка данных", &tax), vec!["Инфобез"]);
    }

    #[test]
    fn relevance_gate_is_substring_based() {
        let terms = vec!["нефть".to_string(), "pipeline".to_string()];
        assert!(is_relevant("Авария: нефть попала в реку", &terms));
        assert!(is_relevant("Pipeline operator statement", &terms));
        assert!(!is_relevant("Выборы в городской совет", &terms));
    }

    #[test]
    fn empty_relevance_set_passes_everything() {
        assert!(is_relevant("anything at all", &[]));
    }

    #[test]
    fn item_text_joins_title_and_summary() {
        assert_eq!(item_text("a", "b"), "a b");
        assert_eq!(item_text("a", ""), "a ");
    }
}
