//! Fuzzy lookup of a table name inside the live table catalog.
//!
//! The model extracts table names from free text, so the argument is often
//! misspelled or partial. Candidates are scored with the sequence ratio
//! `2 * M / T`, where `M` counts matched characters and `T` is the combined
//! length, so a prefix like `person` still reaches `person_details`. A
//! candidate is accepted only when its ratio reaches [`MATCH_CUTOFF`].

use similar::TextDiff;

pub const MATCH_CUTOFF: f64 = 0.6;

pub fn similarity(guess: &str, candidate: &str) -> f64 {
    f64::from(TextDiff::from_chars(guess, candidate).ratio())
}

/// Best-scoring candidate at or above `cutoff`. Ties go to the earliest candidate.
pub fn best_match<'a, S: AsRef<str>>(
    guess: &str,
    candidates: &'a [S],
    cutoff: f64,
) -> Option<&'a str> {
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let candidate = candidate.as_ref();
        let score = similarity(guess, candidate);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if best_score >= score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<String> {
        vec![
            "inventory_table".to_string(),
            "person_details".to_string(),
            "province_table".to_string(),
        ]
    }

    #[test]
    fn misspelled_guess_finds_the_closest_table() {
        let tables = catalog();
        assert_eq!(
            best_match("provnce_table", &tables, MATCH_CUTOFF),
            Some("province_table")
        );
        assert_eq!(
            best_match("inventory_tbl", &tables, MATCH_CUTOFF),
            Some("inventory_table")
        );
        assert_eq!(
            best_match("person_detail", &tables, MATCH_CUTOFF),
            Some("person_details")
        );
    }

    #[test]
    fn partial_guess_finds_the_longer_table() {
        let tables = catalog();
        assert_eq!(best_match("person", &tables, MATCH_CUTOFF), Some("person_details"));
        assert_eq!(best_match("province", &tables, MATCH_CUTOFF), Some("province_table"));
        assert_eq!(best_match("inventory", &tables, MATCH_CUTOFF), Some("inventory_table"));
    }

    #[test]
    fn prefix_ratio_sits_on_the_cutoff() {
        // Six shared characters over twenty in total.
        assert!((similarity("person", "person_details") - 0.6).abs() < 1e-6);
        assert!(similarity("person", "person_details") >= MATCH_CUTOFF);
    }

    #[test]
    fn exact_name_wins() {
        let tables = catalog();
        assert_eq!(
            best_match("person_details", &tables, MATCH_CUTOFF),
            Some("person_details")
        );
    }

    #[test]
    fn unrelated_or_empty_guess_matches_nothing() {
        let tables = catalog();
        assert_eq!(best_match("weather", &tables, MATCH_CUTOFF), None);
        assert_eq!(best_match("", &tables, MATCH_CUTOFF), None);
        assert_eq!(best_match("anything", &Vec::<String>::new(), MATCH_CUTOFF), None);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let tables = vec!["table_a".to_string(), "table_b".to_string()];
        assert_eq!(best_match("table_c", &tables, MATCH_CUTOFF), Some("table_a"));
    }

    #[test]
    fn cutoff_filters_low_scores() {
        // Four shared characters over ten in total score 0.8.
        let tables = vec!["abcde".to_string()];
        assert_eq!(best_match("abcdx", &tables, 0.79), Some("abcde"));
        assert_eq!(best_match("abcdx", &tables, 0.81), None);
    }
}
