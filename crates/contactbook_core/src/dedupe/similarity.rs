use crate::model::contact::Contact;

/// Minimum score for the insert-time near-duplicate offer (inclusive).
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.8;
/// Score a pair must exceed to be proposed for a batch merge.
pub const AUTO_MERGE_THRESHOLD: f64 = 0.9;

/// Closest existing record for a candidate name.
#[derive(Debug, Clone, PartialEq)]
pub struct NearDuplicate {
    /// Position of the match in the scanned record slice.
    pub index: usize,
    pub name: String,
    pub score: f64,
}

/// Pair proposed for a batch merge; `second` merges into `first`.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeCandidate {
    pub first: usize,
    pub second: usize,
    pub score: f64,
}

/// Normalized Levenshtein similarity; `1.0` means identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

/// Finds the single closest existing name scoring at least
/// [`NEAR_DUPLICATE_THRESHOLD`]. Names are compared as written; on equal
/// scores the earliest record wins.
pub fn find_near_duplicate(name: &str, contacts: &[Contact]) -> Option<NearDuplicate> {
    let mut best: Option<NearDuplicate> = None;
    for (index, contact) in contacts.iter().enumerate() {
        let score = similarity_ratio(name, &contact.name);
        if score < NEAR_DUPLICATE_THRESHOLD {
            continue;
        }
        if best.as_ref().map_or(true, |current| score > current.score) {
            best = Some(NearDuplicate {
                index,
                name: contact.name.clone(),
                score,
            });
        }
    }
    best
}

/// Lists every unordered pair whose lowercased names score above
/// [`AUTO_MERGE_THRESHOLD`], in `(i, j)` scan order with `i < j`.
pub fn auto_merge_candidates(contacts: &[Contact]) -> Vec<MergeCandidate> {
    let lowered: Vec<String> = contacts.iter().map(|c| c.name.to_lowercase()).collect();
    let mut candidates = Vec::new();
    for first in 0..lowered.len() {
        for second in (first + 1)..lowered.len() {
            let score = similarity_ratio(&lowered[first], &lowered[second]);
            if score > AUTO_MERGE_THRESHOLD {
                candidates.push(MergeCandidate {
                    first,
                    second,
                    score,
                });
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::{auto_merge_candidates, find_near_duplicate, similarity_ratio};
    use crate::model::contact::Contact;

    fn named(names: &[&str]) -> Vec<Contact> {
        names.iter().map(|name| Contact::new(*name).unwrap()).collect()
    }

    #[test]
    fn ratio_bounds() {
        assert_eq!(similarity_ratio("Ada", "Ada"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        let close = similarity_ratio("Jon Smith", "John Smith");
        assert!(close >= 0.8 && close < 1.0);
    }

    #[test]
    fn near_duplicate_picks_best_match_above_threshold() {
        let contacts = named(&["Alice Wong", "Jon Smith", "John Smyth"]);
        let found = find_near_duplicate("John Smith", &contacts).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.name, "Jon Smith");

        assert!(find_near_duplicate("Zed", &contacts).is_none());
    }

    #[test]
    fn near_duplicate_is_case_sensitive() {
        let contacts = named(&["JOHN SMITH"]);
        assert!(find_near_duplicate("john smith", &contacts).is_none());
    }

    #[test]
    fn near_duplicate_threshold_is_inclusive() {
        // One edit in five characters scores exactly 0.8.
        let found = find_near_duplicate("abcde", &named(&["abcdX"])).unwrap();
        assert_eq!(found.name, "abcdX");
        assert!((found.score - 0.8).abs() < 1e-9);

        assert!(find_near_duplicate("abcde", &named(&["abcXY"])).is_none());
    }

    #[test]
    fn near_duplicate_ties_keep_earliest() {
        let contacts = named(&["Jon Smith", "John Smit"]);
        let found = find_near_duplicate("John Smith", &contacts).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn candidates_compare_lowercased_names_strictly_above_threshold() {
        let contacts = named(&["Katherine Johnson", "katherine johnsen", "Bob", "Bob"]);
        let pairs: Vec<(usize, usize)> = auto_merge_candidates(&contacts)
            .into_iter()
            .map(|c| (c.first, c.second))
            .collect();
        assert_eq!(pairs, vec![(0, 1), (2, 3)]);

        // 9 of 10 characters match: exactly 0.9, not above it.
        let borderline = named(&["abcdefghij", "abcdefghiX"]);
        assert!(auto_merge_candidates(&borderline).is_empty());
    }
}
