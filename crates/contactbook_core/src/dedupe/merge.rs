use super::similarity::auto_merge_candidates;
use crate::model::contact::Contact;
use std::collections::HashSet;

/// Summary of one batch merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutoMergeReport {
    /// `(kept, removed)` names for every confirmed merge, in confirmation order.
    pub merged: Vec<(String, String)>,
}

impl AutoMergeReport {
    pub fn removed_count(&self) -> usize {
        self.merged.len()
    }
}

/// Insert-time merge of `incoming` into `target`.
///
/// Phone and email are copied only into empty target fields. Tags become the
/// union of both sides with exact duplicates removed.
pub fn merge_into_existing(target: &mut Contact, incoming: &Contact) {
    if target.phone.is_empty() {
        target.phone = incoming.phone.clone();
    }
    if target.email.is_empty() {
        target.email = incoming.email.clone();
    }

    let combined: Vec<String> = {
        let mut seen = HashSet::new();
        target
            .tags
            .iter()
            .chain(incoming.tags.iter())
            .filter(|tag| seen.insert(tag.as_str()))
            .cloned()
            .collect()
    };
    target.tags = combined;
}

/// Batch merge across the whole set.
///
/// For each candidate pair (see [`auto_merge_candidates`]) `confirm` decides
/// whether the later record merges into the earlier one: the phone is copied
/// when the earlier record has none, and tags are appended without
/// deduplication. Merged records are removed once every pair was evaluated.
/// Pairs touching an already-removed record are skipped.
pub fn auto_merge<F>(contacts: &mut Vec<Contact>, mut confirm: F) -> AutoMergeReport
where
    F: FnMut(&Contact, &Contact) -> bool,
{
    let mut removed = vec![false; contacts.len()];
    let mut report = AutoMergeReport::default();

    for candidate in auto_merge_candidates(contacts) {
        let (first, second) = (candidate.first, candidate.second);
        if removed[first] || removed[second] {
            continue;
        }
        if !confirm(&contacts[first], &contacts[second]) {
            continue;
        }

        let (head, tail) = contacts.split_at_mut(second);
        let kept = &mut head[first];
        let absorbed = &tail[0];
        if kept.phone.is_empty() {
            kept.phone = absorbed.phone.clone();
        }
        kept.tags.extend(absorbed.tags.iter().cloned());
        report.merged.push((kept.name.clone(), absorbed.name.clone()));
        removed[second] = true;
    }

    let mut index = 0;
    contacts.retain(|_| {
        let keep = !removed[index];
        index += 1;
        keep
    });
    report
}
