//! Fuzzy duplicate detection and merging.
//!
//! # Responsibility
//! - Score name closeness with an edit-distance ratio in `[0, 1]`.
//! - Offer a single near-duplicate at insert time (score >= 0.8).
//! - Batch-merge caller-confirmed pairs across a whole record set
//!   (lowercased score > 0.9).
//!
//! # Invariants
//! - Insert-time merges deduplicate tags; batch merges concatenate them.
//!   Both behaviors are observable and kept distinct on purpose.
//! - Merges only fill empty fields on the surviving record; they never
//!   overwrite a non-empty value.
//! - Batch merge never offers a pair in which either record was already
//!   absorbed earlier in the same run. In a chain `A≈B≈C` with `A≉C`, only
//!   `(A, B)` is offered and `C` survives untouched, so nothing is merged
//!   into a record that is about to be removed.
//! - Batch merge is O(n²) over the record set.

mod merge;
mod similarity;

pub use merge::{auto_merge, merge_into_existing, AutoMergeReport};
pub use similarity::{
    auto_merge_candidates, find_near_duplicate, similarity_ratio, MergeCandidate, NearDuplicate,
    AUTO_MERGE_THRESHOLD, NEAR_DUPLICATE_THRESHOLD,
};
