//! Category → disease inverted index.
//!
//! Building the index is a pure fold over already-enriched records: for each
//! matched category the record's [`DiseaseSummaryRef`] is appended to that
//! category's bucket unless a ref with the same identifier is already there.
//! Buckets keep first-seen order; categories serialize sorted by name.
//!
//! [`build_index_sharded`] folds contiguous shards in parallel and merges
//! them in shard order under the same rules, so its output is identical to
//! [`build_index`] no matter how the workers are scheduled.

use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{DiseaseSummaryRef, EnrichedDiseaseRecord};

/// Category name → ordered, de-duplicated disease refs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    buckets: BTreeMap<String, Vec<DiseaseSummaryRef>>,
}

impl InvertedIndex {
    pub fn bucket(&self, category: &str) -> Option<&[DiseaseSummaryRef]> {
        self.buckets.get(category).map(Vec::as_slice)
    }

    /// Category names in lexicographic order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DiseaseSummaryRef])> {
        self.buckets
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// The `n` largest buckets, largest first; ties broken by name.
    pub fn top_categories(&self, n: usize) -> Vec<(&str, usize)> {
        let mut sizes: Vec<(&str, usize)> = self.iter().map(|(k, v)| (k, v.len())).collect();
        sizes.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        sizes.truncate(n);
        sizes
    }
}

/// Incremental index fold with per-bucket identifier de-duplication.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    buckets: BTreeMap<String, Vec<DiseaseSummaryRef>>,
    seen: HashMap<String, HashSet<String>>,
}

impl IndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` to the bucket of every category it matched.
    pub fn add(&mut self, record: &EnrichedDiseaseRecord) {
        if record.matched_symptom_categories.is_empty() {
            return;
        }
        let summary = record.summary();
        for (category, phrases) in &record.matched_symptom_categories {
            if !phrases.is_empty() {
                self.push(category, &summary);
            }
        }
    }

    /// Append a partial index after everything added so far.
    pub fn merge(&mut self, partial: InvertedIndex) {
        for (category, refs) in partial.buckets {
            for summary in refs {
                self.push(&category, &summary);
            }
        }
    }

    pub fn finish(self) -> InvertedIndex {
        InvertedIndex {
            buckets: self.buckets,
        }
    }

    fn push(&mut self, category: &str, summary: &DiseaseSummaryRef) {
        let seen = self.seen.entry(category.to_string()).or_default();
        if seen.insert(summary.id.clone()) {
            self.buckets
                .entry(category.to_string())
                .or_default()
                .push(summary.clone());
        }
    }
}

/// Fold `records` into an index, in the order given.
pub fn build_index<'a, I>(records: I) -> InvertedIndex
where
    I: IntoIterator<Item = &'a EnrichedDiseaseRecord>,
{
    let mut builder = IndexBuilder::new();
    for record in records {
        builder.add(record);
    }
    builder.finish()
}

/// [`build_index`] over `shards` contiguous slices folded in parallel.
pub fn build_index_sharded(records: &[EnrichedDiseaseRecord], shards: usize) -> InvertedIndex {
    if shards <= 1 || records.len() < 2 {
        return build_index(records);
    }
    let shard_len = records.len().div_ceil(shards);
    let partials: Vec<InvertedIndex> = records
        .par_chunks(shard_len)
        .map(|chunk| build_index(chunk))
        .collect();

    let mut builder = IndexBuilder::new();
    for partial in partials {
        builder.merge(partial);
    }
    builder.finish()
}
