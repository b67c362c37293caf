// Copyright 2025 Formu Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-memory reverse-dependency index
//!
//! For every concept code C the index answers "which concepts reference C",
//! either directly through a single-concept variable or through a range
//! containing C. Ranges are stored as `"lo-hi"` keys only; containment is
//! tested at query time, keeping the index size proportional to the corpus
//! plus the number of distinct ranges rather than range widths.
//!
//! The whole state is an immutable snapshot behind a lock: readers clone the
//! `Arc` at call entry and never observe a partial build. Rebuilds run to
//! completion off to the side, serialize among themselves, and swap the
//! snapshot atomically. A failed rebuild leaves the previous snapshot
//! authoritative; an empty corpus installs an empty snapshot.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use formu_parser::VariableParser;
use formu_store::{ConceptCorpus, StoreError};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{error, info};

/// Immutable result of one index build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Snapshot {
    /// `direct[C]` = codes whose formula or condition references C.
    direct: HashMap<String, BTreeSet<String>>,
    /// `"lo-hi"` (literal digit strings) → referencing codes.
    ranges: HashMap<String, BTreeSet<String>>,
}

/// Index statistics, also the payload of the cache endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    /// False until the first build completes.
    pub ready: bool,
    /// Total entries: direct plus range keys.
    pub entries: usize,
    /// Direct reverse-dependency entries.
    #[serde(rename = "directEntries")]
    pub direct_entries: usize,
    /// Distinct range keys.
    #[serde(rename = "rangeEntries")]
    pub range_entries: usize,
    /// Code with the largest direct reverse fan-in.
    #[serde(rename = "conceptoMasDependientes", skip_serializing_if = "Option::is_none")]
    pub top_code: Option<String>,
    /// Fan-in of `top_code`.
    #[serde(rename = "maxDependientes", skip_serializing_if = "Option::is_none")]
    pub top_count: Option<usize>,
    /// Configured rebuild interval.
    #[serde(rename = "expirationMinutes")]
    pub refresh_minutes: u64,
}

/// Reverse-dependency index over a concept corpus.
pub struct DependencyIndex {
    corpus: Arc<dyn ConceptCorpus>,
    parser: VariableParser,
    snapshot: RwLock<Arc<Snapshot>>,
    ready: AtomicBool,
    rebuild: Mutex<()>,
    refresh_minutes: u64,
}

impl DependencyIndex {
    /// Index over `corpus`, advertising the configured refresh interval in
    /// its stats. The index is empty and not ready until [`build`] runs.
    ///
    /// [`build`]: DependencyIndex::build
    pub fn new(corpus: Arc<dyn ConceptCorpus>, refresh_minutes: u64) -> Self {
        Self {
            corpus,
            parser: VariableParser::new(),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            ready: AtomicBool::new(false),
            rebuild: Mutex::new(()),
            refresh_minutes,
        }
    }

    /// Synchronous full rebuild from the current corpus.
    ///
    /// Concurrent calls serialize; each builds a complete snapshot. Readers
    /// keep seeing the previous snapshot until the swap. On failure the
    /// previous snapshot stays authoritative.
    pub fn build(&self) -> Result<IndexStats, StoreError> {
        let _guard = self.rebuild.lock();
        let started = Instant::now();

        let concepts = match self.corpus.all() {
            Ok(concepts) => concepts,
            Err(e) => {
                error!(error = %e, "dependency index rebuild failed; keeping previous snapshot");
                return Err(e);
            }
        };

        let mut next = Snapshot::default();
        for concept in &concepts {
            // Formula and condition are parsed separately so positional
            // attribution inside each string stays honest.
            for text in [concept.formula.as_deref(), concept.condition.as_deref()] {
                let Some(text) = text else { continue };
                for referenced in self.parser.forward_references(text) {
                    next.direct
                        .entry(referenced)
                        .or_default()
                        .insert(concept.code.clone());
                }
                for (lo, hi) in self.parser.ranges(text) {
                    next.ranges
                        .entry(format!("{lo}-{hi}"))
                        .or_default()
                        .insert(concept.code.clone());
                }
            }
        }

        *self.snapshot.write() = Arc::new(next);
        self.ready.store(true, Ordering::Release);

        let stats = self.stats();
        info!(
            concepts = concepts.len(),
            direct = stats.direct_entries,
            ranges = stats.range_entries,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "dependency index rebuilt"
        );
        Ok(stats)
    }

    /// Whether the first build has completed.
    pub fn ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Concepts that reference `code`, directly or through a containing
    /// range. Sorted and deduplicated. Empty until the index is ready.
    pub fn dependents(&self, code: &str) -> Vec<String> {
        if !self.ready() {
            return Vec::new();
        }

        let snapshot = self.snapshot.read().clone();
        let mut result: BTreeSet<String> =
            snapshot.direct.get(code).cloned().unwrap_or_default();

        if let Ok(code_value) = code.parse::<i64>() {
            for (key, holders) in &snapshot.ranges {
                if let Some((lo, hi)) = parse_range_key(key) {
                    if lo <= code_value && code_value <= hi {
                        result.extend(holders.iter().cloned());
                    }
                }
            }
        }

        result.into_iter().collect()
    }

    /// Concepts that reference exactly the range `[lo, hi]`.
    pub fn dependents_of_range(&self, lo: &str, hi: &str) -> Vec<String> {
        let snapshot = self.snapshot.read().clone();
        snapshot
            .ranges
            .get(&format!("{lo}-{hi}"))
            .map(|holders| holders.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Current statistics.
    pub fn stats(&self) -> IndexStats {
        let snapshot = self.snapshot.read().clone();
        let top = snapshot
            .direct
            .iter()
            .max_by_key(|(_, holders)| holders.len())
            .map(|(code, holders)| (code.clone(), holders.len()));

        IndexStats {
            ready: self.ready(),
            entries: snapshot.direct.len() + snapshot.ranges.len(),
            direct_entries: snapshot.direct.len(),
            range_entries: snapshot.ranges.len(),
            top_code: top.as_ref().map(|(code, _)| code.clone()),
            top_count: top.map(|(_, count)| count),
            refresh_minutes: self.refresh_minutes,
        }
    }
}

fn parse_range_key(key: &str) -> Option<(i64, i64)> {
    let (lo, hi) = key.split_once('-')?;
    Some((lo.parse().ok()?, hi.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formu_core::Classification;
    use formu_store::MemoryCorpus;

    fn index_over(corpus: MemoryCorpus) -> (Arc<MemoryCorpus>, DependencyIndex) {
        let corpus = Arc::new(corpus);
        let index = DependencyIndex::new(corpus.clone(), 60);
        (corpus, index)
    }

    #[test]
    fn not_ready_before_first_build() {
        let (_, index) = index_over(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "A",
            "%CALC0100%",
            "",
        )]));
        assert!(!index.ready());
        assert!(index.dependents("0100").is_empty());
        assert!(!index.stats().ready);
    }

    #[test]
    fn direct_references_from_two_concepts() {
        let (_, index) = index_over(MemoryCorpus::new(vec![
            MemoryCorpus::concept("A", "%CALC0100%+%INFO0100%", ""),
            MemoryCorpus::concept("B", "%CALC0100%", ""),
        ]));
        index.build().expect("build");

        assert_eq!(index.dependents("0100"), vec!["A", "B"]);
        assert!(index.dependents("0200").is_empty());
    }

    #[test]
    fn range_reference_answers_containment_at_query_time() {
        let (_, index) = index_over(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "C",
            "%SC00500100%",
            "",
        )]));
        index.build().expect("build");

        // Inside, at both edges, and outside the range.
        assert_eq!(index.dependents("0075"), vec!["C"]);
        assert_eq!(index.dependents("0050"), vec!["C"]);
        assert_eq!(index.dependents("0100"), vec!["C"]);
        assert!(index.dependents("0101").is_empty());
        assert!(index.dependents("0049").is_empty());

        assert_eq!(index.dependents_of_range("0050", "0100"), vec!["C"]);
        assert!(index.dependents_of_range("0050", "0101").is_empty());
    }

    #[test]
    fn non_numeric_codes_only_get_direct_dependents() {
        let (_, index) = index_over(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "C",
            "%SC00500100%",
            "",
        )]));
        index.build().expect("build");
        assert!(index.dependents("ABC").is_empty());
    }

    #[test]
    fn formula_and_condition_union_without_duplicates() {
        let (_, index) = index_over(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "D",
            "%CALC0200%",
            "%CALC0200%",
        )]));
        index.build().expect("build");
        assert_eq!(index.dependents("0200"), vec!["D"]);
    }

    #[test]
    fn self_references_are_not_indexed() {
        let (_, index) = index_over(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "E",
            "%VAL10000%+%CALC0300%",
            "",
        )]));
        index.build().expect("build");
        assert!(index.dependents("0000").is_empty());
        assert_eq!(index.dependents("0300"), vec!["E"]);
    }

    #[test]
    fn rebuild_is_idempotent_over_an_unchanged_corpus() {
        let (_, index) = index_over(MemoryCorpus::new(vec![
            MemoryCorpus::concept("A", "%CALC0100%", ""),
            MemoryCorpus::concept("C", "%ST02000300%", ""),
        ]));
        let first = index.build().expect("first build");
        let dependents_first = index.dependents("0100");
        let second = index.build().expect("second build");

        assert_eq!(first, second);
        assert_eq!(dependents_first, index.dependents("0100"));
        assert_eq!(index.dependents_of_range("0200", "0300"), vec!["C"]);
    }

    #[test]
    fn empty_corpus_installs_an_empty_authoritative_snapshot() {
        let (corpus, index) = index_over(MemoryCorpus::new(vec![
            MemoryCorpus::concept("A", "%CALC0100%", ""),
        ]));
        index.build().expect("build");
        assert_eq!(index.dependents("0100"), vec!["A"]);

        corpus.replace(Vec::new());
        let stats = index.build().expect("rebuild");

        assert!(stats.ready);
        assert_eq!(stats.entries, 0);
        assert!(index.dependents("0100").is_empty());
    }

    #[test]
    fn stats_report_the_largest_fan_in() {
        let (_, index) = index_over(MemoryCorpus::new(vec![
            MemoryCorpus::concept("A", "%CALC0100%", ""),
            MemoryCorpus::concept("B", "%CALC0100%", ""),
            MemoryCorpus::concept("C", "%CALC0200%", ""),
        ]));
        index.build().expect("build");

        let stats = index.stats();
        assert!(stats.ready);
        assert_eq!(stats.direct_entries, 2);
        assert_eq!(stats.top_code.as_deref(), Some("0100"));
        assert_eq!(stats.top_count, Some(2));
        assert_eq!(stats.refresh_minutes, 60);
    }

    #[test]
    fn classification_does_not_affect_indexing() {
        let (_, index) = index_over(MemoryCorpus::new(vec![
            MemoryCorpus::classified_concept("A", "%CALC0100%", "", Classification::Transitory),
        ]));
        index.build().expect("build");
        assert_eq!(index.dependents("0100"), vec!["A"]);
    }
}
