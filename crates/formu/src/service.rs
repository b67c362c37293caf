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

//! Concept service: the coordination layer.
//!
//! Composes the variable parser, the reverse-dependency index and the
//! corpus into the payloads the HTTP surface serves. All operations are
//! read-only except [`ConceptService::refresh_index`]. Corpus calls are
//! blocking database work and run on the blocking thread pool.

use std::collections::BTreeSet;
use std::sync::Arc;

use formu_core::{Classification, Concept, hash_to_colors};
use formu_index::{DependencyIndex, IndexStats};
use formu_parser::VariableParser;
use formu_store::ConceptCorpus;
use tokio::task;
use tracing::error;

use crate::dto::{ConceptDetail, ConceptSummary, RangeItem, RangeListing};
use crate::error::ServiceError;

/// Maximum number of search hits.
const SEARCH_CAP: usize = 20;
/// Minimum query length for a search to run.
const SEARCH_MIN_CHARS: usize = 2;

/// Read-only service over the concept corpus.
#[derive(Clone)]
pub struct ConceptService {
    corpus: Arc<dyn ConceptCorpus>,
    parser: VariableParser,
    index: Arc<DependencyIndex>,
}

impl ConceptService {
    /// Service over `corpus`, answering reverse-dependency queries from
    /// `index`.
    pub fn new(corpus: Arc<dyn ConceptCorpus>, index: Arc<DependencyIndex>) -> Self {
        Self {
            corpus,
            parser: VariableParser::new(),
            index,
        }
    }

    /// Every concept as a summary. No formula parsing; meant for listings
    /// and autocomplete.
    pub async fn list(&self) -> Result<Vec<ConceptSummary>, ServiceError> {
        let corpus = self.corpus.clone();
        let concepts = task::spawn_blocking(move || corpus.all()).await??;
        Ok(concepts.iter().map(ConceptSummary::from).collect())
    }

    /// Case-insensitive substring search on code or description, capped at
    /// 20 hits. Queries under 2 characters return nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<ConceptSummary>, ServiceError> {
        if query.chars().count() < SEARCH_MIN_CHARS {
            return Ok(Vec::new());
        }

        let needle = query.to_lowercase();
        let corpus = self.corpus.clone();
        let concepts = task::spawn_blocking(move || corpus.all()).await??;

        Ok(concepts
            .iter()
            .filter(|c| {
                c.code.to_lowercase().contains(&needle)
                    || c.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .take(SEARCH_CAP)
            .map(ConceptSummary::from)
            .collect())
    }

    /// Full detail for one concept: parsed variables from formula and
    /// condition, forward dependencies (deduplicated, self removed) and
    /// reverse dependencies from the index. `None` for unknown codes.
    pub async fn detail(&self, code: &str) -> Result<Option<ConceptDetail>, ServiceError> {
        let corpus = self.corpus.clone();
        let owned_code = code.to_string();
        let concept = task::spawn_blocking(move || corpus.by_code(&owned_code)).await??;

        Ok(concept.map(|concept| self.assemble_detail(&concept)))
    }

    /// Details for several codes at once; unknown codes are skipped.
    pub async fn batch(&self, codes: &[String]) -> Result<Vec<ConceptDetail>, ServiceError> {
        let mut details = Vec::with_capacity(codes.len());
        for code in codes {
            if let Some(detail) = self.detail(code).await? {
                details.push(detail);
            }
        }
        Ok(details)
    }

    /// Concepts in `[lo, hi]` filtered by the range prefix: `SC` keeps
    /// definitive concepts, `ST` transitory ones, anything else keeps all.
    pub async fn range_listing(
        &self,
        prefix: &str,
        lo: &str,
        hi: &str,
    ) -> Result<RangeListing, ServiceError> {
        let corpus = self.corpus.clone();
        let (owned_lo, owned_hi) = (lo.to_string(), hi.to_string());
        let concepts =
            task::spawn_blocking(move || corpus.code_range(&owned_lo, &owned_hi)).await??;

        let keep: Option<Classification> = match prefix {
            "SC" => Some(Classification::Definitive),
            "ST" => Some(Classification::Transitory),
            _ => None,
        };

        let items: Vec<RangeItem> = concepts
            .iter()
            .filter(|c| keep.is_none_or(|wanted| c.classification == wanted))
            .map(|c| {
                let colors = hash_to_colors(&c.code);
                RangeItem {
                    code: c.code.clone(),
                    description: c.description.clone(),
                    definitive: c.is_definitive(),
                    color: colors.background,
                    border_color: colors.border,
                }
            })
            .collect();

        let description = match prefix {
            "SC" => "Suma de conceptos definitivos",
            "ST" => "Suma de conceptos transitorios",
            "SI" => "Suma de valores informados",
            "S" => "Suma de última liquidación",
            "E" => "Especialización",
            _ => "Rango de conceptos",
        };

        let id = format!("{prefix}{lo}{hi}");
        let colors = hash_to_colors(&id);
        Ok(RangeListing {
            id,
            prefix: prefix.to_string(),
            start: lo.to_string(),
            end: hi.to_string(),
            description: description.to_string(),
            concepts: items,
            color: colors.background,
            border_color: colors.border,
        })
    }

    /// Concepts that reference `code`, from the index snapshot.
    pub fn dependents(&self, code: &str) -> Vec<String> {
        self.index.dependents(code)
    }

    /// Force a full index rebuild and return the resulting stats.
    ///
    /// A failed rebuild keeps the previous snapshot authoritative: the
    /// failure is logged and the retained snapshot's stats are returned,
    /// so triggering a refresh never fails a request.
    pub async fn refresh_index(&self) -> IndexStats {
        let index = self.index.clone();
        match task::spawn_blocking(move || index.build()).await {
            Ok(Ok(stats)) => stats,
            Ok(Err(e)) => {
                error!(error = %e, "index refresh failed; previous snapshot retained");
                self.index.stats()
            }
            Err(e) => {
                error!(error = %e, "index refresh task failed; previous snapshot retained");
                self.index.stats()
            }
        }
    }

    /// Current index stats without rebuilding.
    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    fn assemble_detail(&self, concept: &Concept) -> ConceptDetail {
        let formula = concept.formula.as_deref().unwrap_or_default();
        let condition = concept.condition.as_deref().unwrap_or_default();

        let variables = self.parser.parse(formula);
        let condition_variables = self.parser.parse(condition);

        let mut forward: BTreeSet<String> = self.parser.forward_references(formula);
        forward.extend(self.parser.forward_references(condition));

        ConceptDetail {
            summary: ConceptSummary::from(concept),
            variables,
            condition_variables,
            forward_dependencies: forward.into_iter().collect(),
            reverse_dependencies: self.index.dependents(&concept.code),
            v1: concept.v1,
            v2: concept.v2,
            v3: concept.v3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formu_store::MemoryCorpus;

    fn service_over(concepts: Vec<Concept>) -> ConceptService {
        let corpus = Arc::new(MemoryCorpus::new(concepts));
        let index = Arc::new(DependencyIndex::new(corpus.clone(), 60));
        index.build().expect("index build");
        ConceptService::new(corpus, index)
    }

    fn named_concept(code: &str, description: &str) -> Concept {
        Concept {
            description: Some(description.to_string()),
            ..MemoryCorpus::concept(code, "", "")
        }
    }

    #[tokio::test]
    async fn detail_unions_and_dedupes_formula_and_condition_references() {
        let service = service_over(vec![
            MemoryCorpus::concept("D", "%CALC0200%", "%CALC0200%"),
            MemoryCorpus::concept("0200", "", ""),
        ]);

        let detail = service.detail("D").await.expect("query").expect("known code");
        assert_eq!(detail.forward_dependencies, vec!["0200"]);
        assert_eq!(detail.variables.len(), 1);
        assert_eq!(detail.condition_variables.len(), 1);

        let referenced = service.detail("0200").await.expect("query").expect("known");
        assert_eq!(referenced.reverse_dependencies, vec!["D"]);
    }

    #[tokio::test]
    async fn detail_excludes_self_references_from_dependencies() {
        let service = service_over(vec![MemoryCorpus::concept(
            "A",
            "%VAL10000%+%CALC0100%",
            "",
        )]);

        let detail = service.detail("A").await.expect("query").expect("known code");
        assert_eq!(detail.forward_dependencies, vec!["0100"]);
        // The self variable itself is still surfaced.
        assert_eq!(detail.variables.len(), 2);
    }

    #[tokio::test]
    async fn detail_of_unknown_code_is_none() {
        let service = service_over(vec![]);
        assert!(service.detail("9999").await.expect("query").is_none());
    }

    #[tokio::test]
    async fn search_enforces_minimum_length_and_cap() {
        let mut concepts: Vec<Concept> = (0..30)
            .map(|i| named_concept(&format!("{i:04}"), "Salario basico"))
            .collect();
        concepts.push(named_concept("9000", "Otra cosa"));
        let service = service_over(concepts);

        assert!(service.search("").await.expect("query").is_empty());
        assert!(service.search("a").await.expect("query").is_empty());

        let hits = service.search("sal").await.expect("query");
        assert_eq!(hits.len(), 20);

        let by_code = service.search("9000").await.expect("query");
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].code, "9000");
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let service = service_over(vec![named_concept("0001", "Antigüedad MENSUAL")]);
        let hits = service.search("mensual").await.expect("query");
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn range_listing_filters_by_prefix() {
        let service = service_over(vec![
            MemoryCorpus::classified_concept("0050", "", "", Classification::Definitive),
            MemoryCorpus::classified_concept("0060", "", "", Classification::Transitory),
            MemoryCorpus::classified_concept("0100", "", "", Classification::Definitive),
            MemoryCorpus::classified_concept("0200", "", "", Classification::Definitive),
        ]);

        let definitive = service
            .range_listing("SC", "0050", "0100")
            .await
            .expect("query");
        let codes: Vec<&str> = definitive.concepts.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["0050", "0100"]);
        assert_eq!(definitive.description, "Suma de conceptos definitivos");
        assert_eq!(definitive.id, "SC00500100");

        let transitory = service
            .range_listing("ST", "0050", "0100")
            .await
            .expect("query");
        let codes: Vec<&str> = transitory.concepts.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["0060"]);

        let unfiltered = service
            .range_listing("", "0050", "0100")
            .await
            .expect("query");
        assert_eq!(unfiltered.concepts.len(), 3);
        assert_eq!(unfiltered.description, "Rango de conceptos");
    }

    #[tokio::test]
    async fn batch_skips_unknown_codes() {
        let service = service_over(vec![
            MemoryCorpus::concept("A", "%CALC0100%", ""),
            MemoryCorpus::concept("B", "", ""),
        ]);

        let details = service
            .batch(&["A".to_string(), "NOPE".to_string(), "B".to_string()])
            .await
            .expect("query");
        let codes: Vec<&str> = details.iter().map(|d| d.summary.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn refresh_returns_fresh_stats() {
        let service = service_over(vec![MemoryCorpus::concept("A", "%CALC0100%", "")]);
        let stats = service.refresh_index().await;
        assert!(stats.ready);
        assert_eq!(stats.direct_entries, 1);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_the_previous_snapshot() {
        let corpus = Arc::new(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "A",
            "%CALC0100%",
            "",
        )]));
        let index = Arc::new(DependencyIndex::new(corpus.clone(), 60));
        index.build().expect("first build");
        let service = ConceptService::new(corpus.clone(), index);

        corpus.set_failing(true);
        let stats = service.refresh_index().await;

        // The retained snapshot's stats come back and queries still work.
        assert!(stats.ready);
        assert_eq!(stats.direct_entries, 1);
        assert_eq!(service.dependents("0100"), vec!["A"]);
    }

    #[test]
    fn detail_serializes_with_wire_field_names() {
        let corpus = Arc::new(MemoryCorpus::new(vec![MemoryCorpus::concept(
            "A",
            "%CALC0100%",
            "",
        )]));
        let index = Arc::new(DependencyIndex::new(corpus.clone(), 60));
        index.build().expect("index build");
        let service = ConceptService::new(corpus, index);

        let concept = MemoryCorpus::concept("A", "%CALC0100%", "");
        let detail = service.assemble_detail(&concept);
        let value = serde_json::to_value(&detail).expect("serializes");

        assert_eq!(value["codigo"], "A");
        assert!(value["definitivo"].is_boolean());
        assert!(value["dependencias"].is_array());
        assert!(value["dependientes"].is_array());
        assert_eq!(value["variables"][0]["nombre"], "CALC0100");
        assert_eq!(value["variables"][0]["tipo"], "SINGLE_CONCEPT");
    }
}
