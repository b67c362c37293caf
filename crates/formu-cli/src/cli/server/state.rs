//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use formu::index::DependencyIndex;
use formu::store::{ConceptCorpus, PayrollStore};
use formu::{ConceptService, PayrollService};

/// State cloned into every handler: the services plus the index they share.
#[derive(Clone)]
pub struct AppState {
    /// Concept coordination service.
    pub concepts: ConceptService,
    /// Payroll aggregation service.
    pub payroll: PayrollService,
    /// Reverse-dependency index, shared with `concepts`.
    pub index: Arc<DependencyIndex>,
}

impl AppState {
    /// Assemble the state from store contracts.
    pub fn from_parts(
        corpus: Arc<dyn ConceptCorpus>,
        payroll: Arc<dyn PayrollStore>,
        refresh_minutes: u64,
    ) -> Self {
        let index = Arc::new(DependencyIndex::new(corpus.clone(), refresh_minutes));
        Self {
            concepts: ConceptService::new(corpus, index.clone()),
            payroll: PayrollService::new(payroll),
            index,
        }
    }
}
