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

//! Corpus contract: the read-only view of payroll concepts.

use formu_core::Concept;

use crate::error::StoreError;

/// Thin contract over the concept corpus.
///
/// Implementations are stateless per call; connection pooling and query
/// concurrency are the driver's concern. The corpus groups by
/// `(CodConcepto, CodFormula)`, so `all` and `code_range` may return more
/// than one row per concept code.
pub trait ConceptCorpus: Send + Sync {
    /// Every concept row, ordered by code.
    fn all(&self) -> Result<Vec<Concept>, StoreError>;

    /// First row for a concept code, if the code exists.
    fn by_code(&self, code: &str) -> Result<Option<Concept>, StoreError>;

    /// Rows with code in `[lo, hi]` (inclusive, string comparison as in the
    /// backing view), ordered by code.
    fn code_range(&self, lo: &str, hi: &str) -> Result<Vec<Concept>, StoreError>;
}
