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

//! In-memory store doubles for tests and local experimentation.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use formu_core::{Classification, Concept};

use crate::corpus::ConceptCorpus;
use crate::error::StoreError;
use crate::payroll::{PayrollLine, PayrollStore};

/// In-memory [`ConceptCorpus`]. Contents can be replaced wholesale, which
/// is how tests exercise rebuilds against a changed corpus, and the corpus
/// can be toggled into a failing state to act like an unreachable database.
#[derive(Default)]
pub struct MemoryCorpus {
    concepts: RwLock<Vec<Concept>>,
    failing: AtomicBool,
}

impl MemoryCorpus {
    /// Corpus seeded with the given concepts.
    pub fn new(mut concepts: Vec<Concept>) -> Self {
        concepts.sort_by(|a, b| a.code.cmp(&b.code));
        Self {
            concepts: RwLock::new(concepts),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent call fail, the way an unreachable database
    /// would.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(StoreError::Database {
                message: "corpus unavailable".to_string(),
            });
        }
        Ok(())
    }

    /// Replace the whole corpus.
    pub fn replace(&self, mut concepts: Vec<Concept>) {
        concepts.sort_by(|a, b| a.code.cmp(&b.code));
        if let Ok(mut guard) = self.concepts.write() {
            *guard = concepts;
        }
    }

    /// Build a minimal concept row: code, formula, condition.
    pub fn concept(code: &str, formula: &str, condition: &str) -> Concept {
        Self::classified_concept(code, formula, condition, Classification::Definitive)
    }

    /// Build a minimal concept row with an explicit classification.
    pub fn classified_concept(
        code: &str,
        formula: &str,
        condition: &str,
        classification: Classification,
    ) -> Concept {
        Concept {
            code: code.to_string(),
            formula_code: Some("F1".to_string()),
            description: Some(format!("Concepto {code}")),
            formula_description: None,
            formula: Some(formula.to_string()),
            condition: if condition.is_empty() {
                None
            } else {
                Some(condition.to_string())
            },
            classification,
            liquidation_types: None,
            type_code: None,
            ordering: None,
            v1: None,
            v2: None,
            v3: None,
        }
    }
}

impl ConceptCorpus for MemoryCorpus {
    fn all(&self) -> Result<Vec<Concept>, StoreError> {
        self.check_available()?;
        let concepts = self.concepts.read().map_err(|_| StoreError::PoolPoisoned)?;
        Ok(concepts.clone())
    }

    fn by_code(&self, code: &str) -> Result<Option<Concept>, StoreError> {
        self.check_available()?;
        let concepts = self.concepts.read().map_err(|_| StoreError::PoolPoisoned)?;
        Ok(concepts.iter().find(|c| c.code == code).cloned())
    }

    fn code_range(&self, lo: &str, hi: &str) -> Result<Vec<Concept>, StoreError> {
        self.check_available()?;
        let concepts = self.concepts.read().map_err(|_| StoreError::PoolPoisoned)?;
        Ok(concepts
            .iter()
            .filter(|c| c.code.as_str() >= lo && c.code.as_str() <= hi)
            .cloned()
            .collect())
    }
}

/// In-memory [`PayrollStore`].
#[derive(Default)]
pub struct MemoryPayroll {
    lines: Vec<PayrollLine>,
}

impl MemoryPayroll {
    /// Store seeded with the given lines.
    pub fn new(lines: Vec<PayrollLine>) -> Self {
        Self { lines }
    }
}

impl PayrollStore for MemoryPayroll {
    fn lines_for_period(
        &self,
        year: i32,
        month: i32,
        liquidation_type: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<PayrollLine>, StoreError> {
        let mut lines: Vec<PayrollLine> = self
            .lines
            .iter()
            .filter(|l| l.year == year && l.month == month && l.liquidation_type == liquidation_type)
            .filter(|l| employee_id.is_none_or(|id| l.employee_id == id))
            .cloned()
            .collect();
        lines.sort_by(|a, b| a.concept_code.cmp(&b.concept_code));
        Ok(lines)
    }

    fn liquidation_types(&self) -> Result<Vec<String>, StoreError> {
        let mut types: Vec<String> = self
            .lines
            .iter()
            .map(|l| l.liquidation_type.clone())
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    fn employees_for_period(&self, year: i32, month: i32) -> Result<Vec<String>, StoreError> {
        let mut employees: Vec<String> = self
            .lines
            .iter()
            .filter(|l| l.year == year && l.month == month)
            .map(|l| l.employee_id.clone())
            .collect();
        employees.sort();
        employees.dedup();
        Ok(employees)
    }
}
