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

//! Payroll concept records sourced from the corpus view.

use serde::{Deserialize, Serialize};

/// Definitive/transitory classification of a concept.
///
/// Derived from the single-letter `TransitorioDefinitivo` column: `D` (any
/// case) means definitive, anything else transitory. Drives the `SC`/`ST`
/// range filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// Definitive concept (`D`).
    Definitive,
    /// Transitory concept (any other letter).
    Transitory,
}

impl Classification {
    /// Derive the classification from the raw source column.
    pub fn from_letter(letter: Option<&str>) -> Self {
        match letter {
            Some(l) if l.eq_ignore_ascii_case("D") => Classification::Definitive,
            _ => Classification::Transitory,
        }
    }

    /// Whether the concept is definitive.
    pub fn is_definitive(self) -> bool {
        matches!(self, Classification::Definitive)
    }
}

/// A payroll concept as read from the `ConceptoTipoLiqFormula` view.
///
/// Read-only: the corpus is never mutated by this system. The view groups by
/// `(CodConcepto, CodFormula)`, so a concept code with more than one formula
/// yields more than one `Concept` row; each row is parsed and indexed
/// independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Concept {
    /// Short alphanumeric concept code (`CodConcepto`).
    pub code: String,
    /// Formula identifier (`CodFormula`).
    pub formula_code: Option<String>,
    /// Concept description.
    pub description: Option<String>,
    /// Formula description.
    pub formula_description: Option<String>,
    /// Full formula text with embedded `%TOKEN%` variables.
    pub formula: Option<String>,
    /// Formula condition, same grammar as the formula.
    pub condition: Option<String>,
    /// Definitive/transitory classification.
    pub classification: Classification,
    /// Liquidation types aggregated with `-` by the corpus query.
    pub liquidation_types: Option<String>,
    /// Concept type code, carried through opaquely.
    pub type_code: Option<String>,
    /// Display ordering, carried through opaquely.
    pub ordering: Option<i32>,
    /// Optional per-concept self-values referenced by `VAL1`/`VAL2`/`VAL3`
    /// variables with the `0000` self code.
    pub v1: Option<f64>,
    /// Second self-value.
    pub v2: Option<f64>,
    /// Third self-value.
    pub v3: Option<f64>,
}

impl Concept {
    /// Whether the concept is classified as definitive.
    pub fn is_definitive(&self) -> bool {
        self.classification.is_definitive()
    }
}
