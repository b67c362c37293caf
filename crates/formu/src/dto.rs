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

//! Wire DTOs.
//!
//! Serialized field names follow the contract the visualization front-end
//! already consumes; the Rust side uses the domain vocabulary.

use formu_core::{Concept, ParsedVariable, hash_to_colors};
use serde::Serialize;

/// Concept summary for listings and search results.
#[derive(Debug, Clone, Serialize)]
pub struct ConceptSummary {
    /// Concept code.
    #[serde(rename = "codigo")]
    pub code: String,
    /// Concept description.
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Formula identifier.
    #[serde(rename = "formula", skip_serializing_if = "Option::is_none")]
    pub formula_code: Option<String>,
    /// Full formula text.
    #[serde(rename = "formulaCompleta", skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Formula condition.
    #[serde(rename = "condicionFormula", skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    /// Concept type code.
    #[serde(rename = "tipoConcepto", skip_serializing_if = "Option::is_none")]
    pub type_code: Option<String>,
    /// Aggregated liquidation types (`-`-separated).
    #[serde(rename = "tiposLiquidacion", skip_serializing_if = "Option::is_none")]
    pub liquidation_types: Option<String>,
    /// Display ordering.
    #[serde(rename = "orden", skip_serializing_if = "Option::is_none")]
    pub ordering: Option<i32>,
    /// Whether the concept is definitive.
    #[serde(rename = "definitivo")]
    pub definitive: bool,
    /// Background color derived from the code.
    pub color: String,
    /// Border color, same hue.
    #[serde(rename = "borderColor")]
    pub border_color: String,
}

impl From<&Concept> for ConceptSummary {
    fn from(concept: &Concept) -> Self {
        let colors = hash_to_colors(&concept.code);
        Self {
            code: concept.code.clone(),
            description: concept.description.clone(),
            formula_code: concept.formula_code.clone(),
            formula: concept.formula.clone(),
            condition: concept.condition.clone(),
            type_code: concept.type_code.clone(),
            liquidation_types: concept.liquidation_types.clone(),
            ordering: concept.ordering,
            definitive: concept.is_definitive(),
            color: colors.background,
            border_color: colors.border,
        }
    }
}

/// Full concept detail: summary plus parsed variables and both dependency
/// directions.
#[derive(Debug, Clone, Serialize)]
pub struct ConceptDetail {
    /// Summary fields, flattened into the same object.
    #[serde(flatten)]
    pub summary: ConceptSummary,
    /// Variables parsed from the formula, in scan order.
    pub variables: Vec<ParsedVariable>,
    /// Variables parsed from the condition, in scan order.
    #[serde(rename = "variablesCondicion")]
    pub condition_variables: Vec<ParsedVariable>,
    /// Concept codes this concept references (formula and condition,
    /// deduplicated, self sentinel removed), sorted.
    #[serde(rename = "dependencias")]
    pub forward_dependencies: Vec<String>,
    /// Concept codes referencing this concept, sorted.
    #[serde(rename = "dependientes")]
    pub reverse_dependencies: Vec<String>,
    /// First self-value, when the corpus carries one.
    #[serde(rename = "val1", skip_serializing_if = "Option::is_none")]
    pub v1: Option<f64>,
    /// Second self-value.
    #[serde(rename = "val2", skip_serializing_if = "Option::is_none")]
    pub v2: Option<f64>,
    /// Third self-value.
    #[serde(rename = "val3", skip_serializing_if = "Option::is_none")]
    pub v3: Option<f64>,
}

/// One concept inside a range listing.
#[derive(Debug, Clone, Serialize)]
pub struct RangeItem {
    /// Concept code.
    #[serde(rename = "codigo")]
    pub code: String,
    /// Concept description.
    #[serde(rename = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the concept is definitive.
    #[serde(rename = "definitivo")]
    pub definitive: bool,
    /// Background color derived from the code.
    pub color: String,
    /// Border color, same hue.
    #[serde(rename = "borderColor")]
    pub border_color: String,
}

/// Listing of the concepts a range variable covers, after the SC/ST filter.
#[derive(Debug, Clone, Serialize)]
pub struct RangeListing {
    /// Range identifier: prefix plus both endpoints (e.g. `SC01003600`).
    pub id: String,
    /// Range prefix (`SC`, `ST`, ...).
    #[serde(rename = "tipo")]
    pub prefix: String,
    /// Range start code.
    #[serde(rename = "codigoInicio")]
    pub start: String,
    /// Range end code.
    #[serde(rename = "codigoFin")]
    pub end: String,
    /// Human-readable description of the range kind.
    #[serde(rename = "descripcion")]
    pub description: String,
    /// Filtered concepts, sorted by code.
    #[serde(rename = "conceptos")]
    pub concepts: Vec<RangeItem>,
    /// Background color derived from the id.
    pub color: String,
    /// Border color, same hue.
    #[serde(rename = "borderColor")]
    pub border_color: String,
}

/// Aggregated payroll amounts for one concept in a period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayrollTotal {
    /// Concept code.
    #[serde(rename = "codigoConcepto")]
    pub concept_code: String,
    /// Sum of calculated amounts.
    #[serde(rename = "importeCalculado")]
    pub calculated: f64,
    /// Sum of reported amounts.
    #[serde(rename = "valorInformado")]
    pub reported: f64,
    /// Employee id, present only for single-employee queries.
    #[serde(rename = "legajo", skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Number of payroll lines aggregated.
    #[serde(rename = "cantidadLegajos")]
    pub line_count: usize,
}
