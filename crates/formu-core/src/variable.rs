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

//! Parsed formula variables.
//!
//! A formula embeds variables as `%TOKEN%` occurrences. The parser classifies
//! every token into one of three kinds and produces a [`ParsedVariable`]
//! descriptor per occurrence. Serialized field names follow the wire contract
//! the visualization front-end already consumes.

use serde::{Deserialize, Serialize};

/// Sentinel concept code meaning "this concept itself" (e.g. `VAL10000`).
pub const SELF_REFERENCE: &str = "0000";

/// The three kinds a parsed variable may belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// References exactly one other concept (e.g. `CALC3498`).
    #[serde(rename = "SINGLE_CONCEPT")]
    SingleConcept,
    /// References a numeric range of concepts (e.g. `SC01003600`).
    #[serde(rename = "RANGE")]
    Range,
    /// References nothing (e.g. `ANTIGUEDAD`).
    #[serde(rename = "TERMINAL")]
    Terminal,
}

/// One `%TOKEN%` occurrence, classified and positioned.
///
/// The list produced for a formula is sorted by `span_start` and
/// non-overlapping; spans are byte offsets into the source string covering
/// the `%`-delimited occurrence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedVariable {
    /// Literal token between the `%` markers.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Registered pattern prefix that matched; equals `name` for
    /// unrecognized tokens.
    #[serde(rename = "prefijo")]
    pub prefix: String,
    /// Variable kind.
    #[serde(rename = "tipo")]
    pub kind: VariableKind,
    /// Referenced concept code. Only for [`VariableKind::SingleConcept`];
    /// may be the [`SELF_REFERENCE`] sentinel.
    #[serde(rename = "conceptoReferenciado", skip_serializing_if = "Option::is_none")]
    pub referenced_concept: Option<String>,
    /// Range start, 4-digit zero-padded. Only for [`VariableKind::Range`].
    #[serde(rename = "rangoInicio", skip_serializing_if = "Option::is_none")]
    pub range_start: Option<String>,
    /// Range end, 4-digit zero-padded. Only for [`VariableKind::Range`].
    #[serde(rename = "rangoFin", skip_serializing_if = "Option::is_none")]
    pub range_end: Option<String>,
    /// Human-readable text with the pattern's placeholders substituted.
    #[serde(rename = "textoMostrar")]
    pub display_text: String,
    /// Free-text description of the matched pattern, when the registry
    /// defines one; `"unrecognized"` for unknown tokens.
    #[serde(rename = "descripcionPatron", skip_serializing_if = "Option::is_none")]
    pub pattern_description: Option<String>,
    /// Background color derived from the referenced concept (or the token
    /// itself for ranges and terminals).
    pub color: String,
    /// Border color, same hue as `color`.
    #[serde(rename = "borderColor")]
    pub border_color: String,
    /// Byte offset of the opening `%` in the source formula.
    #[serde(rename = "posicionInicio")]
    pub span_start: usize,
    /// Byte offset just past the closing `%`.
    #[serde(rename = "posicionFin")]
    pub span_end: usize,
}

impl ParsedVariable {
    /// Referenced concept code, unless it is the self sentinel.
    pub fn external_reference(&self) -> Option<&str> {
        match self.referenced_concept.as_deref() {
            Some(code) if code != SELF_REFERENCE => Some(code),
            _ => None,
        }
    }
}
