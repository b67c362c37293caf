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

//! The `%TOKEN%` scanner and classifier.

use std::collections::BTreeSet;

use formu_core::{ParsedVariable, SELF_REFERENCE, VariableKind, hash_to_colors};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::registry::PatternRegistry;

/// Candidate variables: uppercase-alphanumeric text between `%` markers.
static TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new("%([A-Z0-9]+)%").unwrap_or_else(|e| panic!("token pattern: {e}")));

/// Parses formulas into ordered lists of [`ParsedVariable`]s.
///
/// Parsing is deterministic and idempotent, and never fails: tokens the
/// registry does not know become synthetic terminals with
/// `pattern_description = "unrecognized"`.
#[derive(Clone, Copy)]
pub struct VariableParser {
    registry: &'static PatternRegistry,
}

impl Default for VariableParser {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableParser {
    /// Parser over the process-wide pattern registry.
    pub fn new() -> Self {
        Self {
            registry: PatternRegistry::global(),
        }
    }

    /// Extract every variable of a formula, in scan order.
    ///
    /// Occurrences are non-overlapping and sorted by span; spans are byte
    /// offsets of the `%…%` occurrence in `formula`. Empty or blank input
    /// yields an empty list.
    pub fn parse(&self, formula: &str) -> Vec<ParsedVariable> {
        if formula.trim().is_empty() {
            return Vec::new();
        }

        let mut variables = Vec::new();
        for occurrence in TOKEN.find_iter(formula) {
            let token = occurrence.as_str().trim_matches('%');
            let mut variable = self.parse_token(token);
            variable.span_start = occurrence.start();
            variable.span_end = occurrence.end();
            variables.push(variable);
        }
        variables
    }

    /// Classify a bare token (without the `%` markers).
    pub fn parse_token(&self, name: &str) -> ParsedVariable {
        let Some(found) = self.registry.find(name) else {
            return Self::unrecognized(name);
        };

        let entry = found.entry;
        let description = self.registry.description(entry.prefix).map(str::to_string);

        match entry.kind {
            VariableKind::Range => {
                let start = found.groups[0].clone();
                let end = found.groups[1].clone();
                let display = entry
                    .display
                    .replace("{nnnn}", &start)
                    .replace("{xxxx}", &end);
                let colors = hash_to_colors(name);
                ParsedVariable {
                    name: name.to_string(),
                    prefix: entry.prefix.to_string(),
                    kind: VariableKind::Range,
                    referenced_concept: None,
                    range_start: Some(start),
                    range_end: Some(end),
                    display_text: display,
                    pattern_description: description,
                    color: colors.background,
                    border_color: colors.border,
                    span_start: 0,
                    span_end: 0,
                }
            }
            VariableKind::SingleConcept => {
                let concept = found.groups[0].clone();
                let is_self = concept == SELF_REFERENCE;

                let mut display = match (is_self, entry.self_display) {
                    (true, Some(self_display)) => self_display.to_string(),
                    _ => entry.display.replace("{nnnn}", &concept),
                };

                // CC/CI carry months-back and liquidation-type captures;
                // CALU/CALX carry the liquidation-type letter.
                if matches!(entry.prefix, "CC" | "CI") && found.groups.len() >= 4 {
                    display = display
                        .replace("{mm}", &found.groups[1])
                        .replace("{l}", &found.groups[3]);
                } else if matches!(entry.prefix, "CALU" | "CALX") && found.groups.len() >= 2 {
                    display = display.replace("{l}", &found.groups[1]);
                }

                let colors = hash_to_colors(&concept);
                ParsedVariable {
                    name: name.to_string(),
                    prefix: entry.prefix.to_string(),
                    kind: VariableKind::SingleConcept,
                    referenced_concept: Some(concept),
                    range_start: None,
                    range_end: None,
                    display_text: display,
                    pattern_description: description,
                    color: colors.background,
                    border_color: colors.border,
                    span_start: 0,
                    span_end: 0,
                }
            }
            VariableKind::Terminal => {
                let colors = hash_to_colors(name);
                ParsedVariable {
                    name: name.to_string(),
                    prefix: entry.prefix.to_string(),
                    kind: VariableKind::Terminal,
                    referenced_concept: None,
                    range_start: None,
                    range_end: None,
                    display_text: entry.display.to_string(),
                    pattern_description: description,
                    color: colors.background,
                    border_color: colors.border,
                    span_start: 0,
                    span_end: 0,
                }
            }
        }
    }

    /// Concept codes referenced by single-concept variables, with the
    /// `0000` self sentinel removed.
    pub fn forward_references(&self, formula: &str) -> BTreeSet<String> {
        self.parse(formula)
            .iter()
            .filter_map(|v| v.external_reference())
            .map(str::to_string)
            .collect()
    }

    /// `(start, end)` pairs of every range variable, in order of
    /// appearance, duplicates preserved.
    pub fn ranges(&self, formula: &str) -> Vec<(String, String)> {
        self.parse(formula)
            .into_iter()
            .filter(|v| v.kind == VariableKind::Range)
            .filter_map(|v| Some((v.range_start?, v.range_end?)))
            .collect()
    }

    fn unrecognized(name: &str) -> ParsedVariable {
        let colors = hash_to_colors(name);
        ParsedVariable {
            name: name.to_string(),
            prefix: name.to_string(),
            kind: VariableKind::Terminal,
            referenced_concept: None,
            range_start: None,
            range_end: None,
            display_text: name.to_string(),
            pattern_description: Some("unrecognized".to_string()),
            color: colors.background,
            border_color: colors.border,
            span_start: 0,
            span_end: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> VariableParser {
        VariableParser::new()
    }

    #[test]
    fn blank_formula_yields_nothing() {
        assert!(parser().parse("").is_empty());
        assert!(parser().parse("   ").is_empty());
        assert!(parser().forward_references("").is_empty());
    }

    #[test]
    fn single_concept_variable_with_display_text() {
        let variables = parser().parse("%CALC3498%");
        assert_eq!(variables.len(), 1);
        let v = &variables[0];
        assert_eq!(v.name, "CALC3498");
        assert_eq!(v.prefix, "CALC");
        assert_eq!(v.kind, VariableKind::SingleConcept);
        assert_eq!(v.referenced_concept.as_deref(), Some("3498"));
        assert_eq!(v.display_text, "Valor de 3498");
        assert_eq!(v.pattern_description.as_deref(), Some("Importe calculado en el concepto indicado"));
        assert_eq!((v.span_start, v.span_end), (0, 10));
    }

    #[test]
    fn scan_order_and_spans_cover_every_occurrence() {
        let formula = "X %CC01000500%%FOO%";
        let variables = parser().parse(formula);
        assert_eq!(variables.len(), 2);

        let cc = &variables[0];
        assert_eq!(cc.kind, VariableKind::SingleConcept);
        assert_eq!(cc.prefix, "CC");
        assert_eq!(cc.referenced_concept.as_deref(), Some("0100"));
        assert_eq!(cc.display_text, "Valor de 0100, liq. 0 de 05 meses atrás");
        assert_eq!((cc.span_start, cc.span_end), (2, 14));

        let foo = &variables[1];
        assert_eq!(foo.kind, VariableKind::Terminal);
        assert_eq!(foo.prefix, "FOO");
        assert_eq!(foo.display_text, "FOO");
        assert_eq!(foo.pattern_description.as_deref(), Some("unrecognized"));
        assert_eq!((foo.span_start, foo.span_end), (14, 19));

        // Spans are disjoint, sorted, and sum to the %…% text length.
        let total: usize = variables.iter().map(|v| v.span_end - v.span_start).sum();
        assert_eq!(total, "%CC01000500%".len() + "%FOO%".len());
        assert!(cc.span_end <= foo.span_start);
    }

    #[test]
    fn self_reference_uses_the_self_template_when_defined() {
        let info = parser().parse_token("INFO0000");
        assert_eq!(info.referenced_concept.as_deref(), Some("0000"));
        assert_eq!(info.display_text, "Informado en este concepto");

        // CALC defines no self template: normal template with 0000.
        let calc = parser().parse_token("CALC0000");
        assert_eq!(calc.referenced_concept.as_deref(), Some("0000"));
        assert_eq!(calc.display_text, "Valor de 0000");
    }

    #[test]
    fn forward_references_exclude_the_self_sentinel() {
        let refs = parser().forward_references("%CALC0000%+%CALC0100%+%INFO0200%");
        assert_eq!(
            refs.into_iter().collect::<Vec<_>>(),
            vec!["0100".to_string(), "0200".to_string()]
        );
    }

    #[test]
    fn range_variable_extraction_preserves_duplicates() {
        let formula = "%SC00500100%+%ST02000300%+%SC00500100%";
        let ranges = parser().ranges(formula);
        assert_eq!(
            ranges,
            vec![
                ("0050".to_string(), "0100".to_string()),
                ("0200".to_string(), "0300".to_string()),
                ("0050".to_string(), "0100".to_string()),
            ]
        );
    }

    #[test]
    fn range_display_substitutes_both_endpoints() {
        let v = parser().parse_token("SC00500100");
        assert_eq!(v.display_text, "Suma definitivos 0050-0100");
        assert_eq!(v.range_start.as_deref(), Some("0050"));
        assert_eq!(v.range_end.as_deref(), Some("0100"));
        assert!(v.referenced_concept.is_none());
    }

    #[test]
    fn calu_substitutes_the_liquidation_type_letter() {
        let v = parser().parse_token("CALU0350N");
        assert_eq!(v.referenced_concept.as_deref(), Some("0350"));
        assert_eq!(v.display_text, "Valor de 0350 de última liq. tipo N");
    }

    #[test]
    fn unknown_token_degrades_to_synthetic_terminal() {
        let v = parser().parse_token("FOO123");
        assert_eq!(v.kind, VariableKind::Terminal);
        assert_eq!(v.prefix, "FOO123");
        assert_eq!(v.display_text, "FOO123");
        assert_eq!(v.pattern_description.as_deref(), Some("unrecognized"));
    }

    #[test]
    fn lowercase_and_unclosed_tokens_are_not_variables() {
        assert!(parser().parse("%calc0100%").is_empty());
        assert!(parser().parse("100 %CALC0100").is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let formula = "%SC00500100%*2+%CALC0100%-%ANTIGUEDAD%";
        assert_eq!(parser().parse(formula), parser().parse(formula));
    }

    #[test]
    fn terminal_keeps_registry_display_text() {
        let v = parser().parse_token("ANTIGUEDAD");
        assert_eq!(v.display_text, "ANTIGUEDAD");
        let fam = parser().parse_token("FAMI012");
        assert_eq!(fam.prefix, "FAMI");
        assert_eq!(fam.display_text, "Salario familiar");
    }
}
