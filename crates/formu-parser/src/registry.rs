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

//! Declarative registry of variable patterns.
//!
//! Three ordered buckets — RANGE, SINGLE_CONCEPT, TERMINAL — tried in that
//! order; within a bucket the first match wins. Every matcher is anchored,
//! so a pattern matches the whole token or not at all. The registry is
//! built once and shared process-wide.
//!
//! Extending the grammar means adding an entry to the matching bucket here.
//! New TERMINAL patterns must stay disjoint from the SINGLE_CONCEPT
//! regexes; conflicts resolve in favor of the earlier bucket.

use std::collections::HashMap;

use formu_core::VariableKind;
use once_cell::sync::Lazy;
use regex::Regex;

/// One registered pattern: prefix, anchored matcher, display template and
/// optional "self" alternate used when the captured concept is `0000`.
pub struct PatternEntry {
    /// Short prefix identifying the pattern (e.g. `CALC`, `SC`).
    pub prefix: &'static str,
    /// Kind assigned to tokens this entry matches.
    pub kind: VariableKind,
    /// Display template with placeholders from `{nnnn}`, `{xxxx}`, `{mm}`,
    /// `{l}`.
    pub display: &'static str,
    /// Template used verbatim when the first captured concept is `0000`.
    pub self_display: Option<&'static str>,
    matcher: Regex,
}

impl PatternEntry {
    fn new(
        prefix: &'static str,
        kind: VariableKind,
        pattern: &str,
        display: &'static str,
        self_display: Option<&'static str>,
    ) -> Self {
        let matcher = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid builtin pattern {pattern:?}: {e}"));
        Self {
            prefix,
            kind,
            display,
            self_display,
            matcher,
        }
    }
}

/// Successful classification of a token.
pub struct TokenMatch<'r> {
    /// The entry that matched.
    pub entry: &'r PatternEntry,
    /// Captured groups 1.., in order. Empty for terminal patterns.
    pub groups: Vec<String>,
}

/// Immutable pattern table, built once at first use.
pub struct PatternRegistry {
    range: Vec<PatternEntry>,
    single: Vec<PatternEntry>,
    terminal: Vec<PatternEntry>,
    descriptions: HashMap<&'static str, &'static str>,
}

static REGISTRY: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::build);

/// Terminal variables known by literal name.
const TERMINAL_TOKENS: &[&str] = &[
    "AFILIADO", "ANTIGUEDAD", "ANTIGUEMES", "ANIOSCAT", "ANOLIQ",
    "ANTIBAE", "ANTICIPO", "ART", "BASICOANTI", "CANTADHE",
    "CATEGORIA", "CONCEPTO", "CONCEPTO2", "CONDCONTRA", "CONVENIO",
    "CTOCTO", "DIASGUAR", "DIASHABI", "DIASTRAB", "DIATRAMES",
    "DIATRAMESE", "EDAD", "FERIANT", "FERITRAB", "FRENTE",
    "GASTOSEDUC", "GENNETACU", "GRUPO", "GRUTRAB", "GUARDERIA",
    "INASISTEN", "MESANTIG", "MESCOBBAE", "MESLIQ", "MESNACIM",
    "MODCONT", "OBRASOC", "PERTOPE", "PRESTAMO", "PROMEDIO",
    "QUINCENA", "RDEDUC1", "RG5800", "RGCAFACO", "RGCAFACOFI",
    "RGCAFAHI", "RGCAFAHIFI", "RGCAFAOT", "RGCAFAOTFI", "RGDEDINA",
    "RGDEDIND", "RGGANOIM", "RGPRIMSE", "RGSEGSEP", "SACDIA",
    "SEXO", "TARDANZA", "TIPOEMP", "TIPOLIQ", "TOTEMBAR",
    "VACANOLIQ", "VACDIADCT", "VACDIADIG", "VACDIADL1", "VACDIADL2",
    "VACDIADLI", "VACDIALIQ", "VACDIAVAC", "VACMESLIQ",
    "F572DRE", "F572FACO", "F572FADI", "F572FAHI", "F572FAOT",
    "F572HOE", "F572HOR", "F572OGC", "F572ORE", "F572OSE",
    "F572OSI", "F572OSS", "F572SAC", "PBAEANTIGA", "PBAEANTIGC",
];

impl PatternRegistry {
    /// Process-wide registry instance.
    pub fn global() -> &'static PatternRegistry {
        &REGISTRY
    }

    /// Classify a token. Buckets are tried RANGE, then SINGLE_CONCEPT, then
    /// TERMINAL; the first hit wins.
    pub fn find(&self, token: &str) -> Option<TokenMatch<'_>> {
        for bucket in [&self.range, &self.single, &self.terminal] {
            for entry in bucket {
                if let Some(caps) = entry.matcher.captures(token) {
                    let groups = caps
                        .iter()
                        .skip(1)
                        .flatten()
                        .map(|m| m.as_str().to_string())
                        .collect();
                    return Some(TokenMatch { entry, groups });
                }
            }
        }
        None
    }

    /// Free-text description for a prefix, when the dictionary has one.
    pub fn description(&self, prefix: &str) -> Option<&'static str> {
        self.descriptions.get(prefix).copied()
    }

    fn build() -> Self {
        use VariableKind::{Range, SingleConcept, Terminal};

        let range_entry = |prefix, pattern: &str, display| {
            PatternEntry::new(prefix, Range, pattern, display, None)
        };
        let single = |prefix, pattern: &str, display| {
            PatternEntry::new(prefix, SingleConcept, pattern, display, None)
        };
        let single_self = |prefix, pattern: &str, display, self_display| {
            PatternEntry::new(prefix, SingleConcept, pattern, display, Some(self_display))
        };
        let terminal = |prefix, pattern: &str, display| {
            PatternEntry::new(prefix, Terminal, pattern, display, None)
        };

        let range = vec![
            range_entry("SC", r"^SC(\d{4})(\d{4})$", "Suma definitivos {nnnn}-{xxxx}"),
            range_entry("ST", r"^ST(\d{4})(\d{4})$", "Suma transitorios {nnnn}-{xxxx}"),
            range_entry("SI", r"^SI(\d{4})(\d{4})$", "Suma informados {nnnn}-{xxxx}"),
            range_entry("S", r"^S(\d{4})(\d{4})[A-Z]$", "Suma última liq. {nnnn}-{xxxx}"),
            range_entry("E", r"^E(\d{4})(\d{4})\d$", "Especialización {nnnn}-{xxxx}"),
            range_entry("MM", r"^MM(\d{4})(\d{4})$", "Menor valor {nnnn} y {xxxx}"),
        ];

        let single_bucket = vec![
            single("CALC", r"^CALC(\d{4})$", "Valor de {nnnn}"),
            single_self(
                "INFO",
                r"^INFO(\d{4})$",
                "Informado en {nnnn}",
                "Informado en este concepto",
            ),
            single("REDO", r"^REDO(\d{4})$", "Redondeo de {nnnn}"),
            single_self(
                "VAL1",
                r"^VAL1(\d{4})$",
                "Valor 1 de {nnnn}",
                "Valor 1 de este concepto",
            ),
            single_self(
                "VAL2",
                r"^VAL2(\d{4})$",
                "Valor 2 de {nnnn}",
                "Valor 2 de este concepto",
            ),
            single_self(
                "VAL3",
                r"^VAL3(\d{4})$",
                "Valor 3 de {nnnn}",
                "Valor 3 de este concepto",
            ),
            single_self(
                "FVA1",
                r"^FVA1(\d{4})$",
                "Valor fijo 1 del legajo, del concepto {nnnn}",
                "Valor fijo 1 del legajo, de este concepto",
            ),
            single_self(
                "FVA2",
                r"^FVA2(\d{4})$",
                "Valor fijo 2 del legajo, del concepto {nnnn}",
                "Valor fijo 2 del legajo, de este concepto",
            ),
            single_self(
                "FVA3",
                r"^FVA3(\d{4})$",
                "Valor fijo 3 del legajo, del concepto {nnnn}",
                "Valor fijo 3 del legajo, de este concepto",
            ),
            single_self(
                "BASI",
                r"^BASI(\d{4})$",
                "Básico de comp. salarial {nnnn}",
                "Básico de su comp. salarial",
            ),
            single_self(
                "ADIC",
                r"^ADIC(\d{4})$",
                "Adicional de comp. salarial {nnnn}",
                "Adicional de su comp. salarial",
            ),
            single("COMS", r"^COMS(\d{4})$", "Comp. salarial {nnnn}"),
            single("PCON", r"^PCON(\d{4})$", "Concepto {nnnn} de comp. salarial"),
            single("PCOM", r"^PCOM(\d{4})$", "Concepto actual en comp. {nnnn}"),
            single("CGAN", r"^CGAN(\d{4})$", "Calc. Ganancias de {nnnn}"),
            single("PROVAC", r"^PROVAC(\d{4})$", "Provisión vacaciones de {nnnn}"),
            // nnnn plus extra parameters, still a single-concept reference
            single(
                "CALU",
                r"^CALU(\d{4})([A-Z0-9])$",
                "Valor de {nnnn} de última liq. tipo {l}",
            ),
            single(
                "CALX",
                r"^CALX(\d{4})([A-Z0-9])$",
                "Valor de {nnnn} de última liq. tipo {l}",
            ),
            single("CSEM", r"^CSEM(\d{4})\d[A-Z]$", "Semestre de {nnnn}"),
            single("CSEP", r"^CSEP(\d{4})\d[A-Z]$", "Semestre prev. de {nnnn}"),
            single("MSEM", r"^MSEM(\d{4})\d[A-Z]$", "Mayor en semestre de {nnnn}"),
            single(
                "CC",
                r"^CC(\d{4})([A-Z0-9]{2})(\d)(\d)$",
                "Valor de {nnnn}, liq. {l} de {mm} meses atrás",
            ),
            single(
                "CI",
                r"^CI(\d{4})([A-Z0-9]{2})(\d)(\d)$",
                "Inf. de {nnnn}, liq. {l} de {mm} meses atrás",
            ),
            single("AC", r"^AC(\d{4})\d{2}\d[A-Z]$", "Acum. calc. de {nnnn}"),
            single("AI", r"^AI(\d{4})\d{2}\d[A-Z]$", "Acum. inf. de {nnnn}"),
            // Historical liquidation values: Pnnnnaammq
            single("0", r"^0(\d{4})\d{5}$", "Sueldo hist. de {nnnn}"),
            single("L", r"^L(\d{4})\d{5}$", "Liq. normal hist. de {nnnn}"),
            single("A", r"^A(\d{4})\d{5}$", "Aguinaldo hist. de {nnnn}"),
            single("B", r"^B(\d{4})\d{5}$", "BAE hist. de {nnnn}"),
        ];

        let mut terminal_bucket: Vec<PatternEntry> = TERMINAL_TOKENS
            .iter()
            .copied()
            .map(|token| terminal(token, &format!("^{token}$"), token))
            .collect();

        // Parameterised terminals: carry digits but reference no concept.
        terminal_bucket.extend([
            terminal("ANOTRA", r"^ANOTRA\d{3}$", "Años trabajados"),
            terminal("ATENC", r"^ATENC\d{4}$", "Atención"),
            terminal("DIATRAANO", r"^DIATRAANO\d$", "Días trab. año"),
            terminal("DIATRASEI", r"^DIATRASEI\d$", "Días trab. semestre"),
            terminal("DIATRASEM", r"^DIATRASEM\d$", "Días trab. semestre"),
            terminal("DIAINASEM", r"^DIAINASEM\d$", "Días inas. semestre"),
            terminal("EMBARGO", r"^EMBARGO\d$", "Embargo"),
            terminal("ESPEC", r"^ESPEC\d$", "Especialización"),
            terminal("FAMI", r"^FAMI\d{3}$", "Salario familiar"),
            terminal("FERI", r"^FERI\d$", "Feriados"),
            terminal("F572DED", r"^F572DED\d{2}$", "Deducción F572"),
            terminal("F572MOT", r"^F572MOT\d$", "Motivo F572"),
            terminal("GCIA", r"^GCIA\d{4}$", "Ganancias"),
            terminal("GANP", r"^GANP\d{4}[A-Z]\d$", "Promedio ganancias"),
            terminal("MESF", r"^MESF\d{4}$", "Mes fijos"),
            terminal("MESTRA", r"^MESTRA\d{2}$", "Meses trabajados"),
            terminal("MOT", r"^MOT\d{6}$", "Motivo ausencia"),
            terminal("TMO", r"^TMO\d{6}$", "Tipo motivo"),
            terminal("PARLIQ", r"^PARLIQ\d{3}$", "Parámetro liq."),
            terminal("PBAEACUM", r"^PBAEACUM\d$", "% BAE acum."),
            terminal("P572DED", r"^P572DED\d{2}$", "Deducción P572"),
            terminal("RCALIG", r"^RCALIG\d{4}$", "Recálculo gan."),
            terminal("CCTO", r"^CCTO\d{4}$", "Centro costo"),
            terminal("PCONX", r"^PCONX\d{4}\d$", "Concepto comp. +"),
            // Historical totals
            terminal("TAP", r"^TAP\d{6}$", "Total aportes"),
            terminal("TCR", r"^TCR\d{6}$", "Total rem. c/aportes"),
            terminal("TDE", r"^TDE\d{6}$", "Total descuentos"),
            terminal("TRE", r"^TRE\d{6}$", "Total retenciones"),
            terminal("TSF", r"^TSF\d{6}$", "Total sal. familiar"),
            terminal("TSR", r"^TSR\d{6}$", "Total rem. s/aportes"),
            terminal("TTAP", r"^TTAP\d{4}$", "Total aportes patr."),
            terminal("TTCR", r"^TTCR\d{4}$", "Total rem. c/desc."),
            terminal("TTDE", r"^TTDE\d{4}$", "Total deducciones"),
            terminal("TTRE", r"^TTRE\d{4}$", "Total retenciones"),
            terminal("TTSF", r"^TTSF\d{4}$", "Total sal. fam."),
            terminal("TTSR", r"^TTSR\d{4}$", "Total rem. s/desc."),
            // Range-of-totals
            terminal("ZAP", r"^ZAP\d{8}$", "Rango aportes"),
            terminal("ZCR", r"^ZCR\d{8}$", "Rango rem. c/ret."),
            terminal("ZDE", r"^ZDE\d{8}$", "Rango deducciones"),
            terminal("ZRE", r"^ZRE\d{8}$", "Rango retenciones"),
            terminal("ZSF", r"^ZSF\d{8}$", "Rango sal. fam."),
            terminal("ZSR", r"^ZSR\d{8}$", "Rango rem. s/ret."),
            // Highest salary
            terminal("SUEMAANO", r"^SUEMAANO\d[A-Z]$", "Mayor sueldo año"),
            terminal("SUEMASEI", r"^SUEMASEI\d[A-Z]$", "Mayor sueldo 6 meses"),
            terminal("SUEMASEM", r"^SUEMASEM\d[A-Z]$", "Mayor sueldo sem."),
        ]);

        let descriptions = HashMap::from([
            ("CALC", "Importe calculado en el concepto indicado"),
            ("INFO", "Valor informado en el parte de novedades"),
            ("SC", "Sumatoria de conceptos definitivos del rango"),
            ("ST", "Sumatoria de conceptos transitorios del rango"),
            ("SI", "Sumatoria de valores informados del rango"),
        ]);

        Self {
            range,
            single: single_bucket,
            terminal: terminal_bucket,
            descriptions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formu_core::VariableKind;

    #[test]
    fn range_bucket_wins_over_terminal() {
        let registry = PatternRegistry::global();
        let found = registry.find("SC00500100").expect("matches");
        assert_eq!(found.entry.kind, VariableKind::Range);
        assert_eq!(found.entry.prefix, "SC");
        assert_eq!(found.groups, vec!["0050", "0100"]);
    }

    #[test]
    fn single_concept_captures_code() {
        let registry = PatternRegistry::global();
        let found = registry.find("CALC3498").expect("matches");
        assert_eq!(found.entry.kind, VariableKind::SingleConcept);
        assert_eq!(found.groups, vec!["3498"]);
    }

    #[test]
    fn terminal_literals_match_exactly() {
        let registry = PatternRegistry::global();
        let found = registry.find("ANTIGUEDAD").expect("matches");
        assert_eq!(found.entry.kind, VariableKind::Terminal);
        assert!(found.groups.is_empty());
        assert!(registry.find("ANTIGUEDADX").is_none());
    }

    #[test]
    fn parameterised_terminals_match() {
        let registry = PatternRegistry::global();
        for (token, prefix) in [
            ("ANOTRA123", "ANOTRA"),
            ("FAMI001", "FAMI"),
            ("GCIA2024", "GCIA"),
            ("ZAP12345678", "ZAP"),
            ("SUEMAANO1N", "SUEMAANO"),
        ] {
            let found = registry.find(token).unwrap_or_else(|| panic!("{token} matches"));
            assert_eq!(found.entry.prefix, prefix);
            assert_eq!(found.entry.kind, VariableKind::Terminal);
        }
    }

    #[test]
    fn anchored_matchers_reject_substrings() {
        let registry = PatternRegistry::global();
        assert!(registry.find("CALC349").is_none());
        assert!(registry.find("CALC34980").is_none());
        assert!(registry.find("XCALC3498").is_none());
    }

    #[test]
    fn cc_captures_months_and_liquidation_type() {
        let registry = PatternRegistry::global();
        let found = registry.find("CC01000500").expect("matches");
        assert_eq!(found.entry.prefix, "CC");
        assert_eq!(found.groups, vec!["0100", "05", "0", "0"]);
    }

    #[test]
    fn descriptions_cover_the_documented_prefixes() {
        let registry = PatternRegistry::global();
        assert!(registry.description("CALC").is_some());
        assert!(registry.description("SC").is_some());
        assert!(registry.description("REDO").is_none());
    }
}
