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

//! SQLite-backed implementation of the store contracts.
//!
//! The upstream view and table names are kept verbatim. The corpus queries
//! group by `(CodConcepto, CodFormula)` and aggregate the liquidation types
//! with a `-` separator, mirroring the view's upstream consumers.
//!
//! The store owns a small fixed set of read-only connections and hands each
//! query the next one in turn: every contract method is one short point or
//! range read, issued concurrently by request handlers and the index
//! rebuild, and rotating over the handles keeps those reads from
//! serializing behind a single lock.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use formu_core::{Classification, Concept};
use rusqlite::{Connection, OpenFlags, Row, params};
use tracing::debug;

use crate::corpus::ConceptCorpus;
use crate::error::StoreError;
use crate::payroll::{PayrollLine, PayrollStore};

const DEFAULT_READ_CONNECTIONS: usize = 4;
const MAX_READ_CONNECTIONS: usize = 8;

const CONCEPT_COLUMNS: &str = "
    CodConcepto,
    CodFormula,
    MIN(DescripcionConcepto) AS DescripcionConcepto,
    MIN(DescripcionFormula) AS DescripcionFormula,
    MIN(CondicionFormula) AS CondicionFormula,
    MIN(TransitorioDefinitivo) AS TransitorioDefinitivo,
    group_concat(TipoLiquidacion, '-') AS TipoLiquidacion,
    MIN(TipoConcepto) AS TipoConcepto,
    MIN(Orden) AS Orden,
    MIN(FormulaCompleta) AS FormulaCompleta";

/// Read-only store over a SQLite database holding the corpus view and the
/// payroll table.
pub struct SqliteStore {
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl SqliteStore {
    /// Open the database at `path` with the default number of read
    /// connections.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::open_with_pool_size(path, DEFAULT_READ_CONNECTIONS)
    }

    /// Open the database at `path` with `pool_size` read connections
    /// (clamped to `1..=8`).
    ///
    /// Every handle is opened `SQLITE_OPEN_READ_ONLY`, so the driver itself
    /// rejects any write statement on it; with writes impossible at the
    /// open level, no read-tuning pragmas are layered on top — the handles
    /// stay at SQLite defaults.
    pub fn open_with_pool_size(path: &Path, pool_size: usize) -> Result<Self, StoreError> {
        let size = pool_size.clamp(1, MAX_READ_CONNECTIONS);
        let mut connections = Vec::with_capacity(size);
        for _ in 0..size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            connections.push(Mutex::new(conn));
        }
        debug!(path = %path.display(), connections = size, "opened read-only concept store");
        Ok(Self {
            connections,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Number of read connections held open, for startup logging and
    /// diagnostics.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Run one query against the next connection in turn.
    fn read<F, T>(&self, query: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.connections.len();
        let conn = self.connections[idx]
            .lock()
            .map_err(|_| StoreError::PoolPoisoned)?;
        query(&conn)
    }
}

fn map_concept(row: &Row<'_>) -> Result<Concept, rusqlite::Error> {
    let letter: Option<String> = row.get("TransitorioDefinitivo")?;
    Ok(Concept {
        code: row.get("CodConcepto")?,
        formula_code: row.get("CodFormula")?,
        description: row.get("DescripcionConcepto")?,
        formula_description: row.get("DescripcionFormula")?,
        formula: row.get("FormulaCompleta")?,
        condition: row.get("CondicionFormula")?,
        classification: Classification::from_letter(letter.as_deref()),
        liquidation_types: row.get("TipoLiquidacion")?,
        type_code: row.get("TipoConcepto")?,
        ordering: row.get("Orden")?,
        v1: None,
        v2: None,
        v3: None,
    })
}

fn map_payroll_line(row: &Row<'_>) -> Result<PayrollLine, rusqlite::Error> {
    Ok(PayrollLine {
        year: row.get("LiqAno")?,
        month: row.get("LiqMes")?,
        liquidation_type: row.get("LiqTpoLiq")?,
        employee_id: row.get("LiqLeg")?,
        concept_code: row.get("Liq1Cnc")?,
        calculated_amount: row.get("Liq1Cal")?,
        reported_amount: row.get("Liq1Inf")?,
    })
}

fn collect_concepts(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::ToSql],
) -> Result<Vec<Concept>, StoreError> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(params, map_concept)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl ConceptCorpus for SqliteStore {
    fn all(&self) -> Result<Vec<Concept>, StoreError> {
        let sql = format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM ConceptoTipoLiqFormula
             GROUP BY CodConcepto, CodFormula
             ORDER BY CodConcepto"
        );
        self.read(|conn| collect_concepts(conn, &sql, &[]))
    }

    fn by_code(&self, code: &str) -> Result<Option<Concept>, StoreError> {
        let sql = format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM ConceptoTipoLiqFormula
             WHERE CodConcepto = ?1
             GROUP BY CodConcepto, CodFormula"
        );
        self.read(|conn| {
            let concepts = collect_concepts(conn, &sql, &[&code])?;
            Ok(concepts.into_iter().next())
        })
    }

    fn code_range(&self, lo: &str, hi: &str) -> Result<Vec<Concept>, StoreError> {
        let sql = format!(
            "SELECT {CONCEPT_COLUMNS}
             FROM ConceptoTipoLiqFormula
             WHERE CodConcepto BETWEEN ?1 AND ?2
             GROUP BY CodConcepto, CodFormula
             ORDER BY CodConcepto"
        );
        self.read(|conn| collect_concepts(conn, &sql, &[&lo, &hi]))
    }
}

impl PayrollStore for SqliteStore {
    fn lines_for_period(
        &self,
        year: i32,
        month: i32,
        liquidation_type: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<PayrollLine>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT LiqAno, LiqMes, LiqTpoLiq, LiqLeg, Liq1Cnc, Liq1Cal, Liq1Inf
                 FROM LIQUID1
                 WHERE LiqAno = ?1
                   AND LiqMes = ?2
                   AND LiqTpoLiq = ?3
                   AND (?4 IS NULL OR LiqLeg = ?4)
                 ORDER BY Liq1Cnc",
            )?;
            let rows = stmt.query_map(
                params![year, month, liquidation_type, employee_id],
                map_payroll_line,
            )?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn liquidation_types(&self) -> Result<Vec<String>, StoreError> {
        self.read(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT DISTINCT LiqTpoLiq FROM LIQUID1 ORDER BY LiqTpoLiq")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn employees_for_period(&self, year: i32, month: i32) -> Result<Vec<String>, StoreError> {
        self.read(|conn| {
            let mut stmt = conn.prepare_cached(
                "SELECT DISTINCT LiqLeg
                 FROM LIQUID1
                 WHERE LiqAno = ?1 AND LiqMes = ?2
                 ORDER BY LiqLeg",
            )?;
            let rows = stmt.query_map(params![year, month], |row| row.get(0))?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }
}
