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

//! Payroll aggregation service.
//!
//! Sums the numeric payroll columns grouped by concept code for a period.
//! Liquidation types are opaque string codes; naming them is a front-end
//! concern.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local};
use formu_store::PayrollStore;
use tokio::task;
use tracing::debug;

use crate::dto::PayrollTotal;
use crate::error::ServiceError;

/// Liquidation type assumed when the caller names none.
const DEFAULT_LIQUIDATION_TYPE: &str = "0";
/// How many recent years to offer.
const YEARS_BACK: i32 = 5;

/// Read-only aggregation over payroll lines.
#[derive(Clone)]
pub struct PayrollService {
    store: Arc<dyn PayrollStore>,
}

impl PayrollService {
    /// Service over `store`.
    pub fn new(store: Arc<dyn PayrollStore>) -> Self {
        Self { store }
    }

    /// Per-concept totals for a period.
    ///
    /// Defaults: current year, current month, liquidation type `"0"`.
    /// Without an employee the amounts are summed across all employees and
    /// the line count says how many lines were aggregated; with an employee
    /// each concept maps to at most one line (the first wins).
    pub async fn totals(
        &self,
        year: Option<i32>,
        month: Option<i32>,
        liquidation_type: Option<String>,
        employee_id: Option<String>,
    ) -> Result<BTreeMap<String, PayrollTotal>, ServiceError> {
        let today = Local::now();
        let year = year.unwrap_or_else(|| today.year());
        let month = month.unwrap_or(today.month() as i32);
        let liquidation_type =
            liquidation_type.unwrap_or_else(|| DEFAULT_LIQUIDATION_TYPE.to_string());

        debug!(year, month, tipo = %liquidation_type, legajo = ?employee_id, "loading payroll totals");

        let store = self.store.clone();
        let employee_filter = employee_id.clone();
        let lines = task::spawn_blocking(move || {
            store.lines_for_period(year, month, &liquidation_type, employee_filter.as_deref())
        })
        .await??;

        let mut totals: BTreeMap<String, PayrollTotal> = BTreeMap::new();

        if employee_id.is_some() {
            for line in lines {
                totals
                    .entry(line.concept_code.clone())
                    .or_insert_with(|| PayrollTotal {
                        concept_code: line.concept_code.clone(),
                        calculated: line.calculated_amount.unwrap_or_default(),
                        reported: line.reported_amount.unwrap_or_default(),
                        employee_id: Some(line.employee_id.clone()),
                        line_count: 1,
                    });
            }
        } else {
            for line in lines {
                let entry = totals
                    .entry(line.concept_code.clone())
                    .or_insert_with(|| PayrollTotal {
                        concept_code: line.concept_code.clone(),
                        calculated: 0.0,
                        reported: 0.0,
                        employee_id: None,
                        line_count: 0,
                    });
                entry.calculated += line.calculated_amount.unwrap_or_default();
                entry.reported += line.reported_amount.unwrap_or_default();
                entry.line_count += 1;
            }
        }

        Ok(totals)
    }

    /// Distinct liquidation-type codes present in the payroll table.
    pub async fn liquidation_types(&self) -> Result<Vec<String>, ServiceError> {
        let store = self.store.clone();
        Ok(task::spawn_blocking(move || store.liquidation_types()).await??)
    }

    /// Distinct employee ids with lines in the period; defaults to the
    /// current year and month.
    pub async fn employees(
        &self,
        year: Option<i32>,
        month: Option<i32>,
    ) -> Result<Vec<String>, ServiceError> {
        let today = Local::now();
        let year = year.unwrap_or_else(|| today.year());
        let month = month.unwrap_or(today.month() as i32);

        let store = self.store.clone();
        Ok(task::spawn_blocking(move || store.employees_for_period(year, month)).await??)
    }

    /// Recent years to offer in period pickers, newest first.
    pub fn years(&self) -> Vec<i32> {
        let current = Local::now().year();
        (0..YEARS_BACK).map(|back| current - back).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formu_store::{MemoryPayroll, PayrollLine};

    fn line(concept: &str, employee: &str, calculated: f64, reported: f64) -> PayrollLine {
        PayrollLine {
            year: 2025,
            month: 6,
            liquidation_type: "0".to_string(),
            employee_id: employee.to_string(),
            concept_code: concept.to_string(),
            calculated_amount: Some(calculated),
            reported_amount: Some(reported),
        }
    }

    fn service() -> PayrollService {
        PayrollService::new(Arc::new(MemoryPayroll::new(vec![
            line("0100", "L1", 100.0, 1.0),
            line("0100", "L2", 250.0, 2.0),
            line("0200", "L1", 40.0, 0.0),
            PayrollLine {
                liquidation_type: "2".to_string(),
                ..line("0100", "L3", 999.0, 9.0)
            },
        ])))
    }

    #[tokio::test]
    async fn totals_sum_across_employees() {
        let totals = service()
            .totals(Some(2025), Some(6), Some("0".to_string()), None)
            .await
            .expect("query");

        let first = totals.get("0100").expect("0100 aggregated");
        assert_eq!(first.calculated, 350.0);
        assert_eq!(first.reported, 3.0);
        assert_eq!(first.line_count, 2);
        assert!(first.employee_id.is_none());

        assert_eq!(totals.get("0200").expect("0200 aggregated").line_count, 1);
        // The type-"2" line stays out of a type-"0" aggregation.
        assert_eq!(totals.len(), 2);
    }

    #[tokio::test]
    async fn totals_for_one_employee_take_one_line_per_concept() {
        let totals = service()
            .totals(Some(2025), Some(6), Some("0".to_string()), Some("L1".to_string()))
            .await
            .expect("query");

        let first = totals.get("0100").expect("0100 present");
        assert_eq!(first.calculated, 100.0);
        assert_eq!(first.line_count, 1);
        assert_eq!(first.employee_id.as_deref(), Some("L1"));
    }

    #[tokio::test]
    async fn liquidation_types_are_distinct_codes() {
        let types = service().liquidation_types().await.expect("query");
        assert_eq!(types, vec!["0", "2"]);
    }

    #[tokio::test]
    async fn employees_for_period_are_distinct() {
        let employees = service().employees(Some(2025), Some(6)).await.expect("query");
        assert_eq!(employees, vec!["L1", "L2", "L3"]);
    }

    #[test]
    fn years_lists_the_last_five_newest_first() {
        let years = service().years();
        assert_eq!(years.len(), 5);
        assert!(years.windows(2).all(|w| w[0] == w[1] + 1));
    }
}
