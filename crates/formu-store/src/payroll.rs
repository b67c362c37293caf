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

//! Payroll-line contract over the `LIQUID1` table.

use crate::error::StoreError;

/// One payroll line. Composite key: year, month, liquidation type,
/// employee, concept. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollLine {
    /// Liquidation year (`LiqAno`).
    pub year: i32,
    /// Liquidation month (`LiqMes`).
    pub month: i32,
    /// Liquidation type code (`LiqTpoLiq`). String-keyed, matching the
    /// column type; integer aliases are external.
    pub liquidation_type: String,
    /// Employee file number (`LiqLeg`).
    pub employee_id: String,
    /// Concept code (`Liq1Cnc`).
    pub concept_code: String,
    /// Calculated amount (`Liq1Cal`).
    pub calculated_amount: Option<f64>,
    /// Reported amount (`Liq1Inf`).
    pub reported_amount: Option<f64>,
}

/// Read-only access to payroll lines.
pub trait PayrollStore: Send + Sync {
    /// Lines for a period, optionally restricted to one employee, ordered
    /// by concept code.
    fn lines_for_period(
        &self,
        year: i32,
        month: i32,
        liquidation_type: &str,
        employee_id: Option<&str>,
    ) -> Result<Vec<PayrollLine>, StoreError>;

    /// Distinct liquidation-type codes present in the table.
    fn liquidation_types(&self) -> Result<Vec<String>, StoreError>;

    /// Distinct employee ids with lines in the period.
    fn employees_for_period(&self, year: i32, month: i32) -> Result<Vec<String>, StoreError>;
}
