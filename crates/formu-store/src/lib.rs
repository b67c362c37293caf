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

//! Read-only store layer
//!
//! Contracts over the external relational store — the corpus view
//! `ConceptoTipoLiqFormula` and the payroll-line table `LIQUID1` — plus the
//! SQLite implementation, which owns a small set of read-only connections.
//! The system never writes; every call is a plain query scoped to one
//! connection.

pub mod corpus;
pub mod error;
pub mod memory;
pub mod payroll;
pub mod sqlite;

pub use corpus::ConceptCorpus;
pub use error::StoreError;
pub use memory::{MemoryCorpus, MemoryPayroll};
pub use payroll::{PayrollLine, PayrollStore};
pub use sqlite::SqliteStore;
