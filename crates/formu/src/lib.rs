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

//! FORMU — payroll-formula dependency explorer
//!
//! Facade over the workspace crates: the concept service composing the
//! variable parser, the reverse-dependency index and the corpus, plus the
//! payroll aggregation service. The HTTP surface in `formu-cli` is a thin
//! layer over these services.

// Workspace crates
pub use formu_core as core;
pub use formu_index as index;
pub use formu_parser as parser;
pub use formu_store as store;

pub mod dto;
pub mod error;
pub mod payroll;
pub mod service;

pub use dto::{ConceptDetail, ConceptSummary, PayrollTotal, RangeItem, RangeListing};
pub use error::ServiceError;
pub use formu_core::{Classification, ColorPair, Concept, ParsedVariable, VariableKind};
pub use formu_index::{DependencyIndex, IndexStats};
pub use formu_parser::{PatternRegistry, VariableParser};
pub use formu_store::{ConceptCorpus, PayrollStore, SqliteStore, StoreError};
pub use payroll::PayrollService;
pub use service::ConceptService;
