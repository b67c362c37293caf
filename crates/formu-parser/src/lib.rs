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

//! Formula-variable grammar and parser
//!
//! Payroll formulas embed variables as `%TOKEN%` occurrences. This crate
//! classifies every token against a declarative pattern registry and emits
//! structured descriptors with display text and source spans. The parser
//! never fails: unknown tokens degrade to synthetic terminals.

pub mod parser;
pub mod registry;

pub use parser::VariableParser;
pub use registry::{PatternEntry, PatternRegistry, TokenMatch};
