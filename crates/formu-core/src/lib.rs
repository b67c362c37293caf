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

//! Core domain types for the FORMU payroll-formula dependency explorer
//!
//! This crate holds the plain data model shared by the parser, the index and
//! the services: payroll concepts as read from the corpus view, parsed
//! formula variables, and the deterministic color derivation used by the
//! visualization front-end.

pub mod color;
pub mod concept;
pub mod variable;

pub use color::{ColorPair, hash_to_color, hash_to_colors};
pub use concept::{Classification, Concept};
pub use variable::{ParsedVariable, SELF_REFERENCE, VariableKind};
