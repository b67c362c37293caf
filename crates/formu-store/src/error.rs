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

//! Store-level errors.

use thiserror::Error;

/// Failures surfaced by the store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or connection failure reported by the database.
    #[error("database error: {message}")]
    Database {
        /// Driver-reported failure text.
        message: String,
    },

    /// A pooled connection lock was poisoned by a panicking holder.
    #[error("connection pool lock poisoned")]
    PoolPoisoned,
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database {
            message: e.to_string(),
        }
    }
}
