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

//! Service-level errors.

use formu_store::StoreError;
use thiserror::Error;

/// Failures surfaced by the services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The backing store failed; the request fails, no state is touched.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blocking store task was cancelled or panicked.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
