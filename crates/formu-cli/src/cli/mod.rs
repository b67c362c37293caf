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

//! Command-line argument definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod server;

/// Payroll-formula dependency explorer.
#[derive(Debug, Parser)]
#[command(name = "formu", version, about = "Explore payroll-formula concept dependencies")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// SQLite database holding the corpus view and the payroll table.
        #[arg(long, env = "FORMU_DATABASE")]
        database: PathBuf,

        /// Address to bind.
        #[arg(long, default_value = "127.0.0.1")]
        host: IpAddr,

        /// Port to bind.
        #[arg(long, default_value_t = 8080)]
        port: u16,

        /// Minutes between scheduled dependency-index rebuilds.
        #[arg(
            long = "cache-expiration-minutes",
            env = "FORMU_CACHE_EXPIRATION_MINUTES",
            default_value_t = 60
        )]
        cache_expiration_minutes: u64,

        /// Allowed CORS origin; repeat or comma-separate for several.
        #[arg(
            long = "cors-origin",
            env = "FORMU_CORS_ORIGINS",
            value_delimiter = ',',
            default_value = "http://localhost:5173"
        )]
        cors_origins: Vec<String>,

        /// Allow any origin (development mode).
        #[arg(long)]
        cors_all: bool,
    },
}
