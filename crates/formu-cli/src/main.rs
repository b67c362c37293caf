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

//! FORMU CLI - entry point

use clap::Parser;
use formu_cli::cli::server::{self, ServerConfig};
use formu_cli::{Cli, Commands};
use std::process;
use tokio::runtime::Builder;

fn main() {
    human_panic::setup_panic!();

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    if let Err(err) = runtime.block_on(async_main()) {
        eprintln!("❌ {err}");
        process::exit(1);
    }
}

async fn async_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            database,
            host,
            port,
            cache_expiration_minutes,
            cors_origins,
            cors_all,
        } => {
            let config = ServerConfig {
                database,
                host,
                port,
                cache_expiration_minutes,
                cors_origins,
                cors_all,
            };
            server::start_server(config).await
        }
    }
}
