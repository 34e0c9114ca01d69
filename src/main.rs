// Copyright 2024 RustFS Team
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

use clap::{Args, Parser, Subcommand};
use operator::context::{Config, DEFAULT_MANAGER};
use operator::{crd, run};
use shadow_rs::shadow;
use std::time::Duration;

shadow!(build);

#[derive(Parser)]
#[command(name = "app-op")]
#[command(version = build::CLAP_LONG_VERSION)]
#[command(about = "Application Kubernetes Operator CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Output CRDs in YAML
    Crd {
        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Run the controller
    Server(ServerArgs),
}

#[derive(Args)]
struct ServerArgs {
    /// Only watch applications in this namespace
    #[arg(long, env = "APP_OPERATOR_NAMESPACE")]
    namespace: Option<String>,

    /// Seconds between two reconciles of an unchanged application
    #[arg(long, env = "APP_OPERATOR_RESYNC_SECONDS", default_value_t = 300)]
    resync_seconds: u64,

    /// Seconds before a failed reconcile is retried
    #[arg(long, env = "APP_OPERATOR_RETRY_SECONDS", default_value_t = 5)]
    retry_seconds: u64,

    /// Controller name reported on events
    #[arg(long, env = "APP_OPERATOR_MANAGER", default_value = DEFAULT_MANAGER)]
    manager: String,
}

impl From<ServerArgs> for Config {
    fn from(args: ServerArgs) -> Self {
        Config {
            namespace: args.namespace,
            resync_interval: Duration::from_secs(args.resync_seconds),
            retry_interval: Duration::from_secs(args.retry_seconds),
            manager: args.manager,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crd { file } => crd(file).await?,
        Commands::Server(args) => run(args.into()).await?,
    }

    Ok(())
}
