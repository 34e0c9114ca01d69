// Copyright 2025 RustFS Team
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

use crate::context::{Config, Context};
use crate::error_policy::error_policy;
use crate::reconcile::reconcile_application;
use crate::types::v1beta1::application::Application;
use futures::StreamExt;
use kube::CustomResourceExt;
use kube::runtime::{Controller, watcher};
use kube::{Api, Client};
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod context;
mod error_policy;
pub mod reconcile;
pub mod types;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests;

/// Installs the global subscriber. Fails instead of panicking when one is already set.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .try_init()
        .map_err(|e| e.to_string())?;

    Ok(())
}

pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let client = Client::try_default().await?;
    let applications = match &config.namespace {
        Some(ns) => Api::<Application>::namespaced(client.clone(), ns),
        None => Api::<Application>::all(client.clone()),
    };

    info!(
        "watching applications in {}",
        config.namespace.as_deref().unwrap_or("all namespaces")
    );

    let context = Context::new(client, config);
    Controller::new(applications, watcher::Config::default())
        .run(reconcile_application, error_policy, Arc::new(context))
        .for_each(|res| async move {
            match res {
                Ok((app, _)) => info!("reconciled successful, object {}", app.name),
                Err(e) => warn!("reconcile failed: {}", e),
            }
        })
        .await;

    Ok(())
}

pub async fn crd(file: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer: Pin<Box<dyn AsyncWrite + Send>> = if let Some(file) = file {
        Box::pin(
            tokio::fs::OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(file)
                .await?,
        )
    } else {
        Box::pin(tokio::io::stdout())
    };

    writer
        .write_all(serde_yaml_ng::to_string(&Application::crd())?.as_bytes())
        .await?;
    writer.flush().await?;

    Ok(())
}
