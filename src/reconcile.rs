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

pub mod aggregate;
pub mod discover;
pub mod ownership;
pub mod readiness;

use crate::catalog::{self, Catalog, ObjectKey};
use crate::context::Context;
use crate::types;
use crate::types::v1beta1::application::Application;
use crate::types::v1beta1::status::ApplicationStatus;
use crate::types::v1beta1::status::condition;
use crate::types::v1beta1::status::object::ObjectStatus;
use chrono::{DateTime, Utc};
use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use readiness::EvaluateReadiness;
use snafu::Snafu;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};

pub const COMPONENTS_READY: &str = "ComponentsReady";
pub const COMPONENTS_NOT_READY: &str = "ComponentsNotReady";

const COMPONENTS_READY_MESSAGE: &str = "all components ready";
const COMPONENTS_NOT_READY_MESSAGE: &str = "some components not ready";

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(transparent)]
    Catalog { source: catalog::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// How a successful pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The application no longer exists
    NotFound,

    /// The application is being deleted, nothing was done
    Deleting,

    /// The computed status equals the stored one, nothing was written
    Unchanged,

    /// A new status was written
    Updated {
        ready: bool,

        /// The `Ready` condition flipped, or was set for the first time
        readiness_changed: bool,
    },
}

/// One reconcile pass over a single Application.
///
/// Holds no state between passes, everything is read again from the catalog.
pub struct Reconciler<'a, C, E: ?Sized> {
    catalog: &'a C,
    evaluator: &'a E,
}

impl<'a, C, E> Reconciler<'a, C, E>
where
    C: Catalog,
    E: EvaluateReadiness + ?Sized,
{
    pub fn new(catalog: &'a C, evaluator: &'a E) -> Self {
        Self { catalog, evaluator }
    }

    pub async fn reconcile(&self, key: &ObjectKey) -> Result<Outcome, Error> {
        self.reconcile_at(key, Utc::now()).await
    }

    /// Runs a pass with `now` as the time stamped on changed conditions.
    pub async fn reconcile_at(
        &self,
        key: &ObjectKey,
        now: DateTime<Utc>,
    ) -> Result<Outcome, Error> {
        let Some(mut app) = self.catalog.get_application(key).await? else {
            debug!("application {key} not found");
            return Ok(Outcome::NotFound);
        };

        if app.is_deleting() {
            debug!(
                "application {key} is deleted, deletion_timestamp is {:?}",
                app.metadata.deletion_timestamp
            );
            return Ok(Outcome::Deleting);
        }

        let namespace = app.namespace()?;
        let components = match app.label_selector() {
            Some(labels) => {
                discover::discover(
                    self.catalog,
                    &app.spec.component_kinds,
                    &labels,
                    &namespace,
                )
                .await?
            }
            None => {
                info!("application {key} has no selector, no components to discover");
                Vec::new()
            }
        };

        if app.spec.add_owner_ref {
            let report = ownership::claim(self.catalog, &app.new_owner_ref(), &components).await;
            if !report.failed.is_empty() {
                warn!(
                    "owner reference not set on {} of {} component(s)",
                    report.failed.len(),
                    components.len()
                );
            }
        }

        let evaluation = readiness::evaluate_all(self.evaluator, &components);
        let ready = aggregate::aggregate_ready(&evaluation.statuses);

        let current = app.status.clone().unwrap_or_default();
        let new_status = compose_status(&app, &current, evaluation.statuses, ready, now);

        if new_status.semantically_equal(&current) {
            debug!("application {key} status unchanged");
            return Ok(Outcome::Unchanged);
        }

        let readiness_changed = current.condition(condition::READY).map(|c| c.status)
            != new_status.condition(condition::READY).map(|c| c.status);

        app.status = Some(new_status);
        self.catalog.update_application_status(&app).await?;
        info!("application {key} status updated, ready: {ready}");

        Ok(Outcome::Updated {
            ready,
            readiness_changed,
        })
    }
}

/// The status an application should carry for the given component statuses.
///
/// Starts from `current` so that conditions other than `Ready`, and the timestamps of
/// an unchanged `Ready` condition, are kept.
pub fn compose_status(
    app: &Application,
    current: &ApplicationStatus,
    statuses: Vec<ObjectStatus>,
    ready: bool,
    now: DateTime<Utc>,
) -> ApplicationStatus {
    let mut status = current.clone();

    status.observed_generation = app.metadata.generation;
    status.components_ready = Some(aggregate::components_ready(&statuses));
    status.components = statuses;

    if ready {
        status.set_ready_condition(COMPONENTS_READY, COMPONENTS_READY_MESSAGE, now);
    } else {
        status.set_not_ready_condition(COMPONENTS_NOT_READY, COMPONENTS_NOT_READY_MESSAGE, now);
    }

    status
}

pub async fn reconcile_application(
    app: Arc<Application>,
    ctx: Arc<Context>,
) -> Result<Action, Error> {
    let key = ObjectKey::try_from(app.as_ref())?;
    let span = info_span!("reconcile", application = %key);

    let outcome = ctx.reconciler().reconcile(&key).instrument(span).await?;

    match outcome {
        Outcome::NotFound | Outcome::Deleting => Ok(Action::await_change()),
        Outcome::Updated {
            ready,
            readiness_changed: true,
        } => {
            let (event_type, reason, message) = if ready {
                (EventType::Normal, COMPONENTS_READY, COMPONENTS_READY_MESSAGE)
            } else {
                (
                    EventType::Warning,
                    COMPONENTS_NOT_READY,
                    COMPONENTS_NOT_READY_MESSAGE,
                )
            };
            if let Err(e) = ctx.record(&app, event_type, reason, message).await {
                warn!("failed to publish event for application {key}: {e}");
            }
            Ok(Action::requeue(ctx.config.resync_interval))
        }
        Outcome::Unchanged | Outcome::Updated { .. } => {
            Ok(Action::requeue(ctx.config.resync_interval))
        }
    }
}
