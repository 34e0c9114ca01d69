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

use crate::catalog::{Catalog, Component, Error, KubeSnafu, ObjectKey};
use crate::reconcile::Reconciler;
use crate::reconcile::readiness::{EvaluateReadiness, StandardConditions};
use crate::types::v1beta1::application::{Application, GroupKind};
use kube::api::{DynamicObject, ListParams, PostParams};
use kube::core::TypeMeta;
use kube::discovery::ApiResource;
use kube::runtime::events::{Event, EventType, Recorder, Reporter};
use kube::{Resource, api::Api};
use snafu::futures::TryFutureExt;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MANAGER: &str = "application-operator";

/// Runtime settings of the controller.
#[derive(Clone, Debug)]
pub struct Config {
    /// Watch a single namespace instead of the whole cluster
    pub namespace: Option<String>,

    /// Delay before an application is reconciled again after a successful pass
    pub resync_interval: Duration,

    /// Delay before a failed pass is retried
    pub retry_interval: Duration,

    /// Reporter name on published events
    pub manager: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            resync_interval: Duration::from_secs(300),
            retry_interval: Duration::from_secs(5),
            manager: DEFAULT_MANAGER.to_owned(),
        }
    }
}

pub struct Context {
    pub(crate) client: kube::Client,
    pub(crate) recorder: Recorder,
    pub(crate) config: Config,
    evaluator: Box<dyn EvaluateReadiness>,
}

impl Context {
    pub fn new(client: kube::Client, config: Config) -> Self {
        let reporter = Reporter {
            controller: config.manager.clone(),
            instance: std::env::var("HOSTNAME").ok(),
        };

        let recorder = Recorder::new(client.clone(), reporter);
        Self {
            client,
            recorder,
            config,
            evaluator: Box::new(StandardConditions),
        }
    }

    /// Replaces the readiness rules used for components.
    pub fn with_evaluator(mut self, evaluator: impl EvaluateReadiness + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn reconciler(&self) -> Reconciler<'_, Self, dyn EvaluateReadiness> {
        Reconciler::new(self, self.evaluator.as_ref())
    }

    /// send event
    #[inline]
    pub async fn record(
        &self,
        resource: &Application,
        event_type: EventType,
        reason: &str,
        message: &str,
    ) -> Result<(), kube::Error> {
        self.recorder
            .publish(
                &Event {
                    type_: event_type,
                    reason: reason.to_owned(),
                    note: Some(message.into()),
                    action: "Reconcile".into(),
                    secondary: None,
                },
                &resource.object_ref(&()),
            )
            .await
    }

    fn dynamic_api(&self, resource: &ApiResource, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, resource)
    }
}

impl Catalog for Context {
    async fn get_application(&self, key: &ObjectKey) -> Result<Option<Application>, Error> {
        let api: Api<Application> = Api::namespaced(self.client.clone(), &key.namespace);
        api.get_opt(&key.name).context(KubeSnafu).await
    }

    async fn update_application_status(&self, app: &Application) -> Result<Application, Error> {
        let api: Api<Application> = Api::namespaced(self.client.clone(), &app.namespace()?);

        // replaces the whole status; the carried resourceVersion turns a stale read into a conflict
        api.replace_status(&app.name()?, &PostParams::default(), app)
            .context(KubeSnafu)
            .await
    }

    async fn resolve(&self, gk: &GroupKind) -> Result<Option<ApiResource>, Error> {
        match kube::discovery::oneshot::group(&self.client, &gk.group).await {
            Ok(group) => Ok(group.recommended_kind(&gk.kind).map(|(resource, _)| resource)),
            Err(kube::Error::Discovery(e)) => {
                debug!("api group of {gk} not served: {e}");
                Ok(None)
            }
            Err(kube::Error::Api(status)) if status.is_not_found() => Ok(None),
            Err(source) => Err(Error::Kube { source }),
        }
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        labels: &str,
    ) -> Result<Vec<DynamicObject>, Error> {
        let mut params = ListParams::default();
        if !labels.is_empty() {
            params = params.labels(labels);
        }

        let list = self
            .dynamic_api(resource, namespace)
            .list(&params)
            .context(KubeSnafu)
            .await?;

        Ok(list.items)
    }

    async fn update(&self, component: &Component) -> Result<(), Error> {
        let mut object = component.object.clone();
        object.types = Some(TypeMeta {
            api_version: component.resource.api_version.clone(),
            kind: component.resource.kind.clone(),
        });

        self.dynamic_api(&component.resource, &component.namespace())
            .replace(&component.name(), &PostParams::default(), &object)
            .context(KubeSnafu)
            .await?;

        Ok(())
    }
}
