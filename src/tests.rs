//  Copyright 2025 RustFS Team
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at
//
//      http:www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

use crate::catalog::{Catalog, Component, ComponentRef, Error, ObjectKey};
use crate::types::v1beta1::application::{Application, ApplicationSpec, GroupKind};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::ResourceExt;
use kube::api::DynamicObject;
use kube::core::{GroupVersionKind, Status};
use kube::discovery::ApiResource;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// Helper function to create a test application (available to submodule tests via crate::tests)
pub fn create_test_application(
    component_kinds: Vec<GroupKind>,
    match_labels: &[(&str, &str)],
) -> Application {
    Application {
        metadata: metav1::ObjectMeta {
            name: Some("app1".to_string()),
            namespace: Some("default".to_string()),
            uid: Some("app1-uid".to_string()),
            generation: Some(1),
            resource_version: Some("1".to_string()),
            ..Default::default()
        },
        spec: ApplicationSpec {
            component_kinds,
            selector: Some(metav1::LabelSelector {
                match_labels: Some(labels(match_labels)),
                ..Default::default()
            }),
            ..Default::default()
        },
        status: None,
    }
}

pub fn widget_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk("example.com", "v1", "Widget"))
}

pub fn gadget_resource() -> ApiResource {
    ApiResource::from_gvk(&GroupVersionKind::gvk("example.com", "v1", "Gadget"))
}

/// A Widget in `default` with arbitrary data.
pub fn widget_with_data(name: &str, label_pairs: &[(&str, &str)], data: Value) -> Component {
    let resource = widget_resource();
    let mut object = DynamicObject::new(name, &resource)
        .within("default")
        .data(data);
    object.metadata.labels = Some(labels(label_pairs));
    object.metadata.uid = Some(format!("{name}-uid"));

    Component::new(resource, object)
}

/// A Widget in `default` reporting a single `Ready` condition with `ready` as status.
pub fn widget(name: &str, label_pairs: &[(&str, &str)], ready: &str) -> Component {
    widget_with_data(
        name,
        label_pairs,
        json!({"status": {"conditions": [{"type": "Ready", "status": ready}]}}),
    )
}

/// A Gadget in `default` without any status.
pub fn gadget(name: &str, label_pairs: &[(&str, &str)]) -> Component {
    let resource = gadget_resource();
    let mut object = DynamicObject::new(name, &resource).within("default");
    object.metadata.labels = Some(labels(label_pairs));

    Component::new(resource, object)
}

#[derive(Default)]
struct State {
    applications: BTreeMap<ObjectKey, Application>,
    components: Vec<Component>,
    status_writes: usize,
    component_writes: Vec<ComponentRef>,
    fail_get_application: bool,
    fail_status_update: bool,
    failing_lists: HashSet<String>,
    failing_updates: HashSet<String>,
}

/// In-memory catalog serving the Widget and Gadget kinds of `example.com`.
#[derive(Default)]
pub struct FakeCatalog {
    state: Mutex<State>,
}

impl FakeCatalog {
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn add_application(&self, app: Application) {
        let key = ObjectKey::try_from(&app).unwrap();
        self.state().applications.insert(key, app);
    }

    pub fn application(&self, key: &ObjectKey) -> Option<Application> {
        self.state().applications.get(key).cloned()
    }

    pub fn bump_generation(&self, key: &ObjectKey) {
        if let Some(app) = self.state().applications.get_mut(key) {
            app.metadata.generation = app.metadata.generation.map(|g| g + 1);
        }
    }

    pub fn add_component(&self, component: Component) {
        self.state().components.push(component);
    }

    pub fn remove_component(&self, name: &str) {
        self.state().components.retain(|c| c.name() != name);
    }

    pub fn components(&self) -> Vec<Component> {
        self.state().components.clone()
    }

    pub fn status_writes(&self) -> usize {
        self.state().status_writes
    }

    pub fn component_writes(&self) -> Vec<ComponentRef> {
        self.state().component_writes.clone()
    }

    pub fn fail_get_application(&self) {
        self.state().fail_get_application = true;
    }

    pub fn fail_status_update(&self) {
        self.state().fail_status_update = true;
    }

    /// Makes every list of `kind` fail.
    pub fn fail_list(&self, kind: &str) {
        self.state().failing_lists.insert(kind.to_string());
    }

    /// Makes every update of the component called `name` fail.
    pub fn fail_component_update(&self, name: &str) {
        self.state().failing_updates.insert(name.to_string());
    }
}

fn api_error(status: Status) -> Error {
    Error::Kube {
        source: kube::Error::Api(status.boxed()),
    }
}

fn unavailable(msg: impl Into<String>) -> Error {
    api_error(Status::failure(&msg.into(), "ServiceUnavailable").with_code(503))
}

fn matches_labels(object: &DynamicObject, selector: &str) -> bool {
    let labels = object.labels();
    selector
        .split(',')
        .filter(|term| !term.is_empty())
        .all(|term| match term.split_once('=') {
            Some((k, v)) => labels.get(k).map(String::as_str) == Some(v),
            None => false,
        })
}

impl Catalog for FakeCatalog {
    async fn get_application(&self, key: &ObjectKey) -> Result<Option<Application>, Error> {
        let state = self.state();
        if state.fail_get_application {
            return Err(unavailable("get application"));
        }
        Ok(state.applications.get(key).cloned())
    }

    /// Behaves like a status subresource replace: the stored status becomes exactly what
    /// the serialized body carries, and a stale resourceVersion is a conflict.
    async fn update_application_status(&self, app: &Application) -> Result<Application, Error> {
        let mut state = self.state();
        if state.fail_status_update {
            return Err(unavailable("update application status"));
        }

        let key = ObjectKey::try_from(app)?;
        let stored = state
            .applications
            .get_mut(&key)
            .ok_or_else(|| unavailable(format!("application {key} not found")))?;

        if app.resource_version() != stored.resource_version() {
            return Err(api_error(
                Status::failure(&format!("application {key} was modified"), "Conflict")
                    .with_code(409),
            ));
        }

        let body = serde_json::to_value(app).unwrap();
        let sent: Application = serde_json::from_value(body).unwrap();
        stored.status = sent.status;

        let version = stored
            .resource_version()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or_default();
        stored.metadata.resource_version = Some((version + 1).to_string());

        let stored = stored.clone();
        state.status_writes += 1;

        Ok(stored)
    }

    async fn resolve(&self, gk: &GroupKind) -> Result<Option<ApiResource>, Error> {
        let resource = [widget_resource(), gadget_resource()]
            .into_iter()
            .find(|r| r.group == gk.group && r.kind == gk.kind);
        Ok(resource)
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        labels: &str,
    ) -> Result<Vec<DynamicObject>, Error> {
        let state = self.state();
        if state.failing_lists.contains(&resource.kind) {
            return Err(unavailable(format!("list {}", resource.kind)));
        }

        Ok(state
            .components
            .iter()
            .filter(|c| c.resource == *resource)
            .filter(|c| c.namespace() == namespace)
            .filter(|c| matches_labels(&c.object, labels))
            .map(|c| c.object.clone())
            .collect())
    }

    async fn update(&self, component: &Component) -> Result<(), Error> {
        let mut state = self.state();
        if state.failing_updates.contains(&component.name()) {
            return Err(unavailable(format!("update {}", component.reference())));
        }

        let stored = state
            .components
            .iter_mut()
            .find(|c| c.reference() == component.reference())
            .ok_or_else(|| unavailable(format!("{} not found", component.reference())))?;
        *stored = component.clone();
        state.component_writes.push(component.reference());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_labels() {
        let component = widget("w1", &[("app", "app1"), ("tier", "web")], "True");

        assert!(matches_labels(&component.object, ""));
        assert!(matches_labels(&component.object, "app=app1"));
        assert!(matches_labels(&component.object, "app=app1,tier=web"));
        assert!(!matches_labels(&component.object, "app=app2"));
        assert!(!matches_labels(&component.object, "app=app1,env=prod"));
    }

    #[test]
    fn test_second_tracing_init_fails_instead_of_panicking() {
        let _ = crate::init_tracing();
        assert!(crate::init_tracing().is_err());
    }

    #[tokio::test]
    async fn test_status_update_with_stale_version_conflicts() {
        let catalog = FakeCatalog::default();
        let app = create_test_application(vec![], &[]);
        catalog.add_application(app.clone());

        let mut first = app.clone();
        first.status = Some(Default::default());
        let written = catalog.update_application_status(&first).await.unwrap();
        assert_eq!(written.resource_version(), Some("2".to_string()));

        let result = catalog.update_application_status(&first).await;
        match result {
            Err(Error::Kube {
                source: kube::Error::Api(status),
            }) => assert!(status.is_conflict()),
            other => panic!("expected a conflict, got {other:?}"),
        }
        assert_eq!(catalog.status_writes(), 1);
    }
}
