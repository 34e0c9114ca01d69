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

//! The resource store the reconciler reads from and writes back to.
//!
//! [`Catalog`] is everything a reconcile pass needs from the cluster: reading and
//! writing the Application, mapping a group/kind to a listable resource, listing
//! components by label and updating them. [`crate::context::Context`] backs it with
//! the Kubernetes API; tests back it with an in-memory store.

use crate::types;
use crate::types::v1beta1::application::{Application, GroupKind};
use kube::ResourceExt;
use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use snafu::Snafu;
use std::fmt;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(transparent)]
    Types { source: types::error::Error },
}

/// Namespace and name of an Application.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl TryFrom<&Application> for ObjectKey {
    type Error = types::error::Error;

    fn try_from(app: &Application) -> Result<Self, Self::Error> {
        Ok(Self::new(app.namespace()?, app.name()?))
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// A component resource together with the API resource it was listed from.
///
/// Listed objects do not reliably carry their own `apiVersion`/`kind`, so the
/// resolved [`ApiResource`] travels with the object.
#[derive(Clone, Debug)]
pub struct Component {
    pub resource: ApiResource,
    pub object: DynamicObject,
}

impl Component {
    pub fn new(resource: ApiResource, object: DynamicObject) -> Self {
        Self { resource, object }
    }

    pub fn group(&self) -> &str {
        &self.resource.group
    }

    pub fn kind(&self) -> &str {
        &self.resource.kind
    }

    pub fn namespace(&self) -> String {
        self.object.namespace().unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.object.name_any()
    }

    /// API path of the object, standing in for the retired `selfLink`.
    pub fn link(&self) -> String {
        let prefix = if self.resource.group.is_empty() {
            format!("/api/{}", self.resource.version)
        } else {
            format!("/apis/{}/{}", self.resource.group, self.resource.version)
        };

        match self.object.namespace() {
            Some(ns) => format!(
                "{prefix}/namespaces/{ns}/{}/{}",
                self.resource.plural,
                self.name()
            ),
            None => format!("{prefix}/{}/{}", self.resource.plural, self.name()),
        }
    }

    pub fn reference(&self) -> ComponentRef {
        ComponentRef {
            group: self.group().to_owned(),
            kind: self.kind().to_owned(),
            namespace: self.namespace(),
            name: self.name(),
        }
    }
}

/// Identity of a component, used to report per-resource failures.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub group: String,
    pub kind: String,
    pub namespace: String,
    pub name: String,
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gk = GroupKind::new(self.group.clone(), self.kind.clone());
        write!(f, "{gk} {}/{}", self.namespace, self.name)
    }
}

pub trait Catalog: Send + Sync {
    /// Fetches an Application, `None` when it does not exist.
    fn get_application(
        &self,
        key: &ObjectKey,
    ) -> impl Future<Output = Result<Option<Application>, Error>> + Send;

    /// Writes the status of an Application. The write is conditional on the
    /// resource version the Application was read at.
    fn update_application_status(
        &self,
        app: &Application,
    ) -> impl Future<Output = Result<Application, Error>> + Send;

    /// Maps a group/kind to a listable resource, `None` when the kind is not served.
    fn resolve(
        &self,
        gk: &GroupKind,
    ) -> impl Future<Output = Result<Option<ApiResource>, Error>> + Send;

    /// Lists objects of `resource` in `namespace` matching the `k=v,...` label selector.
    fn list(
        &self,
        resource: &ApiResource,
        namespace: &str,
        labels: &str,
    ) -> impl Future<Output = Result<Vec<DynamicObject>, Error>> + Send;

    fn update(&self, component: &Component) -> impl Future<Output = Result<(), Error>> + Send;
}
