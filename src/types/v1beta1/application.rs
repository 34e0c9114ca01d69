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

use crate::types;
use crate::types::error::{NoNameSnafu, NoNamespaceSnafu};
use crate::types::v1beta1::descriptor::{AssemblyPhase, Descriptor};
use crate::types::v1beta1::status::ApplicationStatus;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use kube::{CustomResource, KubeSchema, Resource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use snafu::OptionExt;
use std::fmt;

#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, KubeSchema, Default)]
#[kube(
    group = "app.k8s.io",
    version = "v1beta1",
    kind = "Application",
    namespaced,
    status = "ApplicationStatus",
    shortname = "app",
    plural = "applications",
    singular = "application",
    printcolumn = r#"{"name":"Type", "type":"string", "jsonPath":".spec.descriptor.type"}"#,
    printcolumn = r#"{"name":"Version", "type":"string", "jsonPath":".spec.descriptor.version"}"#,
    printcolumn = r#"{"name":"Owner", "type":"boolean", "jsonPath":".spec.addOwnerRef"}"#,
    printcolumn = r#"{"name":"Ready", "type":"string", "jsonPath":".status.componentsReady"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#,
    crates(serde_json = "k8s_openapi::serde_json")
)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSpec {
    /// Kinds of resources that make up the application.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub component_kinds: Vec<GroupKind>,

    /// Labels shared by every component. Only `matchLabels` is used for discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<metav1::LabelSelector>,

    /// Add a non-controlling owner reference to every matched component.
    #[serde(default)]
    pub add_owner_ref: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<Descriptor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly_phase: Option<AssemblyPhase>,
}

/// An API group and kind, without a version.
///
/// The core group is the empty string.
#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, Default, PartialEq, Eq, Hash)]
pub struct GroupKind {
    #[serde(default)]
    pub group: String,

    pub kind: String,
}

impl GroupKind {
    pub fn new(group: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}.{}", self.kind, self.group)
        }
    }
}

impl Application {
    pub fn namespace(&self) -> Result<String, types::error::Error> {
        ResourceExt::namespace(self).context(NoNamespaceSnafu)
    }

    pub fn name(&self) -> Result<String, types::error::Error> {
        self.meta().name.clone().context(NoNameSnafu)
    }

    pub fn is_deleting(&self) -> bool {
        self.meta().deletion_timestamp.is_some()
    }

    /// The label selector rendered for a list call, `None` when the application has no selector.
    ///
    /// Keys come out sorted, so the same selector always renders the same string.
    pub fn label_selector(&self) -> Option<String> {
        let selector = self.spec.selector.as_ref()?;
        let rendered = selector
            .match_labels
            .iter()
            .flatten()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",");

        Some(rendered)
    }

    /// a new owner reference for application components
    ///
    /// The application observes its components but does not manage their lifecycle,
    /// so the reference is never the controlling one.
    pub fn new_owner_ref(&self) -> metav1::OwnerReference {
        metav1::OwnerReference {
            api_version: Self::api_version(&()).to_string(),
            kind: Self::kind(&()).to_string(),
            name: self.name_any(),
            uid: self.meta().uid.clone().unwrap_or_default(),
            controller: Some(false),
            block_owner_deletion: Some(true),
        }
    }
}
