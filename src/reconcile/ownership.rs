// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::catalog::{self, Catalog, Component, ComponentRef};
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use tracing::{debug, error};

/// Outcome of claiming ownership over the components of one pass.
#[derive(Debug, Default)]
pub struct ClaimReport {
    /// Components whose owner references were written
    pub claimed: Vec<ComponentRef>,

    /// Components that already carried the owner reference
    pub unchanged: Vec<ComponentRef>,

    pub failed: Vec<(ComponentRef, catalog::Error)>,
}

/// Merges `owner` into `refs`, returns whether anything changed.
///
/// References are matched on kind, apiVersion and name. A match with another uid
/// belongs to a deleted and recreated owner and is overwritten in place.
pub fn merge_owner_ref(
    refs: &mut Vec<metav1::OwnerReference>,
    owner: &metav1::OwnerReference,
) -> bool {
    let mut found = false;
    let mut changed = false;

    for existing in refs.iter_mut().filter(|r| {
        r.kind == owner.kind && r.api_version == owner.api_version && r.name == owner.name
    }) {
        found = true;
        if existing.uid != owner.uid {
            *existing = owner.clone();
            changed = true;
        }
    }

    if !found {
        refs.push(owner.clone());
        changed = true;
    }

    changed
}

/// Adds `owner` to every component, writing back only the ones that changed.
///
/// A failed write does not stop the loop: the failure is logged, reported, and
/// picked up again on the next pass.
pub async fn claim<C: Catalog>(
    catalog: &C,
    owner: &metav1::OwnerReference,
    components: &[Component],
) -> ClaimReport {
    let mut report = ClaimReport::default();

    for component in components {
        let mut refs = component
            .object
            .metadata
            .owner_references
            .clone()
            .unwrap_or_default();

        if !merge_owner_ref(&mut refs, owner) {
            report.unchanged.push(component.reference());
            continue;
        }

        let mut updated = component.clone();
        updated.object.metadata.owner_references = Some(refs);

        match catalog.update(&updated).await {
            Ok(()) => {
                debug!(
                    group = component.group(),
                    kind = component.kind(),
                    namespace = %component.namespace(),
                    name = %component.name(),
                    "owner reference set"
                );
                report.claimed.push(component.reference());
            }
            Err(e) => {
                error!(
                    group = component.group(),
                    kind = component.kind(),
                    namespace = %component.namespace(),
                    name = %component.name(),
                    "error setting owner reference: {e}"
                );
                report.failed.push((component.reference(), e));
            }
        }
    }

    report
}
