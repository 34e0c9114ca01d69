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

use crate::catalog::{self, Catalog, Component};
use crate::types::v1beta1::application::GroupKind;
use tracing::{debug, info};

/// Lists the components matching `labels` in `namespace` for every group/kind.
///
/// Kinds the cluster does not serve are skipped, an application may name optional
/// components. Results keep `group_kinds` order, then list order. Any list error
/// aborts discovery.
pub async fn discover<C: Catalog>(
    catalog: &C,
    group_kinds: &[GroupKind],
    labels: &str,
    namespace: &str,
) -> Result<Vec<Component>, catalog::Error> {
    let mut components = Vec::new();

    for gk in group_kinds {
        let Some(resource) = catalog.resolve(gk).await? else {
            info!(
                group = %gk.group,
                kind = %gk.kind,
                namespace,
                "no mapping for group kind, skipping"
            );
            continue;
        };

        let objects = catalog.list(&resource, namespace, labels).await?;
        debug!(
            group = %gk.group,
            kind = %gk.kind,
            namespace,
            "matched {} object(s)",
            objects.len()
        );

        components.extend(
            objects
                .into_iter()
                .map(|object| Component::new(resource.clone(), object)),
        );
    }

    Ok(components)
}
