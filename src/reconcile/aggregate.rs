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

use crate::types::v1beta1::status::object::{ObjectStatus, Readiness};

/// True when every component is ready.
///
/// There is no quorum or partial readiness: a single component that is not ready makes
/// the application not ready, and an application without components is always ready.
pub fn aggregate_ready(statuses: &[ObjectStatus]) -> bool {
    statuses.iter().all(|s| s.status == Readiness::Ready)
}

/// "ready/total", e.g. "2/3".
pub fn components_ready(statuses: &[ObjectStatus]) -> String {
    let ready = statuses
        .iter()
        .filter(|s| s.status == Readiness::Ready)
        .count();

    format!("{ready}/{}", statuses.len())
}
