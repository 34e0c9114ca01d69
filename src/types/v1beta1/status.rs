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

pub mod condition;
pub mod object;

use chrono::{DateTime, Utc};
use condition::{Condition, ConditionStatus};
use kube::KubeSchema;
use object::ObjectStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Clone, Debug, KubeSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatus {
    /// Generation of the spec the status was computed from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ObjectStatus>,

    /// Ready components over matched components, e.g. "2/3"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components_ready: Option<String>,
}

impl ApplicationStatus {
    pub fn condition(&self, type_: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }

    pub fn set_ready_condition(&mut self, reason: &str, message: &str, now: DateTime<Utc>) {
        condition::set_condition(
            &mut self.conditions,
            condition::READY,
            ConditionStatus::True,
            reason,
            message,
            now,
        );
    }

    pub fn set_not_ready_condition(&mut self, reason: &str, message: &str, now: DateTime<Utc>) {
        condition::set_condition(
            &mut self.conditions,
            condition::READY,
            ConditionStatus::False,
            reason,
            message,
            now,
        );
    }

    /// Structural equality where conditions are compared by type, not by position.
    ///
    /// Component order is kept significant: it follows discovery order, which is deterministic.
    pub fn semantically_equal(&self, other: &Self) -> bool {
        fn by_type(conditions: &[Condition]) -> BTreeMap<&str, &Condition> {
            conditions.iter().map(|c| (c.type_.as_str(), c)).collect()
        }

        self.observed_generation == other.observed_generation
            && self.components == other.components
            && self.components_ready == other.components_ready
            && self.conditions.len() == other.conditions.len()
            && by_type(&self.conditions) == by_type(&other.conditions)
    }
}
