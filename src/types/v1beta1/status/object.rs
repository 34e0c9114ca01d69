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

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Readiness of a single component, as reported in `status.components`.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum Readiness {
    #[strum(to_string = "Ready")]
    Ready,

    #[strum(to_string = "InProgress")]
    InProgress,

    #[strum(to_string = "Unknown")]
    Unknown,

    #[strum(to_string = "Terminating")]
    Terminating,

    #[strum(to_string = "Failed")]
    Failed,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStatus {
    #[serde(default)]
    pub group: String,

    pub kind: String,

    pub name: String,

    /// API path of the object
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,

    pub status: Readiness,
}
