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

use chrono::{DateTime, SecondsFormat, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Condition type of the aggregate readiness verdict.
pub const READY: &str = "Ready";

#[derive(Deserialize, Serialize, Clone, Copy, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum ConditionStatus {
    #[strum(to_string = "True")]
    True,

    #[strum(to_string = "False")]
    False,

    #[strum(to_string = "Unknown")]
    Unknown,
}

#[derive(Deserialize, Serialize, Clone, Debug, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// RFC 3339 time of the last change to status, reason or message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,

    /// RFC 3339 time of the last change to status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Sets the condition of `type_` in `conditions`, adding it if missing.
///
/// A condition that already carries the same status, reason and message is left untouched,
/// timestamps included. `last_transition_time` only moves when the status flips.
pub fn set_condition(
    conditions: &mut Vec<Condition>,
    type_: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
    now: DateTime<Utc>,
) {
    let Some(existing) = conditions.iter_mut().find(|c| c.type_ == type_) else {
        conditions.push(Condition {
            type_: type_.to_owned(),
            status,
            reason: Some(reason.to_owned()),
            message: Some(message.to_owned()),
            last_update_time: Some(timestamp(now)),
            last_transition_time: Some(timestamp(now)),
        });
        return;
    };

    if existing.status == status
        && existing.reason.as_deref() == Some(reason)
        && existing.message.as_deref() == Some(message)
    {
        return;
    }

    existing.last_update_time = Some(timestamp(now));
    if existing.status != status {
        existing.last_transition_time = Some(timestamp(now));
    }
    existing.status = status;
    existing.reason = Some(reason.to_owned());
    existing.message = Some(message.to_owned());
}
