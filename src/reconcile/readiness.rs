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

//! Per-component readiness.
//!
//! How a kind reports readiness varies, so the rules live behind
//! [`EvaluateReadiness`]. An evaluator looks only at the object it is given, never
//! blocks and never mutates it. It fails only when the condition data cannot be read.

use crate::catalog::{Component, ComponentRef};
use crate::types::v1beta1::status::object::{ObjectStatus, Readiness};
use kube::api::DynamicObject;
use serde_json::Value;
use snafu::Snafu;
use tracing::error;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("status.conditions is not a list"))]
    ConditionsNotList,

    #[snafu(display("status.conditions[{}] has no string field '{}'", index, field))]
    MalformedCondition { index: usize, field: &'static str },
}

pub trait EvaluateReadiness: Send + Sync {
    fn evaluate(&self, object: &DynamicObject) -> Result<Readiness, Error>;
}

impl<F> EvaluateReadiness for F
where
    F: Fn(&DynamicObject) -> Result<Readiness, Error> + Send + Sync,
{
    fn evaluate(&self, object: &DynamicObject) -> Result<Readiness, Error> {
        self(object)
    }
}

/// Readiness from the conventional `status.conditions` list.
///
/// - a deletion timestamp means `Terminating`
/// - no conditions at all means `Ready`
/// - `Failed=True` means `Failed`
/// - `Ready=False` or `InProgress=True` means `InProgress`
/// - `Ready=Unknown` means `Unknown`
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardConditions;

impl EvaluateReadiness for StandardConditions {
    fn evaluate(&self, object: &DynamicObject) -> Result<Readiness, Error> {
        if object.metadata.deletion_timestamp.is_some() {
            return Ok(Readiness::Terminating);
        }

        let conditions = conditions(object)?;
        let status_of = |type_: &str| {
            conditions
                .iter()
                .find(|(t, _)| *t == type_)
                .map(|(_, status)| *status)
        };

        let readiness = match (
            status_of("Failed"),
            status_of("Ready"),
            status_of("InProgress"),
        ) {
            (Some("True"), _, _) => Readiness::Failed,
            (_, Some("False"), _) | (_, _, Some("True")) => Readiness::InProgress,
            (_, Some("Unknown"), _) => Readiness::Unknown,
            _ => Readiness::Ready,
        };

        Ok(readiness)
    }
}

/// (type, status) pairs of `status.conditions`, empty when the object reports none.
fn conditions(object: &DynamicObject) -> Result<Vec<(&str, &str)>, Error> {
    let Some(raw) = object.data.pointer("/status/conditions") else {
        return Ok(Vec::new());
    };

    let list = match raw {
        Value::Null => return Ok(Vec::new()),
        Value::Array(list) => list,
        _ => return ConditionsNotListSnafu.fail(),
    };

    list.iter()
        .enumerate()
        .map(|(index, condition)| {
            let field = |field: &'static str| {
                condition
                    .get(field)
                    .and_then(Value::as_str)
                    .ok_or(Error::MalformedCondition { index, field })
            };
            Ok((field("type")?, field("status")?))
        })
        .collect()
}

/// Result of evaluating every component of a pass.
#[derive(Debug, Default)]
pub struct Evaluation {
    pub statuses: Vec<ObjectStatus>,

    /// Components left out of the aggregate because their status could not be read
    pub skipped: Vec<(ComponentRef, Error)>,
}

pub fn evaluate_all<E>(evaluator: &E, components: &[Component]) -> Evaluation
where
    E: EvaluateReadiness + ?Sized,
{
    let mut evaluation = Evaluation::default();

    for component in components {
        match evaluator.evaluate(&component.object) {
            Ok(status) => evaluation.statuses.push(ObjectStatus {
                group: component.group().to_owned(),
                kind: component.kind().to_owned(),
                name: component.name(),
                link: component.link(),
                status,
            }),
            Err(e) => {
                error!(
                    group = component.group(),
                    kind = component.kind(),
                    namespace = %component.namespace(),
                    name = %component.name(),
                    "unable to compute status for resource: {e}"
                );
                evaluation.skipped.push((component.reference(), e));
            }
        }
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{widget, widget_with_data};
    use serde_json::json;

    fn evaluate(data: Value) -> Result<Readiness, Error> {
        let component = widget_with_data("w1", &[], data);
        StandardConditions.evaluate(&component.object)
    }

    #[test]
    fn test_no_conditions_is_ready() {
        assert_eq!(evaluate(json!({})).ok(), Some(Readiness::Ready));
        assert_eq!(
            evaluate(json!({"status": {}})).ok(),
            Some(Readiness::Ready)
        );
        assert_eq!(
            evaluate(json!({"status": {"conditions": null}})).ok(),
            Some(Readiness::Ready)
        );
    }

    #[test]
    fn test_ready_true_is_ready() {
        let component = widget("w1", &[], "True");
        assert_eq!(
            StandardConditions.evaluate(&component.object).ok(),
            Some(Readiness::Ready)
        );
    }

    #[test]
    fn test_ready_false_is_in_progress() {
        let component = widget("w1", &[], "False");
        assert_eq!(
            StandardConditions.evaluate(&component.object).ok(),
            Some(Readiness::InProgress)
        );
    }

    #[test]
    fn test_ready_unknown_is_unknown() {
        let component = widget("w1", &[], "Unknown");
        assert_eq!(
            StandardConditions.evaluate(&component.object).ok(),
            Some(Readiness::Unknown)
        );
    }

    #[test]
    fn test_in_progress_overrides_ready() {
        let readiness = evaluate(json!({"status": {"conditions": [
            {"type": "Ready", "status": "True"},
            {"type": "InProgress", "status": "True"},
        ]}}));
        assert_eq!(readiness.ok(), Some(Readiness::InProgress));
    }

    #[test]
    fn test_failed_wins() {
        let readiness = evaluate(json!({"status": {"conditions": [
            {"type": "InProgress", "status": "True"},
            {"type": "Failed", "status": "True", "reason": "CrashLoop"},
        ]}}));
        assert_eq!(readiness.ok(), Some(Readiness::Failed));
    }

    #[test]
    fn test_deleting_is_terminating() {
        let mut component = widget("w1", &[], "True");
        component.object.metadata.deletion_timestamp =
            serde_json::from_value(json!("2025-01-01T00:00:00Z")).ok();
        assert!(component.object.metadata.deletion_timestamp.is_some());

        assert_eq!(
            StandardConditions.evaluate(&component.object).ok(),
            Some(Readiness::Terminating)
        );
    }

    #[test]
    fn test_conditions_not_a_list() {
        let readiness = evaluate(json!({"status": {"conditions": "Ready"}}));
        assert!(matches!(readiness, Err(Error::ConditionsNotList)));
    }

    #[test]
    fn test_condition_without_status() {
        let readiness = evaluate(json!({"status": {"conditions": [
            {"type": "Ready", "status": "True"},
            {"type": "Available"},
        ]}}));
        assert!(matches!(
            readiness,
            Err(Error::MalformedCondition {
                index: 1,
                field: "status"
            })
        ));
    }

    #[test]
    fn test_evaluate_all_skips_unreadable() {
        let components = vec![
            widget("a", &[], "True"),
            widget_with_data("b", &[], json!({"status": {"conditions": 42}})),
            widget("c", &[], "False"),
        ];

        let evaluation = evaluate_all(&StandardConditions, &components);

        let names: Vec<_> = evaluation.statuses.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(evaluation.statuses[1].status, Readiness::InProgress);
        assert_eq!(evaluation.skipped.len(), 1);
        assert_eq!(evaluation.skipped[0].0.name, "b");
        assert_eq!(
            evaluation.statuses[0].link,
            "/apis/example.com/v1/namespaces/default/widgets/a"
        );
    }

    #[test]
    fn test_closure_evaluator() {
        let always_unknown =
            |_: &DynamicObject| -> Result<Readiness, Error> { Ok(Readiness::Unknown) };
        let evaluation = evaluate_all(&always_unknown, &[widget("a", &[], "True")]);

        assert_eq!(evaluation.statuses[0].status, Readiness::Unknown);
    }
}
