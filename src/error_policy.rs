// Copyright 2024 RustFS Team
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

use crate::context::Context;
use crate::reconcile::Error;
use crate::types::v1beta1::application::Application;
use kube::ResourceExt;
use kube::runtime::controller::Action;
use std::sync::Arc;
use tracing::error;

/// Every failed pass is retried as a whole; nothing is retried inside a pass.
pub fn error_policy(app: Arc<Application>, error: &Error, ctx: Arc<Context>) -> Action {
    error!(
        namespace = ResourceExt::namespace(app.as_ref()).unwrap_or_default(),
        name = %app.name_any(),
        "reconcile failed, retrying in {:?}: {error}",
        ctx.config.retry_interval
    );

    Action::requeue(ctx.config.retry_interval)
}
