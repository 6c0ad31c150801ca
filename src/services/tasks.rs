use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::Timestamp;
use crate::error::Result;
use crate::models::{list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    pub struct Task {
        id: i64,
        name: String,
        billable_by_default: bool,
        default_hourly_rate: f64,
        is_default: bool,
        is_active: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct TaskList { tasks: Task }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct TaskCreateRequest {
        name: String,
        billable_by_default: bool,
        default_hourly_rate: f64,
        is_default: bool,
        is_active: bool,
    }
}

record! {
    pub struct TaskUpdateRequest {
        name: String,
        billable_by_default: bool,
        #[serde(with = "crate::optional::nullable")]
        default_hourly_rate: Option<f64>,
        is_default: bool,
        is_active: bool,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TasksService<'a> {
    client: &'a HarvestClient,
}

impl<'a> TasksService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&TaskListOptions>,
    ) -> Result<(TaskList, Response)> {
        self.client.get(ctx, "tasks", opts).await
    }

    pub async fn get(&self, ctx: &Context, task_id: i64) -> Result<(Task, Response)> {
        self.client.get(ctx, &format!("tasks/{task_id}"), NO_BODY).await
    }

    pub async fn create(&self, ctx: &Context, data: &TaskCreateRequest) -> Result<(Task, Response)> {
        self.client.post(ctx, "tasks", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        task_id: i64,
        data: &TaskUpdateRequest,
    ) -> Result<(Task, Response)> {
        self.client.patch(ctx, &format!("tasks/{task_id}"), data).await
    }

    pub async fn delete(&self, ctx: &Context, task_id: i64) -> Result<Response> {
        self.client.delete(ctx, &format!("tasks/{task_id}")).await
    }
}
