use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::{Date, Timestamp};
use crate::error::Result;
use crate::models::{ClientRef, ProjectRef, TaskRef, UserRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    pub struct Project {
        id: i64,
        client: ClientRef,
        name: String,
        code: String,
        is_active: bool,
        is_billable: bool,
        is_fixed_fee: bool,
        bill_by: String,
        hourly_rate: f64,
        budget: f64,
        budget_by: String,
        budget_is_monthly: bool,
        notify_when_over_budget: bool,
        over_budget_notification_percentage: f64,
        over_budget_notification_date: Date,
        show_budget_to_all: bool,
        cost_budget: f64,
        cost_budget_include_expenses: bool,
        fee: f64,
        notes: String,
        starts_on: Date,
        ends_on: Date,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ProjectList { projects: Project }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct ProjectCreateRequest {
        client_id: i64,
        name: String,
        code: String,
        is_active: bool,
        is_billable: bool,
        is_fixed_fee: bool,
        bill_by: String,
        hourly_rate: f64,
        budget: f64,
        budget_by: String,
        budget_is_monthly: bool,
        notify_when_over_budget: bool,
        over_budget_notification_percentage: f64,
        show_budget_to_all: bool,
        cost_budget: f64,
        cost_budget_include_expenses: bool,
        fee: f64,
        notes: String,
        starts_on: Date,
        ends_on: Date,
    }
}

record! {
    pub struct ProjectUpdateRequest {
        client_id: i64,
        name: String,
        #[serde(with = "crate::optional::nullable")]
        code: Option<String>,
        is_active: bool,
        is_billable: bool,
        is_fixed_fee: bool,
        bill_by: String,
        #[serde(with = "crate::optional::nullable")]
        hourly_rate: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        budget: Option<f64>,
        budget_by: String,
        budget_is_monthly: bool,
        notify_when_over_budget: bool,
        over_budget_notification_percentage: f64,
        show_budget_to_all: bool,
        #[serde(with = "crate::optional::nullable")]
        cost_budget: Option<f64>,
        cost_budget_include_expenses: bool,
        #[serde(with = "crate::optional::nullable")]
        fee: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        notes: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        starts_on: Option<Date>,
        #[serde(with = "crate::optional::nullable")]
        ends_on: Option<Date>,
    }
}

record! {
    pub struct TaskAssignment {
        id: i64,
        project: ProjectRef,
        task: TaskRef,
        is_active: bool,
        billable: bool,
        hourly_rate: f64,
        budget: f64,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct TaskAssignmentList { task_assignments: TaskAssignment }
}

/// Filters shared by the task and user assignment lists.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssignmentListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct TaskAssignmentCreateRequest {
        task_id: i64,
        is_active: bool,
        billable: bool,
        hourly_rate: f64,
        budget: f64,
    }
}

record! {
    pub struct TaskAssignmentUpdateRequest {
        is_active: bool,
        billable: bool,
        #[serde(with = "crate::optional::nullable")]
        hourly_rate: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        budget: Option<f64>,
    }
}

record! {
    pub struct UserAssignment {
        id: i64,
        project: ProjectRef,
        user: UserRef,
        is_active: bool,
        is_project_manager: bool,
        use_default_rates: bool,
        hourly_rate: f64,
        budget: f64,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct UserAssignmentList { user_assignments: UserAssignment }
}

record! {
    pub struct UserAssignmentCreateRequest {
        user_id: i64,
        is_active: bool,
        is_project_manager: bool,
        use_default_rates: bool,
        hourly_rate: f64,
        budget: f64,
    }
}

record! {
    pub struct UserAssignmentUpdateRequest {
        is_active: bool,
        is_project_manager: bool,
        use_default_rates: bool,
        #[serde(with = "crate::optional::nullable")]
        hourly_rate: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        budget: Option<f64>,
    }
}

/// Projects with their task and user assignments.
#[derive(Debug, Clone, Copy)]
pub struct ProjectsService<'a> {
    client: &'a HarvestClient,
}

impl<'a> ProjectsService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ProjectListOptions>,
    ) -> Result<(ProjectList, Response)> {
        self.client.get(ctx, "projects", opts).await
    }

    pub async fn get(&self, ctx: &Context, project_id: i64) -> Result<(Project, Response)> {
        self.client
            .get(ctx, &format!("projects/{project_id}"), NO_BODY)
            .await
    }

    pub async fn create(
        &self,
        ctx: &Context,
        data: &ProjectCreateRequest,
    ) -> Result<(Project, Response)> {
        self.client.post(ctx, "projects", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        project_id: i64,
        data: &ProjectUpdateRequest,
    ) -> Result<(Project, Response)> {
        self.client
            .patch(ctx, &format!("projects/{project_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, project_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("projects/{project_id}"))
            .await
    }

    pub async fn list_task_assignments(
        &self,
        ctx: &Context,
        project_id: i64,
        opts: Option<&AssignmentListOptions>,
    ) -> Result<(TaskAssignmentList, Response)> {
        self.client
            .get(ctx, &format!("projects/{project_id}/task_assignments"), opts)
            .await
    }

    pub async fn get_task_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        task_assignment_id: i64,
    ) -> Result<(TaskAssignment, Response)> {
        self.client
            .get(
                ctx,
                &format!("projects/{project_id}/task_assignments/{task_assignment_id}"),
                NO_BODY,
            )
            .await
    }

    pub async fn create_task_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        data: &TaskAssignmentCreateRequest,
    ) -> Result<(TaskAssignment, Response)> {
        self.client
            .post(ctx, &format!("projects/{project_id}/task_assignments"), data)
            .await
    }

    pub async fn update_task_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        task_assignment_id: i64,
        data: &TaskAssignmentUpdateRequest,
    ) -> Result<(TaskAssignment, Response)> {
        self.client
            .patch(
                ctx,
                &format!("projects/{project_id}/task_assignments/{task_assignment_id}"),
                data,
            )
            .await
    }

    pub async fn delete_task_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        task_assignment_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(
                ctx,
                &format!("projects/{project_id}/task_assignments/{task_assignment_id}"),
            )
            .await
    }

    pub async fn list_user_assignments(
        &self,
        ctx: &Context,
        project_id: i64,
        opts: Option<&AssignmentListOptions>,
    ) -> Result<(UserAssignmentList, Response)> {
        self.client
            .get(ctx, &format!("projects/{project_id}/user_assignments"), opts)
            .await
    }

    pub async fn get_user_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        user_assignment_id: i64,
    ) -> Result<(UserAssignment, Response)> {
        self.client
            .get(
                ctx,
                &format!("projects/{project_id}/user_assignments/{user_assignment_id}"),
                NO_BODY,
            )
            .await
    }

    pub async fn create_user_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        data: &UserAssignmentCreateRequest,
    ) -> Result<(UserAssignment, Response)> {
        self.client
            .post(ctx, &format!("projects/{project_id}/user_assignments"), data)
            .await
    }

    pub async fn update_user_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        user_assignment_id: i64,
        data: &UserAssignmentUpdateRequest,
    ) -> Result<(UserAssignment, Response)> {
        self.client
            .patch(
                ctx,
                &format!("projects/{project_id}/user_assignments/{user_assignment_id}"),
                data,
            )
            .await
    }

    pub async fn delete_user_assignment(
        &self,
        ctx: &Context,
        project_id: i64,
        user_assignment_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(
                ctx,
                &format!("projects/{project_id}/user_assignments/{user_assignment_id}"),
            )
            .await
    }
}
