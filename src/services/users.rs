use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::Timestamp;
use crate::error::Result;
use crate::models::{ClientRef, ProjectRef, TaskRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    pub struct User {
        id: i64,
        first_name: String,
        last_name: String,
        email: String,
        telephone: String,
        timezone: String,
        has_access_to_all_future_projects: bool,
        is_contractor: bool,
        is_active: bool,
        weekly_capacity: i64,
        default_hourly_rate: f64,
        cost_rate: f64,
        roles: Vec<String>,
        access_roles: Vec<String>,
        avatar_url: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct UserList { users: User }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct UserCreateRequest {
        first_name: String,
        last_name: String,
        email: String,
        timezone: String,
        has_access_to_all_future_projects: bool,
        is_contractor: bool,
        is_active: bool,
        weekly_capacity: i64,
        default_hourly_rate: f64,
        cost_rate: f64,
        roles: Vec<String>,
        access_roles: Vec<String>,
    }
}

record! {
    pub struct UserUpdateRequest {
        first_name: String,
        last_name: String,
        email: String,
        timezone: String,
        has_access_to_all_future_projects: bool,
        is_contractor: bool,
        is_active: bool,
        weekly_capacity: i64,
        #[serde(with = "crate::optional::nullable")]
        default_hourly_rate: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        cost_rate: Option<f64>,
        roles: Vec<String>,
        access_roles: Vec<String>,
    }
}

record! {
    /// Task assignment as embedded in a user's project assignment.
    pub struct AssignedTask {
        id: i64,
        task: TaskRef,
        is_active: bool,
        billable: bool,
        hourly_rate: f64,
        budget: f64,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

record! {
    pub struct ProjectAssignment {
        id: i64,
        is_active: bool,
        is_project_manager: bool,
        use_default_rates: bool,
        hourly_rate: f64,
        budget: f64,
        project: ProjectRef,
        client: ClientRef,
        task_assignments: Vec<AssignedTask>,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ProjectAssignmentList { project_assignments: ProjectAssignment }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectAssignmentListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

/// Users and the projects they are assigned to.
#[derive(Debug, Clone, Copy)]
pub struct UsersService<'a> {
    client: &'a HarvestClient,
}

impl<'a> UsersService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&UserListOptions>,
    ) -> Result<(UserList, Response)> {
        self.client.get(ctx, "users", opts).await
    }

    pub async fn get(&self, ctx: &Context, user_id: i64) -> Result<(User, Response)> {
        self.client.get(ctx, &format!("users/{user_id}"), NO_BODY).await
    }

    /// The user the transport's credentials belong to.
    pub async fn current(&self, ctx: &Context) -> Result<(User, Response)> {
        self.client.get(ctx, "users/me", NO_BODY).await
    }

    pub async fn create(&self, ctx: &Context, data: &UserCreateRequest) -> Result<(User, Response)> {
        self.client.post(ctx, "users", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        user_id: i64,
        data: &UserUpdateRequest,
    ) -> Result<(User, Response)> {
        self.client.patch(ctx, &format!("users/{user_id}"), data).await
    }

    pub async fn delete(&self, ctx: &Context, user_id: i64) -> Result<Response> {
        self.client.delete(ctx, &format!("users/{user_id}")).await
    }

    pub async fn list_project_assignments(
        &self,
        ctx: &Context,
        user_id: i64,
        opts: Option<&ProjectAssignmentListOptions>,
    ) -> Result<(ProjectAssignmentList, Response)> {
        self.client
            .get(ctx, &format!("users/{user_id}/project_assignments"), opts)
            .await
    }

    pub async fn current_project_assignments(
        &self,
        ctx: &Context,
        opts: Option<&ProjectAssignmentListOptions>,
    ) -> Result<(ProjectAssignmentList, Response)> {
        self.client
            .get(ctx, "users/me/project_assignments", opts)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_assignment_decodes_nested_tasks() {
        let list: ProjectAssignmentList = serde_json::from_str(
            r#"{"project_assignments":[{"id":125068554,"is_project_manager":true,
                "project":{"id":14308069,"name":"Online Store - Phase 1","code":"OS1"},
                "client":{"id":5735776,"name":"123 Industries"},
                "task_assignments":[{"id":155505013,"billable":true,"task":{"id":8083365,"name":"Graphic Design"}}]}],
                "per_page":100,"total_pages":1,"total_entries":1,"page":1}"#,
        )
        .unwrap();
        let assignment = &list.project_assignments[0];
        let tasks = assignment.task_assignments.as_ref().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(
            tasks[0].task.as_ref().and_then(|task| task.name.as_deref()),
            Some("Graphic Design")
        );
        assert_eq!(list.pagination.page, Some(1));
    }

    #[test]
    fn user_roles_round_trip_as_arrays() {
        let data = UserCreateRequest {
            email: Some("george@example.com".to_string()),
            roles: Some(vec!["Founder".to_string()]),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"{"email":"george@example.com","roles":["Founder"]}"#
        );
    }
}
