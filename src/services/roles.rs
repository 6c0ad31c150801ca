use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::Timestamp;
use crate::error::Result;
use crate::models::{list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    pub struct Role {
        id: i64,
        name: String,
        user_ids: Vec<i64>,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct RoleList { roles: Role }
}

record! {
    pub struct RoleCreateRequest {
        name: String,
        user_ids: Vec<i64>,
    }
}

record! {
    pub struct RoleUpdateRequest {
        name: String,
        user_ids: Vec<i64>,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RolesService<'a> {
    client: &'a HarvestClient,
}

impl<'a> RolesService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ListOptions>,
    ) -> Result<(RoleList, Response)> {
        self.client.get(ctx, "roles", opts).await
    }

    pub async fn get(&self, ctx: &Context, role_id: i64) -> Result<(Role, Response)> {
        self.client.get(ctx, &format!("roles/{role_id}"), NO_BODY).await
    }

    pub async fn create(&self, ctx: &Context, data: &RoleCreateRequest) -> Result<(Role, Response)> {
        self.client.post(ctx, "roles", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        role_id: i64,
        data: &RoleUpdateRequest,
    ) -> Result<(Role, Response)> {
        self.client.patch(ctx, &format!("roles/{role_id}"), data).await
    }

    pub async fn delete(&self, ctx: &Context, role_id: i64) -> Result<Response> {
        self.client.delete(ctx, &format!("roles/{role_id}")).await
    }
}
