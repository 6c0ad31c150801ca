use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::Timestamp;
use crate::error::Result;
use crate::models::{ClientRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    pub struct Client {
        id: i64,
        name: String,
        is_active: bool,
        address: String,
        statement_key: String,
        currency: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ClientList { clients: Client }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClientListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct ClientCreateRequest {
        name: String,
        is_active: bool,
        address: String,
        currency: String,
    }
}

record! {
    pub struct ClientUpdateRequest {
        name: String,
        is_active: bool,
        #[serde(with = "crate::optional::nullable")]
        address: Option<String>,
        currency: String,
    }
}

record! {
    pub struct Contact {
        id: i64,
        client: ClientRef,
        title: String,
        first_name: String,
        last_name: String,
        email: String,
        phone_office: String,
        phone_mobile: String,
        fax: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ContactList { contacts: Contact }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct ContactCreateRequest {
        client_id: i64,
        title: String,
        first_name: String,
        last_name: String,
        email: String,
        phone_office: String,
        phone_mobile: String,
        fax: String,
    }
}

record! {
    pub struct ContactUpdateRequest {
        client_id: i64,
        #[serde(with = "crate::optional::nullable")]
        title: Option<String>,
        first_name: String,
        #[serde(with = "crate::optional::nullable")]
        last_name: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        email: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        phone_office: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        phone_mobile: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        fax: Option<String>,
    }
}

/// Clients and their contacts.
#[derive(Debug, Clone, Copy)]
pub struct ClientsService<'a> {
    client: &'a HarvestClient,
}

impl<'a> ClientsService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ClientListOptions>,
    ) -> Result<(ClientList, Response)> {
        self.client.get(ctx, "clients", opts).await
    }

    pub async fn get(&self, ctx: &Context, client_id: i64) -> Result<(Client, Response)> {
        self.client
            .get(ctx, &format!("clients/{client_id}"), NO_BODY)
            .await
    }

    pub async fn create(
        &self,
        ctx: &Context,
        data: &ClientCreateRequest,
    ) -> Result<(Client, Response)> {
        self.client.post(ctx, "clients", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        client_id: i64,
        data: &ClientUpdateRequest,
    ) -> Result<(Client, Response)> {
        self.client
            .patch(ctx, &format!("clients/{client_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, client_id: i64) -> Result<Response> {
        self.client.delete(ctx, &format!("clients/{client_id}")).await
    }

    pub async fn list_contacts(
        &self,
        ctx: &Context,
        opts: Option<&ContactListOptions>,
    ) -> Result<(ContactList, Response)> {
        self.client.get(ctx, "contacts", opts).await
    }

    pub async fn get_contact(&self, ctx: &Context, contact_id: i64) -> Result<(Contact, Response)> {
        self.client
            .get(ctx, &format!("contacts/{contact_id}"), NO_BODY)
            .await
    }

    pub async fn create_contact(
        &self,
        ctx: &Context,
        data: &ContactCreateRequest,
    ) -> Result<(Contact, Response)> {
        self.client.post(ctx, "contacts", data).await
    }

    pub async fn update_contact(
        &self,
        ctx: &Context,
        contact_id: i64,
        data: &ContactUpdateRequest,
    ) -> Result<(Contact, Response)> {
        self.client
            .patch(ctx, &format!("contacts/{contact_id}"), data)
            .await
    }

    pub async fn delete_contact(&self, ctx: &Context, contact_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("contacts/{contact_id}"))
            .await
    }
}
