use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::{Date, Timestamp};
use crate::error::Result;
use crate::models::{ClientRef, EventRequest, EventType, MessageRecipient, UserRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    /// An estimate. `state` is kept exactly as the server reports it
    /// (`draft`, `sent`, `accepted`, `declined`).
    pub struct Estimate {
        id: i64,
        client: ClientRef,
        creator: UserRef,
        line_items: Vec<EstimateLineItem>,
        client_key: String,
        number: String,
        purchase_order: String,
        amount: f64,
        tax: f64,
        tax_amount: f64,
        tax2: f64,
        tax2_amount: f64,
        discount: f64,
        discount_amount: f64,
        subject: String,
        notes: String,
        currency: String,
        state: String,
        issue_date: Date,
        sent_at: Timestamp,
        accepted_at: Timestamp,
        declined_at: Timestamp,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

record! {
    pub struct EstimateLineItem {
        id: i64,
        kind: String,
        description: String,
        quantity: f64,
        unit_price: f64,
        amount: f64,
        taxed: bool,
        taxed2: bool,
    }
}

list! {
    pub struct EstimateList { estimates: Estimate }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EstimateListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct EstimateLineItemRequest {
        id: i64,
        kind: String,
        description: String,
        quantity: f64,
        unit_price: f64,
        taxed: bool,
        taxed2: bool,
        #[serde(rename = "_destroy")]
        destroy: bool,
    }
}

record! {
    pub struct EstimateCreateRequest {
        client_id: i64,
        number: String,
        purchase_order: String,
        tax: f64,
        tax2: f64,
        discount: f64,
        subject: String,
        notes: String,
        currency: String,
        issue_date: Date,
        line_items: Vec<EstimateLineItemRequest>,
    }
}

record! {
    pub struct EstimateUpdateRequest {
        client_id: i64,
        number: String,
        #[serde(with = "crate::optional::nullable")]
        purchase_order: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        tax: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        tax2: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        discount: Option<f64>,
        subject: String,
        #[serde(with = "crate::optional::nullable")]
        notes: Option<String>,
        currency: String,
        issue_date: Date,
        line_items: Vec<EstimateLineItemRequest>,
    }
}

record! {
    pub struct EstimateMessage {
        id: i64,
        sent_by: String,
        sent_by_email: String,
        sent_from: String,
        sent_from_email: String,
        recipients: Vec<MessageRecipient>,
        subject: String,
        body: String,
        send_me_a_copy: bool,
        event_type: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct EstimateMessageList { estimate_messages: EstimateMessage }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EstimateMessageListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct EstimateMessageCreateRequest {
        event_type: EventType,
        recipients: Vec<MessageRecipient>,
        subject: String,
        body: String,
        send_me_a_copy: bool,
    }
}

record! {
    pub struct EstimateItemCategory {
        id: i64,
        name: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct EstimateItemCategoryList { estimate_item_categories: EstimateItemCategory }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EstimateItemCategoryListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct EstimateItemCategoryRequest {
        name: String,
    }
}

/// Estimates, their messages, workflow transitions and item categories.
#[derive(Debug, Clone, Copy)]
pub struct EstimatesService<'a> {
    client: &'a HarvestClient,
}

impl<'a> EstimatesService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&EstimateListOptions>,
    ) -> Result<(EstimateList, Response)> {
        self.client.get(ctx, "estimates", opts).await
    }

    pub async fn get(&self, ctx: &Context, estimate_id: i64) -> Result<(Estimate, Response)> {
        self.client
            .get(ctx, &format!("estimates/{estimate_id}"), NO_BODY)
            .await
    }

    pub async fn create(
        &self,
        ctx: &Context,
        data: &EstimateCreateRequest,
    ) -> Result<(Estimate, Response)> {
        self.client.post(ctx, "estimates", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        estimate_id: i64,
        data: &EstimateUpdateRequest,
    ) -> Result<(Estimate, Response)> {
        self.client
            .patch(ctx, &format!("estimates/{estimate_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, estimate_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("estimates/{estimate_id}"))
            .await
    }

    pub async fn list_messages(
        &self,
        ctx: &Context,
        estimate_id: i64,
        opts: Option<&EstimateMessageListOptions>,
    ) -> Result<(EstimateMessageList, Response)> {
        self.client
            .get(ctx, &format!("estimates/{estimate_id}/messages"), opts)
            .await
    }

    pub async fn create_message(
        &self,
        ctx: &Context,
        estimate_id: i64,
        data: &EstimateMessageCreateRequest,
    ) -> Result<(EstimateMessage, Response)> {
        self.client
            .post(ctx, &format!("estimates/{estimate_id}/messages"), data)
            .await
    }

    pub async fn delete_message(
        &self,
        ctx: &Context,
        estimate_id: i64,
        message_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(ctx, &format!("estimates/{estimate_id}/messages/{message_id}"))
            .await
    }

    pub async fn mark_as_sent(
        &self,
        ctx: &Context,
        estimate_id: i64,
    ) -> Result<(EstimateMessage, Response)> {
        self.send_event(ctx, estimate_id, EventType::Send).await
    }

    pub async fn mark_as_accepted(
        &self,
        ctx: &Context,
        estimate_id: i64,
    ) -> Result<(EstimateMessage, Response)> {
        self.send_event(ctx, estimate_id, EventType::Accept).await
    }

    pub async fn mark_as_declined(
        &self,
        ctx: &Context,
        estimate_id: i64,
    ) -> Result<(EstimateMessage, Response)> {
        self.send_event(ctx, estimate_id, EventType::Decline).await
    }

    pub async fn mark_as_reopened(
        &self,
        ctx: &Context,
        estimate_id: i64,
    ) -> Result<(EstimateMessage, Response)> {
        self.send_event(ctx, estimate_id, EventType::ReOpen).await
    }

    async fn send_event(
        &self,
        ctx: &Context,
        estimate_id: i64,
        event_type: EventType,
    ) -> Result<(EstimateMessage, Response)> {
        self.client
            .post(
                ctx,
                &format!("estimates/{estimate_id}/messages"),
                &EventRequest { event_type },
            )
            .await
    }

    pub async fn list_item_categories(
        &self,
        ctx: &Context,
        opts: Option<&EstimateItemCategoryListOptions>,
    ) -> Result<(EstimateItemCategoryList, Response)> {
        self.client.get(ctx, "estimate_item_categories", opts).await
    }

    pub async fn get_item_category(
        &self,
        ctx: &Context,
        category_id: i64,
    ) -> Result<(EstimateItemCategory, Response)> {
        self.client
            .get(ctx, &format!("estimate_item_categories/{category_id}"), NO_BODY)
            .await
    }

    pub async fn create_item_category(
        &self,
        ctx: &Context,
        data: &EstimateItemCategoryRequest,
    ) -> Result<(EstimateItemCategory, Response)> {
        self.client.post(ctx, "estimate_item_categories", data).await
    }

    pub async fn update_item_category(
        &self,
        ctx: &Context,
        category_id: i64,
        data: &EstimateItemCategoryRequest,
    ) -> Result<(EstimateItemCategory, Response)> {
        self.client
            .patch(ctx, &format!("estimate_item_categories/{category_id}"), data)
            .await
    }

    pub async fn delete_item_category(&self, ctx: &Context, category_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("estimate_item_categories/{category_id}"))
            .await
    }
}
