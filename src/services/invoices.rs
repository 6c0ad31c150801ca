use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::{Date, Timestamp};
use crate::error::Result;
use crate::models::{
    ClientRef, EstimateRef, EventRequest, EventType, MessageRecipient, ProjectRef, UserRef, list,
    record,
};
use crate::pagination::ListOptions;
use crate::response::Response;

record! {
    /// An invoice. `state` is kept exactly as the server reports it
    /// (`draft`, `open`, `paid`, `closed`).
    pub struct Invoice {
        id: i64,
        client: ClientRef,
        line_items: Vec<InvoiceLineItem>,
        estimate: EstimateRef,
        creator: UserRef,
        client_key: String,
        number: String,
        purchase_order: String,
        amount: f64,
        due_amount: f64,
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
        period_start: Date,
        period_end: Date,
        issue_date: Date,
        due_date: Date,
        payment_term: String,
        sent_at: Timestamp,
        paid_at: Timestamp,
        paid_date: Date,
        closed_at: Timestamp,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

record! {
    pub struct InvoiceLineItem {
        id: i64,
        project: ProjectRef,
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
    pub struct InvoiceList { invoices: Invoice }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
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
    pub struct InvoiceLineItemRequest {
        id: i64,
        project_id: i64,
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
    pub struct InvoiceCreateRequest {
        client_id: i64,
        retainer_id: i64,
        estimate_id: i64,
        number: String,
        purchase_order: String,
        tax: f64,
        tax2: f64,
        discount: f64,
        subject: String,
        notes: String,
        currency: String,
        issue_date: Date,
        due_date: Date,
        payment_term: String,
        line_items: Vec<InvoiceLineItemRequest>,
    }
}

record! {
    pub struct InvoiceUpdateRequest {
        client_id: i64,
        retainer_id: i64,
        estimate_id: i64,
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
        due_date: Date,
        payment_term: String,
        line_items: Vec<InvoiceLineItemRequest>,
    }
}

record! {
    pub struct InvoiceMessage {
        id: i64,
        sent_by: String,
        sent_by_email: String,
        sent_from: String,
        sent_from_email: String,
        recipients: Vec<MessageRecipient>,
        subject: String,
        body: String,
        include_link_to_client_invoice: bool,
        attach_pdf: bool,
        send_me_a_copy: bool,
        thank_you: bool,
        reminder: bool,
        send_reminder_on: Date,
        event_type: String,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct InvoiceMessageList { invoice_messages: InvoiceMessage }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceMessageListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct InvoiceMessageCreateRequest {
        event_type: EventType,
        recipients: Vec<MessageRecipient>,
        subject: String,
        body: String,
        include_link_to_client_invoice: bool,
        attach_pdf: bool,
        send_me_a_copy: bool,
        thank_you: bool,
    }
}

record! {
    pub struct PaymentGateway {
        id: i64,
        name: String,
    }
}

record! {
    pub struct InvoicePayment {
        id: i64,
        amount: f64,
        paid_at: Timestamp,
        paid_date: Date,
        recorded_by: String,
        recorded_by_email: String,
        notes: String,
        transaction_id: String,
        payment_gateway: PaymentGateway,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct InvoicePaymentList { invoice_payments: InvoicePayment }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoicePaymentListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct InvoicePaymentCreateRequest {
        amount: f64,
        paid_at: Timestamp,
        paid_date: Date,
        notes: String,
    }
}

record! {
    pub struct InvoiceItemCategory {
        id: i64,
        name: String,
        use_as_service: bool,
        use_as_expense: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct InvoiceItemCategoryList { invoice_item_categories: InvoiceItemCategory }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct InvoiceItemCategoryListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct InvoiceItemCategoryRequest {
        name: String,
    }
}

/// Invoices with their messages, payments, workflow transitions and item
/// categories.
#[derive(Debug, Clone, Copy)]
pub struct InvoicesService<'a> {
    client: &'a HarvestClient,
}

impl<'a> InvoicesService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&InvoiceListOptions>,
    ) -> Result<(InvoiceList, Response)> {
        self.client.get(ctx, "invoices", opts).await
    }

    pub async fn get(&self, ctx: &Context, invoice_id: i64) -> Result<(Invoice, Response)> {
        self.client
            .get(ctx, &format!("invoices/{invoice_id}"), NO_BODY)
            .await
    }

    pub async fn create(
        &self,
        ctx: &Context,
        data: &InvoiceCreateRequest,
    ) -> Result<(Invoice, Response)> {
        self.client.post(ctx, "invoices", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        invoice_id: i64,
        data: &InvoiceUpdateRequest,
    ) -> Result<(Invoice, Response)> {
        self.client
            .patch(ctx, &format!("invoices/{invoice_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, invoice_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("invoices/{invoice_id}"))
            .await
    }

    pub async fn list_messages(
        &self,
        ctx: &Context,
        invoice_id: i64,
        opts: Option<&InvoiceMessageListOptions>,
    ) -> Result<(InvoiceMessageList, Response)> {
        self.client
            .get(ctx, &format!("invoices/{invoice_id}/messages"), opts)
            .await
    }

    pub async fn create_message(
        &self,
        ctx: &Context,
        invoice_id: i64,
        data: &InvoiceMessageCreateRequest,
    ) -> Result<(InvoiceMessage, Response)> {
        self.client
            .post(ctx, &format!("invoices/{invoice_id}/messages"), data)
            .await
    }

    pub async fn delete_message(
        &self,
        ctx: &Context,
        invoice_id: i64,
        message_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(ctx, &format!("invoices/{invoice_id}/messages/{message_id}"))
            .await
    }

    pub async fn mark_as_sent(
        &self,
        ctx: &Context,
        invoice_id: i64,
    ) -> Result<(InvoiceMessage, Response)> {
        self.send_event(ctx, invoice_id, EventType::Send).await
    }

    pub async fn mark_as_closed(
        &self,
        ctx: &Context,
        invoice_id: i64,
    ) -> Result<(InvoiceMessage, Response)> {
        self.send_event(ctx, invoice_id, EventType::Close).await
    }

    pub async fn mark_as_draft(
        &self,
        ctx: &Context,
        invoice_id: i64,
    ) -> Result<(InvoiceMessage, Response)> {
        self.send_event(ctx, invoice_id, EventType::Draft).await
    }

    pub async fn mark_as_reopened(
        &self,
        ctx: &Context,
        invoice_id: i64,
    ) -> Result<(InvoiceMessage, Response)> {
        self.send_event(ctx, invoice_id, EventType::ReOpen).await
    }

    async fn send_event(
        &self,
        ctx: &Context,
        invoice_id: i64,
        event_type: EventType,
    ) -> Result<(InvoiceMessage, Response)> {
        self.client
            .post(
                ctx,
                &format!("invoices/{invoice_id}/messages"),
                &EventRequest { event_type },
            )
            .await
    }

    pub async fn list_payments(
        &self,
        ctx: &Context,
        invoice_id: i64,
        opts: Option<&InvoicePaymentListOptions>,
    ) -> Result<(InvoicePaymentList, Response)> {
        self.client
            .get(ctx, &format!("invoices/{invoice_id}/payments"), opts)
            .await
    }

    pub async fn create_payment(
        &self,
        ctx: &Context,
        invoice_id: i64,
        data: &InvoicePaymentCreateRequest,
    ) -> Result<(InvoicePayment, Response)> {
        self.client
            .post(ctx, &format!("invoices/{invoice_id}/payments"), data)
            .await
    }

    pub async fn delete_payment(
        &self,
        ctx: &Context,
        invoice_id: i64,
        payment_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(ctx, &format!("invoices/{invoice_id}/payments/{payment_id}"))
            .await
    }

    pub async fn list_item_categories(
        &self,
        ctx: &Context,
        opts: Option<&InvoiceItemCategoryListOptions>,
    ) -> Result<(InvoiceItemCategoryList, Response)> {
        self.client.get(ctx, "invoice_item_categories", opts).await
    }

    pub async fn get_item_category(
        &self,
        ctx: &Context,
        category_id: i64,
    ) -> Result<(InvoiceItemCategory, Response)> {
        self.client
            .get(ctx, &format!("invoice_item_categories/{category_id}"), NO_BODY)
            .await
    }

    pub async fn create_item_category(
        &self,
        ctx: &Context,
        data: &InvoiceItemCategoryRequest,
    ) -> Result<(InvoiceItemCategory, Response)> {
        self.client.post(ctx, "invoice_item_categories", data).await
    }

    pub async fn update_item_category(
        &self,
        ctx: &Context,
        category_id: i64,
        data: &InvoiceItemCategoryRequest,
    ) -> Result<(InvoiceItemCategory, Response)> {
        self.client
            .patch(ctx, &format!("invoice_item_categories/{category_id}"), data)
            .await
    }

    pub async fn delete_item_category(&self, ctx: &Context, category_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("invoice_item_categories/{category_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_list_uses_invoice_messages_key() {
        let list: InvoiceMessageList = serde_json::from_str(
            r#"{"invoice_messages":[{"id":27835209,"event_type":null,"recipients":[{"name":"Richard Roe","email":"richardroe@example.com"}]}],
                "per_page":100,"total_pages":1,"total_entries":1,"page":1}"#,
        )
        .unwrap();
        assert_eq!(list.invoice_messages.len(), 1);
        assert!(list.invoice_messages[0].event_type.is_none());
        let recipients = list.invoice_messages[0].recipients.as_ref().unwrap();
        assert_eq!(recipients[0].email.as_deref(), Some("richardroe@example.com"));
    }

    #[test]
    fn payment_request_encodes_timestamp_as_utc() {
        let data = InvoicePaymentCreateRequest {
            amount: Some(1575.86),
            paid_at: Some(Timestamp::parse("2017-07-24T13:32:18Z").unwrap()),
            notes: Some("Paid by phone".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"{"amount":1575.86,"paid_at":"2017-07-24T13:32:18Z","notes":"Paid by phone"}"#
        );
    }
}
