use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::{Date, Timestamp};
use crate::error::Result;
use crate::models::{ClientRef, InvoiceRef, ProjectRef, UserRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;
use crate::services::projects::UserAssignment;

record! {
    pub struct ExpenseCategoryRef {
        id: i64,
        name: String,
        unit_price: f64,
        unit_name: String,
    }
}

record! {
    pub struct Receipt {
        url: String,
        file_name: String,
        file_size: i64,
        content_type: String,
    }
}

record! {
    pub struct Expense {
        id: i64,
        client: ClientRef,
        project: ProjectRef,
        expense_category: ExpenseCategoryRef,
        user: UserRef,
        user_assignment: UserAssignment,
        receipt: Receipt,
        invoice: InvoiceRef,
        notes: String,
        units: f64,
        total_cost: f64,
        billable: bool,
        is_closed: bool,
        is_locked: bool,
        is_billed: bool,
        locked_reason: String,
        spent_date: Date,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ExpenseList { expenses: Expense }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_billed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Date>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct ExpenseCreateRequest {
        user_id: i64,
        project_id: i64,
        expense_category_id: i64,
        spent_date: Date,
        units: f64,
        total_cost: f64,
        notes: String,
        billable: bool,
    }
}

record! {
    pub struct ExpenseUpdateRequest {
        project_id: i64,
        expense_category_id: i64,
        spent_date: Date,
        #[serde(with = "crate::optional::nullable")]
        units: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        total_cost: Option<f64>,
        #[serde(with = "crate::optional::nullable")]
        notes: Option<String>,
        billable: bool,
        delete_receipt: bool,
    }
}

record! {
    pub struct ExpenseCategory {
        id: i64,
        name: String,
        unit_name: String,
        unit_price: f64,
        is_active: bool,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct ExpenseCategoryList { expense_categories: ExpenseCategory }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseCategoryListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_since: Option<Timestamp>,
    #[serde(flatten)]
    pub list: ListOptions,
}

record! {
    pub struct ExpenseCategoryCreateRequest {
        name: String,
        unit_name: String,
        unit_price: f64,
        is_active: bool,
    }
}

record! {
    pub struct ExpenseCategoryUpdateRequest {
        name: String,
        #[serde(with = "crate::optional::nullable")]
        unit_name: Option<String>,
        #[serde(with = "crate::optional::nullable")]
        unit_price: Option<f64>,
        is_active: bool,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExpensesService<'a> {
    client: &'a HarvestClient,
}

impl<'a> ExpensesService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ExpenseListOptions>,
    ) -> Result<(ExpenseList, Response)> {
        self.client.get(ctx, "expenses", opts).await
    }

    pub async fn get(&self, ctx: &Context, expense_id: i64) -> Result<(Expense, Response)> {
        self.client
            .get(ctx, &format!("expenses/{expense_id}"), NO_BODY)
            .await
    }

    pub async fn create(
        &self,
        ctx: &Context,
        data: &ExpenseCreateRequest,
    ) -> Result<(Expense, Response)> {
        self.client.post(ctx, "expenses", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        expense_id: i64,
        data: &ExpenseUpdateRequest,
    ) -> Result<(Expense, Response)> {
        self.client
            .patch(ctx, &format!("expenses/{expense_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, expense_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("expenses/{expense_id}"))
            .await
    }

    pub async fn list_categories(
        &self,
        ctx: &Context,
        opts: Option<&ExpenseCategoryListOptions>,
    ) -> Result<(ExpenseCategoryList, Response)> {
        self.client.get(ctx, "expense_categories", opts).await
    }

    pub async fn get_category(
        &self,
        ctx: &Context,
        category_id: i64,
    ) -> Result<(ExpenseCategory, Response)> {
        self.client
            .get(ctx, &format!("expense_categories/{category_id}"), NO_BODY)
            .await
    }

    pub async fn create_category(
        &self,
        ctx: &Context,
        data: &ExpenseCategoryCreateRequest,
    ) -> Result<(ExpenseCategory, Response)> {
        self.client.post(ctx, "expense_categories", data).await
    }

    pub async fn update_category(
        &self,
        ctx: &Context,
        category_id: i64,
        data: &ExpenseCategoryUpdateRequest,
    ) -> Result<(ExpenseCategory, Response)> {
        self.client
            .patch(ctx, &format!("expense_categories/{category_id}"), data)
            .await
    }

    pub async fn delete_category(&self, ctx: &Context, category_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("expense_categories/{category_id}"))
            .await
    }
}
