use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::error::Result;
use crate::models::record;
use crate::response::Response;

record! {
    /// Settings of the account selected by the `Harvest-Account-Id` header.
    pub struct Company {
        base_uri: String,
        full_domain: String,
        name: String,
        is_active: bool,
        week_start_day: String,
        wants_timestamp_timers: bool,
        time_format: String,
        date_format: String,
        plan_type: String,
        clock: String,
        currency_code_display: String,
        currency_symbol_display: String,
        decimal_symbol: String,
        thousands_separator: String,
        color_scheme: String,
        weekly_capacity: i64,
        expense_feature: bool,
        invoice_feature: bool,
        estimate_feature: bool,
        approval_feature: bool,
    }
}

record! {
    pub struct CompanyUpdateRequest {
        wants_timestamp_timers: bool,
        weekly_capacity: i64,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompanyService<'a> {
    client: &'a HarvestClient,
}

impl<'a> CompanyService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn get(&self, ctx: &Context) -> Result<(Company, Response)> {
        self.client.get(ctx, "company", NO_BODY).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        data: &CompanyUpdateRequest,
    ) -> Result<(Company, Response)> {
        self.client.patch(ctx, "company", data).await
    }
}
