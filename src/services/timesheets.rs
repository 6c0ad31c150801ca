use reqwest::Method;
use serde::Serialize;

use crate::client::{HarvestClient, NO_BODY};
use crate::context::Context;
use crate::dates::{Date, Time, Timestamp};
use crate::error::Result;
use crate::models::{ClientRef, InvoiceRef, ProjectRef, TaskRef, UserRef, list, record};
use crate::pagination::ListOptions;
use crate::response::Response;
use crate::services::projects::{TaskAssignment, UserAssignment};

record! {
    pub struct ExternalReference {
        id: String,
        group_id: String,
        permalink: String,
        service: String,
        service_icon_url: String,
    }
}

record! {
    /// A time entry. `started_time` and `ended_time` are only populated on
    /// accounts that track time via start and end times.
    pub struct TimeEntry {
        id: i64,
        spent_date: Date,
        user: UserRef,
        user_assignment: UserAssignment,
        client: ClientRef,
        project: ProjectRef,
        task: TaskRef,
        task_assignment: TaskAssignment,
        external_reference: ExternalReference,
        invoice: InvoiceRef,
        hours: f64,
        hours_without_timer: f64,
        rounded_hours: f64,
        notes: String,
        is_locked: bool,
        locked_reason: String,
        is_closed: bool,
        is_billed: bool,
        timer_started_at: Timestamp,
        started_time: Time,
        ended_time: Time,
        is_running: bool,
        billable: bool,
        budgeted: bool,
        billable_rate: f64,
        cost_rate: f64,
        created_at: Timestamp,
        updated_at: Timestamp,
    }
}

list! {
    pub struct TimeEntryList { time_entries: TimeEntry }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TimeEntryListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_billed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_running: Option<bool>,
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
    pub struct ExternalReferenceRequest {
        id: String,
        group_id: String,
        permalink: String,
    }
}

record! {
    /// Creates an entry from a duration; leaving `hours` out starts a timer.
    pub struct TimeEntryCreateViaDuration {
        user_id: i64,
        project_id: i64,
        task_id: i64,
        spent_date: Date,
        hours: f64,
        notes: String,
        external_reference: ExternalReferenceRequest,
    }
}

record! {
    pub struct TimeEntryCreateViaStartEnd {
        user_id: i64,
        project_id: i64,
        task_id: i64,
        spent_date: Date,
        started_time: Time,
        ended_time: Time,
        notes: String,
        external_reference: ExternalReferenceRequest,
    }
}

record! {
    pub struct TimeEntryUpdateRequest {
        project_id: i64,
        task_id: i64,
        spent_date: Date,
        #[serde(with = "crate::optional::nullable")]
        started_time: Option<Time>,
        #[serde(with = "crate::optional::nullable")]
        ended_time: Option<Time>,
        hours: f64,
        #[serde(with = "crate::optional::nullable")]
        notes: Option<String>,
        external_reference: ExternalReferenceRequest,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TimesheetsService<'a> {
    client: &'a HarvestClient,
}

impl<'a> TimesheetsService<'a> {
    pub(crate) fn new(client: &'a HarvestClient) -> Self {
        Self { client }
    }

    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&TimeEntryListOptions>,
    ) -> Result<(TimeEntryList, Response)> {
        self.client.get(ctx, "time_entries", opts).await
    }

    pub async fn get(&self, ctx: &Context, time_entry_id: i64) -> Result<(TimeEntry, Response)> {
        self.client
            .get(ctx, &format!("time_entries/{time_entry_id}"), NO_BODY)
            .await
    }

    pub async fn create_via_duration(
        &self,
        ctx: &Context,
        data: &TimeEntryCreateViaDuration,
    ) -> Result<(TimeEntry, Response)> {
        self.client.post(ctx, "time_entries", data).await
    }

    pub async fn create_via_start_end(
        &self,
        ctx: &Context,
        data: &TimeEntryCreateViaStartEnd,
    ) -> Result<(TimeEntry, Response)> {
        self.client.post(ctx, "time_entries", data).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        time_entry_id: i64,
        data: &TimeEntryUpdateRequest,
    ) -> Result<(TimeEntry, Response)> {
        self.client
            .patch(ctx, &format!("time_entries/{time_entry_id}"), data)
            .await
    }

    pub async fn delete(&self, ctx: &Context, time_entry_id: i64) -> Result<Response> {
        self.client
            .delete(ctx, &format!("time_entries/{time_entry_id}"))
            .await
    }

    /// Removes the external reference link from the entry.
    pub async fn delete_external_reference(
        &self,
        ctx: &Context,
        time_entry_id: i64,
    ) -> Result<Response> {
        self.client
            .delete(ctx, &format!("time_entries/{time_entry_id}/external_reference"))
            .await
    }

    /// Restarts the timer of a stopped entry.
    pub async fn restart(
        &self,
        ctx: &Context,
        time_entry_id: i64,
    ) -> Result<(TimeEntry, Response)> {
        self.transition(ctx, time_entry_id, "restart").await
    }

    pub async fn stop(&self, ctx: &Context, time_entry_id: i64) -> Result<(TimeEntry, Response)> {
        self.transition(ctx, time_entry_id, "stop").await
    }

    async fn transition(
        &self,
        ctx: &Context,
        time_entry_id: i64,
        action: &str,
    ) -> Result<(TimeEntry, Response)> {
        let request = self.client.new_request(
            Method::PATCH,
            &format!("time_entries/{time_entry_id}/{action}"),
            NO_BODY,
        )?;
        self.client.execute(ctx, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_entry_body() {
        let data = TimeEntryCreateViaDuration {
            user_id: Some(1),
            project_id: Some(2),
            task_id: Some(3),
            spent_date: Some(Date::new(2018, 3, 30).unwrap()),
            hours: Some(1.2),
            notes: Some("Writing tests".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&data).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "project_id": 2,
                "task_id": 3,
                "spent_date": "2018-03-30",
                "hours": 1.2,
                "notes": "Writing tests",
                "user_id": 1
            })
        );
    }

    #[test]
    fn start_end_entry_emits_kitchen_times() {
        let data = TimeEntryCreateViaStartEnd {
            project_id: Some(2),
            started_time: Some(Time::new(8, 0).unwrap()),
            ended_time: Some(Time::new(13, 30).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&data).unwrap(),
            r#"{"project_id":2,"started_time":"8:00am","ended_time":"1:30pm"}"#
        );
    }

    #[test]
    fn entry_decodes_wall_clock_times() {
        let entry: TimeEntry = serde_json::from_str(
            r#"{"id":636709355,"spent_date":"2017-03-02","hours":2.11,"started_time":"3:00pm",
                "ended_time":null,"is_running":true,"timer_started_at":"2017-06-27T16:50:17Z"}"#,
        )
        .unwrap();
        let started = entry.started_time.unwrap();
        assert_eq!((started.hour(), started.minute()), (15, 0));
        assert!(entry.ended_time.is_none());
        assert_eq!(entry.is_running, Some(true));
    }

    #[test]
    fn update_can_clear_end_time() {
        let data = TimeEntryUpdateRequest {
            ended_time: crate::optional::null(),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"ended_time":null}"#);
    }
}
