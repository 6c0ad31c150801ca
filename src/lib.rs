//! Typed async client for the Harvest v2 REST API.
//!
//! ```no_run
//! use harvest::{Context, HarvestClient};
//!
//! # async fn run(http: reqwest::Client) -> harvest::Result<()> {
//! let client = HarvestClient::new(Some(http)).with_account_id("123456");
//! let (me, _) = client.users().current(&Context::background()).await?;
//! println!("{me}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod context;
pub mod dates;
pub mod error;
pub mod models;
pub mod optional;
pub mod pagination;
pub mod query;
pub mod response;
pub mod services;
pub mod stringify;

pub use client::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HarvestClient, NO_BODY};
pub use context::Context;
pub use dates::{Date, Time, Timestamp};
pub use error::{
    AbuseRateLimitError, Block, Error, ErrorResponse, FieldError, RateLimitError, Result,
    sanitize_url,
};
pub use models::{
    ClientRef, EstimateRef, EventType, InvoiceRef, MessageRecipient, ProjectRef, TaskRef, UserRef,
};
pub use pagination::{ListOptions, PageLinks, Pagination};
pub use response::{Rate, Response};
pub use stringify::stringify;
