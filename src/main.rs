use std::io::Write;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use harvest::services::clients::ClientListOptions;
use harvest::services::projects::ProjectListOptions;
use harvest::services::tasks::TaskListOptions;
use harvest::services::timesheets::TimeEntryListOptions;
use harvest::services::users::UserListOptions;
use harvest::{Context, Date, HarvestClient, ListOptions, NO_BODY};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod config;

use config::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "harvest", author, version, about = "Query the Harvest API", long_about = None)]
struct Cli {
    /// Personal access token (falls back to HARVEST_ACCESS_TOKEN, then ~/.harvest.json)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Account id sent as Harvest-Account-Id
    #[arg(long, global = true)]
    account_id: Option<String>,

    /// API root, must end with a slash
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Seconds before the request is abandoned
    #[arg(long, global = true, default_value_t = 30)]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// The authenticated user
    Me,
    /// Company settings of the account
    Company,
    Clients {
        #[command(flatten)]
        page: PageArgs,
    },
    Projects {
        #[command(flatten)]
        page: PageArgs,
    },
    Tasks {
        #[command(flatten)]
        page: PageArgs,
    },
    Users {
        #[command(flatten)]
        page: PageArgs,
    },
    TimeEntries {
        /// First spent date to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<Date>,
        /// Last spent date to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<Date>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// GET any path relative to the API root and print the body untouched
    Raw { path: String },
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct PageArgs {
    #[arg(long, default_value_t = 1)]
    page: i32,
    #[arg(long, default_value_t = harvest::pagination::DEFAULT_PER_PAGE)]
    per_page: i32,
}

impl From<PageArgs> for ListOptions {
    fn from(args: PageArgs) -> Self {
        ListOptions::new(args.page, args.per_page)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> harvest::Result<()> {
    let settings = config::load(Overrides {
        access_token: cli.token,
        account_id: cli.account_id,
        base_url: cli.base_url,
    })?;
    let client = build_client(&settings)?;
    let ctx = Context::with_timeout(Duration::from_secs(cli.timeout));

    match cli.command {
        Command::Me => print_json(&client.users().current(&ctx).await?.0),
        Command::Company => print_json(&client.company().get(&ctx).await?.0),
        Command::Clients { page } => {
            let opts = ClientListOptions {
                list: page.into(),
                ..Default::default()
            };
            print_json(&client.clients().list(&ctx, Some(&opts)).await?.0)
        }
        Command::Projects { page } => {
            let opts = ProjectListOptions {
                list: page.into(),
                ..Default::default()
            };
            print_json(&client.projects().list(&ctx, Some(&opts)).await?.0)
        }
        Command::Tasks { page } => {
            let opts = TaskListOptions {
                list: page.into(),
                ..Default::default()
            };
            print_json(&client.tasks().list(&ctx, Some(&opts)).await?.0)
        }
        Command::Users { page } => {
            let opts = UserListOptions {
                list: page.into(),
                ..Default::default()
            };
            print_json(&client.users().list(&ctx, Some(&opts)).await?.0)
        }
        Command::TimeEntries { from, to, page } => {
            let opts = TimeEntryListOptions {
                from,
                to,
                list: page.into(),
                ..Default::default()
            };
            print_json(&client.timesheets().list(&ctx, Some(&opts)).await?.0)
        }
        Command::Raw { path } => {
            let request = client.new_request(Method::GET, &path, NO_BODY)?;
            let mut stdout = std::io::stdout().lock();
            client.execute_raw(&ctx, request, &mut stdout).await?;
            stdout.flush()?;
            Ok(())
        }
    }
}

fn build_client(settings: &Settings) -> harvest::Result<HarvestClient> {
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", settings.access_token))
        .map_err(|_| {
            harvest::Error::Config("access token contains invalid characters".to_string())
        })?;
    bearer.set_sensitive(true);
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer);

    let http = reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(harvest::Error::transport)?;

    Ok(HarvestClient::new(Some(http))
        .with_base_url(settings.base_url.clone())
        .with_account_id(settings.account_id.clone()))
}

fn print_json<T: Serialize>(value: &T) -> harvest::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(harvest::Error::EncodeBody)?;
    println!("{json}");
    Ok(())
}
