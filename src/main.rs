use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use admin_console::api::RestClient;
use admin_console::config::{Config, LoggingConfig};
use admin_console::domain::{Company, Entity, User};
use admin_console::notify::{NotificationCenter, NotificationLevel, Notifier};
use admin_console::search::{CategorySearch, LatestOnly};
use admin_console::store::selectors::{select_all, select_selected};
use admin_console::store::{AppState, EntityAction, EntityEffects, Store, StoreEntity, StoreHandle};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{reload, EnvFilter, Registry};

#[derive(Debug, Parser)]
#[command(name = "admin-console", version, about = "Manage console users and companies")]
struct Cli {
    /// Path to the config file (default: ~/.config/admin-console/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Manage users.
    Users {
        #[command(subcommand)]
        action: EntityCommand,
    },
    /// Manage companies.
    Companies {
        #[command(subcommand)]
        action: EntityCommand,
    },
    /// Look up cost categories.
    Categories {
        #[command(subcommand)]
        action: CategoryCommand,
    },
}

#[derive(Debug, Subcommand)]
enum EntityCommand {
    List,
    Get {
        id: String,
    },
    /// Create from a JSON payload (`@path` reads a file).
    Create {
        #[arg(long)]
        json: String,
    },
    /// Replace a record with a JSON payload (`@path` reads a file).
    Update {
        id: String,
        #[arg(long)]
        json: String,
    },
    Delete {
        id: String,
    },
}

#[derive(Debug, Subcommand)]
enum CategoryCommand {
    Search { query: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (subscriber, log_filter) = build_subscriber(bootstrap_filter(), std::io::stderr);
    subscriber.init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
        config.validate()?;
    }
    let env_override = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    apply_config_filter(&log_filter, &config.logging, env_override);

    let client = Arc::new(RestClient::new(&config.api)?);
    let notifications = Arc::new(NotificationCenter::new(config.notifications.ttl()));

    match cli.command {
        Command::Users { action } => {
            let handle = start_store(Arc::clone(&client), Arc::clone(&notifications) as _);
            run_entity::<User>(&handle, action).await?;
        }
        Command::Companies { action } => {
            let handle = start_store(Arc::clone(&client), Arc::clone(&notifications) as _);
            run_entity::<Company>(&handle, action).await?;
        }
        Command::Categories {
            action: CategoryCommand::Search { query },
        } => return search_categories(client, &config, query).await,
    }

    for notification in notifications.active() {
        if notification.level == NotificationLevel::Success {
            eprintln!("{}", notification.message);
        }
    }
    Ok(())
}

type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter used until the config file has been read: `RUST_LOG`, else info.
fn bootstrap_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Subscriber whose filter can be swapped once config is loaded.
fn build_subscriber<W>(
    filter: EnvFilter,
    writer: W,
) -> (impl tracing::Subscriber + Send + Sync + 'static, FilterHandle)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(writer),
    );
    (subscriber, handle)
}

/// Switch to the configured filter unless `RUST_LOG` already chose one.
fn apply_config_filter(handle: &FilterHandle, logging: &LoggingConfig, env_override: bool) {
    if env_override {
        return;
    }
    match EnvFilter::try_new(&logging.filter) {
        Ok(filter) => {
            if let Err(err) = handle.reload(filter) {
                tracing::warn!(error = %err, "Failed to apply logging filter");
            }
        }
        Err(err) => {
            tracing::warn!(filter = %logging.filter, error = %err, "Invalid logging filter, keeping default");
        }
    }
}

fn start_store(client: Arc<RestClient>, notifier: Arc<dyn Notifier>) -> StoreHandle {
    let (handle, store) = Store::new(AppState::default());
    let store = store
        .with_effect(EntityEffects::<User>::new(
            Arc::clone(&client) as _,
            Arc::clone(&notifier),
        ))
        .with_effect(EntityEffects::<Company>::new(client, notifier));
    tokio::spawn(store.run());
    handle
}

async fn run_entity<E>(handle: &StoreHandle, command: EntityCommand) -> anyhow::Result<()>
where
    E: StoreEntity,
    E::Key: FromStr,
    <E::Key as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let intent: EntityAction<E> = match command {
        EntityCommand::List => EntityAction::Load,
        EntityCommand::Get { id } => EntityAction::LoadOne {
            id: parse_key::<E>(&id)?,
        },
        EntityCommand::Create { json } => EntityAction::Create {
            draft: parse_draft::<E>(&json)?,
        },
        EntityCommand::Update { id, json } => EntityAction::Update {
            id: parse_key::<E>(&id)?,
            draft: parse_draft::<E>(&json)?,
        },
        EntityCommand::Delete { id } => EntityAction::Delete {
            id: parse_key::<E>(&id)?,
        },
    };

    let outcome = handle.dispatch_and_wait(E::embed(intent)).await?;
    if let Some(message) = outcome.failure_message() {
        bail!("{message}");
    }

    match E::project(&outcome) {
        Some(EntityAction::LoadSuccess { .. }) => {
            handle.select(|state| print_json(&select_all(E::slice(state))))
        }
        Some(EntityAction::LoadOneSuccess { .. }) => {
            handle.select(|state| print_json(&select_selected(E::slice(state))))
        }
        Some(EntityAction::CreateSuccess { record } | EntityAction::UpdateSuccess { record }) => {
            print_json(record)
        }
        Some(EntityAction::DeleteSuccess { id }) => {
            print_json(&serde_json::json!({ "deleted": id }))
        }
        _ => Ok(()),
    }
}

async fn search_categories(
    client: Arc<RestClient>,
    config: &Config,
    query: String,
) -> anyhow::Result<()> {
    let search = LatestOnly::new(CategorySearch::new(client), config.search.debounce());
    let mut state = search.subscribe();
    search.input(query);

    let done = state
        .wait_for(|s| !s.pending)
        .await
        .context("category search stopped")?
        .clone();
    if let Some(error) = done.error {
        bail!("{error}");
    }
    print_json(&done.result.unwrap_or_default())
}

fn parse_key<E>(raw: &str) -> anyhow::Result<E::Key>
where
    E: Entity,
    E::Key: FromStr,
    <E::Key as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<E::Key>()
        .with_context(|| format!("invalid {} id '{}'", E::KIND, raw))
}

fn parse_draft<E: Entity>(raw: &str) -> anyhow::Result<E::Draft> {
    let text = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload file '{path}'"))?,
        None => raw.to_string(),
    };
    serde_json::from_str(&text).with_context(|| format!("invalid {} payload", E::KIND))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
