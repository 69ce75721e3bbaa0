// Loot feed dashboard CLI

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::warn;

use dashboard_client::metadata::DEFAULT_METADATA_URL;
use dashboard_client::render::{render_dashboard, render_detail};
use dashboard_client::state::PAGE_SIZE;
use dashboard_client::{
    spawn_feed, CategoryFilter, DashboardState, FeedConfig, FeedQuery, FeedUpdate,
    ItemMetadataClient, LootApiClient,
};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser)]
#[command(name = "lootfeed-dashboard")]
#[command(about = "Live terminal view of the loot feed")]
#[command(version)]
pub struct Cli {
    /// Loot feed API base URL
    #[arg(long, env = "LOOTFEED_API_URL", default_value = "http://127.0.0.1:3000")]
    pub api_url: String,

    /// Item metadata API base URL
    #[arg(long, env = "LOOTFEED_METADATA_URL", default_value = DEFAULT_METADATA_URL)]
    pub metadata_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Follow the feed live
    Watch {
        /// all, unique, set, rare, magic or rune
        #[arg(long, short, default_value = "all")]
        category: CategoryFilter,

        /// Only this character
        #[arg(long)]
        character: Option<String>,

        /// Poll interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,

        /// Also subscribe to the push stream
        #[arg(long)]
        push: bool,

        /// Pages of entries to show
        #[arg(long, default_value = "1")]
        pages: usize,
    },

    /// Fetch and render once
    List {
        #[arg(long, short, default_value = "all")]
        category: CategoryFilter,

        #[arg(long)]
        character: Option<String>,

        /// Entries to request (1-100)
        #[arg(long, default_value = "50")]
        limit: usize,

        /// Print the raw page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one entry with item metadata
    Show {
        /// Entry id
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let timeout = Duration::from_secs(cli.timeout.max(1));
    let client = LootApiClient::new(&cli.api_url, timeout)?;

    match cli.command {
        Commands::Watch {
            category,
            character,
            interval,
            push,
            pages,
        } => {
            let query = FeedQuery {
                category,
                character,
                ..Default::default()
            };
            let config = FeedConfig {
                poll_interval: Duration::from_secs(interval.max(1)),
                push,
                ..Default::default()
            };
            watch(Arc::new(client), query, config, pages).await
        }
        Commands::List {
            category,
            character,
            limit,
            json,
        } => {
            let query = FeedQuery {
                limit,
                category,
                character,
            };
            let page = client.fetch_page(&query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&page)?);
                return Ok(());
            }
            let mut state = DashboardState::new(limit.max(PAGE_SIZE));
            state.set_category(category);
            state.set_character(query.character.clone());
            state.replace(page, Utc::now());
            print!("{}", render_dashboard(&state));
            Ok(())
        }
        Commands::Show { id } => {
            let metadata = ItemMetadataClient::new(&cli.metadata_url, timeout)?;
            show(&client, &metadata, &id).await
        }
    }
}

async fn watch(
    client: Arc<LootApiClient>,
    query: FeedQuery,
    config: FeedConfig,
    pages: usize,
) -> Result<()> {
    let mut state = DashboardState::default();
    state.set_category(query.category);
    state.set_character(query.character.clone());
    state.show_pages(pages);
    let (_tasks, mut updates) = spawn_feed(client, query, config);

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update {
                    FeedUpdate::Replace(page) => state.replace(page, Utc::now()),
                    FeedUpdate::Append(entry) => {
                        state.append(entry);
                    }
                }
                let mut stdout = std::io::stdout().lock();
                write!(stdout, "{}{}", CLEAR_SCREEN, render_dashboard(&state))?;
                stdout.flush()?;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn show(
    client: &LootApiClient,
    metadata: &ItemMetadataClient,
    id: &str,
) -> Result<()> {
    let entry = client.find_entry(id).await?;
    let mut state = DashboardState::default();
    state.replace(
        backend_domain::LootPage {
            logs: vec![entry],
            totals: Default::default(),
        },
        Utc::now(),
    );
    let Some(selected) = state.select(id) else {
        anyhow::bail!("entry {} not found", id);
    };

    let details = match metadata.lookup(&selected).await {
        Ok(details) => details,
        Err(err) => {
            warn!("item metadata lookup failed: {}", err);
            None
        }
    };
    state.set_details(id, details);
    print!("{}", render_detail(state.modal(), metadata.base_url()));
    Ok(())
}
