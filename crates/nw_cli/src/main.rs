use clap::{Parser, Subcommand};
use tracing::info;

use nw_adapters::FetchManager;
use nw_api::{create_app, AppState};
use nw_core::{Result, SourceSeed};

#[derive(Parser, Debug)]
#[command(name = "newswire", version, about = "News aggregation service", long_about = None)]
struct Cli {
    /// Storage backend: sqlite or memory
    #[arg(long, default_value = "sqlite")]
    storage: String,
    #[arg(long, default_value = "newswire.db")]
    db_path: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: String,
    },
    /// Fetch articles from all external APIs and store them
    Fetch,
    /// Seed the source rows, reading API keys from the environment
    Seed,
    /// Generate an API token for a given user id
    Token { user_id: i64 },
    /// List seeded sources
    Sources,
}

fn source_seeds() -> Vec<SourceSeed> {
    vec![
        SourceSeed {
            name: "NewsAPI".to_string(),
            slug: "newsapi".to_string(),
            api_key: std::env::var("NEWSAPI_KEY").ok(),
            base_url: "https://newsapi.org/v2/".to_string(),
        },
        SourceSeed {
            name: "The Guardian".to_string(),
            slug: "guardian".to_string(),
            api_key: std::env::var("GUARDIAN_KEY").ok(),
            base_url: "https://content.guardianapis.com/".to_string(),
        },
        SourceSeed {
            name: "New York Times".to_string(),
            slug: "nyt".to_string(),
            api_key: std::env::var("NYT_KEY").ok(),
            base_url: "https://api.nytimes.com/svc/".to_string(),
        },
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let storage = nw_storage::create_storage(&cli.storage, Some(&cli.db_path)).await?;

    match cli.command {
        Commands::Serve { addr } => {
            let app = create_app(AppState::new(storage));
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Listening on {addr}");
            axum::serve(listener, app).await?;
        }
        Commands::Fetch => {
            info!("Fetching articles...");
            let manager = FetchManager::new(storage);
            for report in manager.run_batch().await {
                if report.ok() {
                    println!(
                        "{} articles fetched ({} records)",
                        report.source,
                        report.fetched.unwrap_or(0)
                    );
                } else {
                    eprintln!(
                        "Failed to fetch {} articles: {}",
                        report.source,
                        report.message.as_deref().unwrap_or("unknown error")
                    );
                }
            }
        }
        Commands::Seed => {
            let seeds = source_seeds();
            storage.seed_sources(&seeds).await?;
            println!("Seeded {} sources", seeds.len());
        }
        Commands::Token { user_id } => {
            let token = uuid::Uuid::new_v4().to_string();
            storage.create_token(user_id, &token).await?;
            println!("API token for user {user_id}:");
            println!("{token}");
        }
        Commands::Sources => {
            for source in storage.sources().await? {
                let last = source
                    .last_fetched_at
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!("{} ({}) last fetched: {last}", source.name, source.slug);
            }
        }
    }

    Ok(())
}
