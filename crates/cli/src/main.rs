use anyhow::Context;
use blockbridge_accounts::{NotificationRepository, SessionGuard, UserRepository};
use blockbridge_core::ConfigLoader;
use blockbridge_store::{BinStoreClient, DocumentStore};
use blockbridge_web_api::{ApiServer, AppState};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "blockbridge")]
#[command(about = "Account and ledger service for the BlockBridge trading platform", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web API server
    Server {
        /// Server address (defaults to host:port from config)
        #[arg(short, long)]
        addr: Option<String>,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Provision the admin account out-of-band
    ///
    /// The admin password is read from BLOCKBRIDGE_ADMIN_PASSWORD so it never
    /// appears in shell history or source.
    SeedAdmin {
        /// Admin login email
        #[arg(long)]
        email: String,
        /// Admin display name
        #[arg(long)]
        username: Option<String>,
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Server { addr, config } => {
            let config = ConfigLoader::load_from(&config)?;
            let addr = addr
                .unwrap_or_else(|| format!("{}:{}", config.server.host, config.server.port));

            let store = Arc::new(BinStoreClient::new(config.store.clone())?);
            let state = Arc::new(AppState::new(store, &config.auth));

            tracing::info!("Starting BlockBridge API");
            ApiServer::new(state).serve(&addr).await
        }
        Commands::SeedAdmin {
            email,
            username,
            config,
        } => {
            let config = ConfigLoader::load_from(&config)?;
            let password = std::env::var("BLOCKBRIDGE_ADMIN_PASSWORD")
                .context("BLOCKBRIDGE_ADMIN_PASSWORD must be set")?;

            let store: Arc<dyn DocumentStore> =
                Arc::new(BinStoreClient::new(config.store.clone())?);
            let users = UserRepository::new(store.clone());
            let notifications = NotificationRepository::new(store);
            let guard = SessionGuard::new(users, notifications);

            let admin = guard.seed_admin(&email, username, &password).await?;
            println!("admin account ready: {} ({})", admin.email, admin.id);
            Ok(())
        }
    }
}
