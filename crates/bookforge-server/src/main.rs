use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use bookforge_db::{open_database, DbConfig};
use bookforge_genai::{build_cover_generator, build_text_generator, GenConfig, UnavailableText};
use bookforge_server::auth;
use bookforge_server::config::ServeArgs;
use bookforge_server::InnerAppState;
use bookforge_service::LocalService;
use bookforge_store::{create_store, StoreConfig};

#[derive(Parser)]
#[command(name = "bookforge-server", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new API key
    Keygen {
        /// Human-readable name for the key
        #[arg(long, default_value = "")]
        name: String,
    },
    /// List all API keys (metadata only, no secrets)
    ListKeys,
    /// Revoke (delete) an API key by ID
    RevokeKey {
        /// The API key ID to revoke
        id: String,
    },
    /// Start the HTTP server (the default)
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = open_database(&DbConfig::from_env()).await?;

    match cli.command {
        Some(Commands::Keygen { name }) => {
            let raw_key = auth::generate_api_key();
            let api_key = db.insert_api_key(&name, &auth::sha256_hex(&raw_key)).await?;
            eprintln!("Created API key (id: {})", api_key.id);
            if !name.is_empty() {
                eprintln!("  name: {name}");
            }
            println!("{raw_key}");
            eprintln!("\nSave this key. It cannot be retrieved again.");
        }
        Some(Commands::ListKeys) => {
            let keys = db.list_api_keys().await?;
            if keys.is_empty() {
                eprintln!("No API keys found.");
            } else {
                println!("{:<38} {:<20} {:<28} LAST USED", "ID", "NAME", "CREATED");
                for key in keys {
                    println!(
                        "{:<38} {:<20} {:<28} {}",
                        key.id,
                        if key.name.is_empty() { "-" } else { &key.name },
                        key.created_at.format("%Y-%m-%d %H:%M:%S"),
                        key.last_used_at
                            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                            .unwrap_or_else(|| "never".into()),
                    );
                }
            }
        }
        Some(Commands::RevokeKey { id }) => {
            db.delete_api_key(&id).await?;
            eprintln!("Revoked API key {id}");
        }
        Some(Commands::Serve) | None => {
            let args = cli.serve;
            let store = create_store(&StoreConfig::from_env())?;

            let gen_config = GenConfig::from_env()?;
            let text = match build_text_generator(&gen_config) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "text generation disabled");
                    Arc::new(UnavailableText::new(e.to_string()))
                }
            };
            let covers = build_cover_generator(&gen_config)?;

            let auth = auth::build_auth_config(db.clone(), args.api_key.as_deref()).await;
            if auth.is_some() {
                tracing::info!("authentication enabled");
            } else {
                tracing::warn!("authentication disabled (no BOOKFORGE_API_KEY or stored keys)");
            }

            let state = Arc::new(InnerAppState {
                service: LocalService::new(db, store, text, covers),
                auth,
            });

            let addr = args.addr();
            let listener = TcpListener::bind(addr).await?;
            tracing::info!(%addr, "bookforge-server listening");

            bookforge_server::serve(listener, state).await?;
        }
    }

    Ok(())
}
