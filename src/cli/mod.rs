use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::keys::{KeyError, KeyStore, PgKeyStore};
use crate::config::AppConfig;
use crate::search::algolia::AlgoliaIndex;
use crate::search::SearchIndex;
use crate::services::resources::all_views;
use crate::{app, db, importer, state::AppState};

#[derive(Parser)]
#[command(name = "resources-api", about = "Learning resources catalog API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Apply pending database migrations
    Migrate,
    /// Bulk-load resources from a YAML seed file
    Import {
        #[arg(long, default_value = "resources.yml")]
        file: PathBuf,
    },
    /// Push every resource to the search index
    Reindex,
    /// Manage API keys
    Apikey {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Deny a key, by token or email
    Deny { identifier: String },
    /// Reactivate a denied key, by token or email
    Reactivate { identifier: String },
    /// Replace a key's token, by token or email
    Rotate { identifier: String },
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();

    match cli.command {
        Command::Serve { port } => serve(config, port).await,
        Command::Migrate => {
            let pool = db::connect(&config.database).await?;
            db::run_migrations(&pool).await?;
            println!("Migrations applied.");
            Ok(())
        }
        Command::Import { file } => {
            let pool = db::connect(&config.database).await?;
            db::run_migrations(&pool).await?;
            let summary = importer::import_file(&pool, &file).await?;
            println!(
                "Imported: {} created, {} updated, {} unchanged, {} failed",
                summary.created, summary.updated, summary.unchanged, summary.failed
            );
            Ok(())
        }
        Command::Reindex => reindex(config).await,
        Command::Apikey { action } => apikey(config, action).await,
    }
}

async fn serve(config: AppConfig, port: u16) -> anyhow::Result<()> {
    let pool = db::connect(&config.database).await?;
    db::run_migrations(&pool).await?;

    let state = AppState::with_pool(config, pool)?;
    let router = app::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Re-pushes every resource to the index in batches.
async fn reindex(config: AppConfig) -> anyhow::Result<()> {
    let pool = db::connect(&config.database).await?;
    let index = AlgoliaIndex::new(&config.search)?;

    let views = all_views(&pool).await?;
    let total = views.len();
    for chunk in views.chunks(500) {
        let documents: Vec<_> = chunk.iter().map(|view| view.to_index_object()).collect();
        index.save_objects(&documents).await?;
    }
    println!("Reindexed {total} resources.");
    Ok(())
}

async fn apikey(config: AppConfig, action: KeyAction) -> anyhow::Result<()> {
    let pool = db::connect(&config.database).await?;
    let keys = Arc::new(PgKeyStore::new(pool));

    let outcome = match action {
        KeyAction::Deny { identifier } => keys
            .set_denied(&identifier, true)
            .await
            .map(|key| format!("Denied key for {}", key.email)),
        KeyAction::Reactivate { identifier } => keys
            .set_denied(&identifier, false)
            .await
            .map(|key| format!("Reactivated key for {}", key.email)),
        KeyAction::Rotate { identifier } => {
            let found = keys
                .find(&identifier)
                .await?
                .or(keys.find_by_email(&identifier).await?);
            match found {
                Some(key) => keys
                    .rotate(&key)
                    .await
                    .map(|rotated| format!("Rotated key for {}: {}", rotated.email, rotated.apikey)),
                None => Err(KeyError::NotFound),
            }
        }
    };

    match outcome {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(KeyError::NotFound) => {
            eprintln!("Could not find a key matching that token or email.");
            std::process::exit(1);
        }
        Err(KeyError::AlreadyInState) => {
            eprintln!("The key is already in the requested state.");
            std::process::exit(1);
        }
        Err(KeyError::Database(err)) => Err(err.into()),
    }
}
