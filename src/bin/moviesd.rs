use std::sync::Arc;
use std::env;
use anyhow::anyhow;
use clap::Parser;
use env_logger::Env;
use log::info;
use movies_store::config::AccessConfig;
use movies_store::engine::{MemStore, Persistence};
use movies_store::server::Router;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on; falls back to $PORT.
    #[arg(short, long)]
    port: Option<String>,

    /// JSON file holding the referer allow-list.
    #[arg(short, long, default_value = ".config")]
    config: String,

    /// Movie database file, read at startup and written at shutdown.
    #[arg(short, long, default_value = "./db.json")]
    db: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let port = args.port
        .or_else(|| env::var("PORT").ok())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow!("$PORT must be set"))?;

    let access = AccessConfig::load(&args.config);

    let persistence = Persistence::new(&args.db);
    let movies = persistence.load()
        .map_err(|e| anyhow!("failed to load movie database {}: {}", args.db, e))?;
    info!("Loaded {} movies from {}", movies.len(), args.db);
    let store = Arc::new(MemStore::new(movies));

    let router = Router::new(store, access);
    router.listen(&port, &persistence).await?;

    Ok(())
}
