use movies_store::engine::{MemStore, Persistence};
use movies_store::{Movie, MovieFields, MovieReader, MovieWriter};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "./db.json")]
    db: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    List,
    Get { id: i64 },
    Add {
        title: String,
        rating: i64,
        #[arg(long, default_value_t = 0)]
        id: i64,
    },
    Update { id: i64, title: String, rating: i64 },
    Del { id: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let persistence = Persistence::new(&cli.db);
    let store = MemStore::new(persistence.load()?);

    match cli.command {
        Commands::List => {
            let movies = store.list().await?;
            println!("{}", serde_json::to_string_pretty(&movies)?);
            return Ok(());
        }
        Commands::Get { id } => {
            let movie = store.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&movie)?);
            return Ok(());
        }
        Commands::Add { title, rating, id } => {
            let movie = store.create(Movie { title, rating, id }).await?;
            println!("{}", serde_json::to_string_pretty(&movie)?);
        }
        Commands::Update { id, title, rating } => {
            store.update(id, MovieFields { title, rating }).await?;
            println!("OK");
        }
        Commands::Del { id } => {
            store.delete(id).await?;
            println!("OK");
        }
    }

    persistence.save(&store.list().await?)?;
    Ok(())
}
