use std::path::PathBuf;

use clap::{Parser, Subcommand};
use trivia_api::db::{establish_connection, run_migrations, transfer};
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Database url, e.g. sqlite:trivia.db
    #[clap(env = "TRIVIA_DATABASE__URL")]
    database_url: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import categories.csv and questions.csv from a directory
    Import { path: PathBuf },
    /// Export categories.csv and questions.csv into a directory
    Export { path: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();
    let pool = establish_connection(&cli.database_url).await?;
    run_migrations(&pool).await?;
    match cli.command {
        Commands::Export { path } => transfer::export_data(&pool, &path).await?,
        Commands::Import { path } => transfer::import_data(&pool, &path).await?,
    }
    pool.close().await;
    Ok(())
}
