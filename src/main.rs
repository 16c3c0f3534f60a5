mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use fetchzip::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Server(args) => {
            let mut config = match args.config {
                Some(path) => {
                    let _ = dotenvy::dotenv();
                    Config::load_from_path(path)?
                }
                None => Config::load()?,
            };

            if let Some(address) = args.address {
                config.server.bind_addr = address;
            }

            fetchzip::observability::init_tracing(&config.telemetry);
            fetchzip::api::run(config).await?
        }
    }

    Ok(())
}
