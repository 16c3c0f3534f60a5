use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fetchzip")]
#[command(about = "Collects linked files per task and serves them as zip archives", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Server(ServerArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServerArgs {
    /// Address to bind the HTTP server to (overrides `server.bind_addr`)
    #[arg(long)]
    pub address: Option<SocketAddr>,

    /// Configuration file (defaults to `$FETCHZIP_CONFIG` or `config/fetchzip.toml`)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_args() {
        let cli = Cli::parse_from([
            "fetchzip",
            "server",
            "--address",
            "127.0.0.1:9000",
            "--config",
            "custom.toml",
        ]);

        let Commands::Server(args) = cli.command;
        assert_eq!(args.address, Some("127.0.0.1:9000".parse().unwrap()));
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_server_args_are_optional() {
        let cli = Cli::parse_from(["fetchzip", "server"]);

        let Commands::Server(args) = cli.command;
        assert!(args.address.is_none());
        assert!(args.config.is_none());
    }
}
