use std::process::ExitCode;

use clap::{Parser, Subcommand};

use confgate::client::{ConfigurationClient, NodeEndpoint};

#[derive(Parser)]
#[command(name = "confgate-cli")]
#[command(about = "Management CLI for confgate nodes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or change node configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the node's whole configuration as JSON
    Get {
        /// Node REST endpoint as host:port
        #[arg(long)]
        node_endpoint: String,
    },
    /// Apply a HOCON configuration change to the node
    Set {
        /// Node REST endpoint as host:port
        #[arg(long)]
        node_endpoint: String,

        /// Configuration change in HOCON
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<String, Box<dyn std::error::Error>> {
    let Commands::Config(command) = command;
    match command {
        ConfigCommand::Get { node_endpoint } => {
            // Endpoint errors surface before any network call.
            let endpoint: NodeEndpoint = node_endpoint.parse()?;
            Ok(ConfigurationClient::new()?.get(&endpoint).await?)
        }
        ConfigCommand::Set { node_endpoint, config } => {
            let endpoint: NodeEndpoint = node_endpoint.parse()?;
            Ok(ConfigurationClient::new()?.set(&endpoint, &config).await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_endpoint_is_required() {
        assert!(Cli::try_parse_from(["confgate-cli", "config", "get"]).is_err());
        assert!(Cli::try_parse_from(["confgate-cli", "config", "set", "rest.port = 9090"]).is_err());
    }

    #[test]
    fn test_parse_set() {
        let cli = Cli::try_parse_from([
            "confgate-cli",
            "config",
            "set",
            "--node-endpoint",
            "localhost:10300",
            "rest.port = 9090",
        ])
        .unwrap();
        let Commands::Config(ConfigCommand::Set { node_endpoint, config }) = cli.command else {
            panic!("expected config set");
        };
        assert_eq!(node_endpoint, "localhost:10300");
        assert_eq!(config, "rest.port = 9090");
    }
}
