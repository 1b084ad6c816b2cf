use clap::Parser;
use zip_shelf::utils::{logger, validation::Validate};
use zip_shelf::{CliConfig, Server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_server_logger(cli.verbose);
    }

    tracing::info!("Starting zip-shelf");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let server = Server::new(config)?;
    if let Err(e) = server.run().await {
        tracing::error!("Server failed: {} (category: {:?})", e, e.category());
        eprintln!("❌ {}", e);
        std::process::exit(2);
    }

    Ok(())
}
