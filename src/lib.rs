pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod session;
pub mod terminal;

use cli::{ Args, Command };
use config::{ RelayConfig, SessionConfig };
use log::info;
use relay::RelayService;
use server::Server;
use std::error::Error;
use std::sync::Arc;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match args.command {
        Command::Serve(serve_args) => {
            let config = RelayConfig::from_args(&serve_args)?;

            info!("--- Relay Configuration ---");
            info!("Bind Host: {}", config.bind_host);
            info!("Port: {}", config.port);
            info!("Provider URL: {}", config.provider_url);
            info!("Default Model: {}", config.default_model);
            info!("Allowed Origin: {}", config.allowed_origin.as_deref().unwrap_or("*"));
            info!("Provider Timeout: {:?}", config.request_timeout);
            if config.api_key.is_empty() {
                info!("Provider API Key: <unset>");
            } else {
                info!("Provider API Key: <redacted>");
            }
            info!("---------------------------");

            let relay = Arc::new(RelayService::from_config(&config)?);
            let server = Server::new(config, relay);
            server.run().await?;
        }
        Command::Chat(chat_args) => {
            let config = SessionConfig::from_args(&chat_args)?;
            terminal::run_chat(config).await?;
        }
    }

    Ok(())
}
