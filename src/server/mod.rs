pub mod api;

use crate::config::RelayConfig;
use crate::relay::RelayService;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    config: RelayConfig,
    relay: Arc<RelayService>,
}

impl Server {
    pub fn new(config: RelayConfig, relay: Arc<RelayService>) -> Self {
        Self { config, relay }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        api::start_http_server(&self.config, self.relay.clone()).await
    }
}
