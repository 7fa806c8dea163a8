use std::sync::Arc;

use tracing::debug;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::infra::http::HttpClient;
use crate::infra::tickets_api::TicketsApi;
use crate::services::TicketRepository;
use crate::workflow::queries::TicketQueries;

/// Everything a command needs for one session; the query cache lives and dies with it.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub queries: Arc<TicketQueries>,
}

impl AppContext {
    pub fn new(config: AppConfig, repository: Arc<dyn TicketRepository>) -> Self {
        Self {
            config,
            queries: Arc::new(TicketQueries::new(repository)),
        }
    }

    pub fn connect(config: AppConfig) -> AppResult<Self> {
        let client = HttpClient::new(config.api_base_url.clone(), config.request_timeout)?;
        debug!(api = client.base_url(), timeout = ?config.request_timeout, "using ticket service");
        let repository: Arc<dyn TicketRepository> = Arc::new(TicketsApi::new(client));
        Ok(Self::new(config, repository))
    }
}
