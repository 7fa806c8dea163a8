use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::domain::ticket::{Ticket, TicketDraft, TicketRecord};
use crate::error::{AppError, AppResult};
use crate::infra::http::HttpClient;
use crate::services::TicketRepository;

const TICKETS_PATH: &str = "tickets";

pub struct TicketsApi {
    client: HttpClient,
}

impl TicketsApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    fn ticket_path(id: &str) -> AppResult<String> {
        let id = id.trim();
        let reserved = |c: char| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace();
        if id.is_empty() || id.contains(reserved) {
            return Err(AppError::Validation(format!("'{id}' is not a ticket id")));
        }
        Ok(format!("{TICKETS_PATH}/{id}"))
    }
}

#[async_trait]
impl TicketRepository for TicketsApi {
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>> {
        let payload: TicketListResponse = self.client.get(TICKETS_PATH).await?;
        let records = payload.tickets.unwrap_or_default();

        if let Some(count) = payload.count {
            if count != records.len() {
                warn!(
                    count,
                    received = records.len(),
                    "ticket count disagrees with returned tickets"
                );
            }
        }

        let tickets = records
            .into_iter()
            .map(Ticket::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        debug!(count = tickets.len(), "listed tickets");
        Ok(tickets)
    }

    async fn create_ticket(&self, draft: &TicketDraft) -> AppResult<Ticket> {
        let record: TicketRecord = self.client.post(TICKETS_PATH, draft).await?;
        let ticket = Ticket::try_from(record)?;
        info!(id = %ticket.id, title = %ticket.title, "created ticket");
        Ok(ticket)
    }

    async fn get_ticket(&self, id: &str) -> AppResult<Ticket> {
        let path = Self::ticket_path(id)?;
        let record: TicketRecord = match self.client.get(&path).await {
            Ok(record) => record,
            Err(err) if err.status() == Some(404) => {
                return Err(AppError::NotFound(id.trim().to_string()));
            }
            Err(err) => return Err(err),
        };
        Ticket::try_from(record)
    }
}

/// The backend sends `null` rather than `[]` when it has no tickets.
#[derive(Deserialize)]
struct TicketListResponse {
    #[serde(default)]
    count: Option<usize>,
    #[serde(default)]
    tickets: Option<Vec<TicketRecord>>,
}
