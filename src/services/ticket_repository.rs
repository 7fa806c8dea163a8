use async_trait::async_trait;

use crate::domain::ticket::{Ticket, TicketDraft};
use crate::error::AppResult;

/// Backend operations on tickets. Each call is a single round trip with no retries.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    /// All tickets, in the order the backend returned them.
    async fn list_tickets(&self) -> AppResult<Vec<Ticket>>;
    async fn create_ticket(&self, draft: &TicketDraft) -> AppResult<Ticket>;
    async fn get_ticket(&self, id: &str) -> AppResult<Ticket>;
}
