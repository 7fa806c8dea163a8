use std::sync::Arc;

use tracing::{info, warn};

use crate::cache::QueryCache;
use crate::domain::query::{QueryKey, QueryState};
use crate::domain::ticket::{Ticket, TicketDraft};
use crate::error::AppResult;
use crate::services::TicketRepository;

pub const TICKETS_KEY: QueryKey = QueryKey::new("tickets");

pub type TicketList = Arc<Vec<Ticket>>;

/// Outcome of a mutation: the created ticket, or why the backend refused it.
pub type MutationResult = AppResult<Ticket>;

/// Cached, observable access to tickets for the front end.
pub struct TicketQueries {
    repository: Arc<dyn TicketRepository>,
    cache: QueryCache<TicketList>,
}

impl TicketQueries {
    pub fn new(repository: Arc<dyn TicketRepository>) -> Self {
        Self::with_cache(repository, QueryCache::new())
    }

    pub fn with_cache(repository: Arc<dyn TicketRepository>, cache: QueryCache<TicketList>) -> Self {
        Self { repository, cache }
    }

    /// The ticket list, served from cache unless it was invalidated.
    pub async fn tickets(&self) -> QueryState<TicketList> {
        let repository = Arc::clone(&self.repository);
        self.cache
            .fetch(TICKETS_KEY, || async move {
                repository.list_tickets().await.map(Arc::new)
            })
            .await
    }

    pub async fn refetch(&self) -> QueryState<TicketList> {
        self.cache.invalidate(TICKETS_KEY).await;
        self.tickets().await
    }

    pub async fn snapshot(&self) -> QueryState<TicketList> {
        self.cache.state(TICKETS_KEY).await
    }

    /// Submits `draft`. Success invalidates the ticket list; failure leaves the cache alone.
    pub async fn create_ticket(&self, draft: &TicketDraft) -> MutationResult {
        match self.repository.create_ticket(draft).await {
            Ok(ticket) => {
                self.cache.invalidate(TICKETS_KEY).await;
                info!(id = %ticket.id, "ticket list invalidated after create");
                Ok(ticket)
            }
            Err(err) => {
                warn!(
                    error = %err,
                    rejected = err.is_validation(),
                    title = %draft.title,
                    "ticket creation failed"
                );
                Err(err)
            }
        }
    }

    pub async fn ticket(&self, id: &str) -> AppResult<Ticket> {
        self.repository.get_ticket(id).await
    }
}
