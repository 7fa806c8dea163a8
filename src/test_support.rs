use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::domain::ticket::{Category, Priority, Site, Status, Ticket};

pub const CREATED_AT: &str = "2025-01-10T09:00:00Z";

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    format!("http://{addr}/api/v1")
}

pub fn timestamp() -> DateTime<Utc> {
    CREATED_AT.parse().expect("timestamp")
}

pub fn ticket(id: &str, title: &str) -> Ticket {
    Ticket {
        id: id.to_string(),
        title: title.to_string(),
        description: format!("{title} details"),
        site: Site::Salinas,
        category: Category::Hardware,
        assigned_to: None,
        created_by: "a@x.org".to_string(),
        priority: Priority::Medium,
        status: Status::Open,
        created_on: timestamp(),
        updated_at: timestamp(),
    }
}

/// In-memory stand-in for the ticket service's `/tickets` routes.
#[derive(Clone, Default)]
pub struct StubBackend {
    state: Arc<StubState>,
}

#[derive(Default)]
struct StubState {
    tickets: Mutex<Vec<Value>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl StubBackend {
    pub fn with_tickets(tickets: Vec<Value>) -> Self {
        let backend = Self::default();
        *backend.state.tickets.lock().unwrap() = tickets;
        backend
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.state.create_calls.load(Ordering::SeqCst)
    }

    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/v1/tickets", get(list_tickets).post(create_ticket))
            .route("/api/v1/tickets/:id", get(get_ticket))
            .with_state(self.state.clone());
        serve(app).await
    }
}

async fn list_tickets(State(state): State<Arc<StubState>>) -> Json<Value> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let tickets = state.tickets.lock().unwrap().clone();
    Json(json!({ "count": tickets.len(), "tickets": tickets }))
}

async fn create_ticket(State(state): State<Arc<StubState>>, Json(mut draft): Json<Value>) -> Response {
    state.create_calls.fetch_add(1, Ordering::SeqCst);
    let has_title = draft["title"].as_str().is_some_and(|title| !title.trim().is_empty());
    if !has_title {
        return (StatusCode::BAD_REQUEST, "bad request: title is required").into_response();
    }

    let mut tickets = state.tickets.lock().unwrap();
    draft["id"] = json!(format!("{:024x}", tickets.len() + 1));
    draft["createdOn"] = json!(CREATED_AT);
    draft["updatedAt"] = json!(CREATED_AT);
    tickets.push(draft.clone());
    (StatusCode::CREATED, Json(draft)).into_response()
}

async fn get_ticket(State(state): State<Arc<StubState>>, Path(id): Path<String>) -> Response {
    let tickets = state.tickets.lock().unwrap();
    match tickets.iter().find(|ticket| ticket["id"] == id.as_str()) {
        Some(ticket) => Json(ticket.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "ticket not found").into_response(),
    }
}
