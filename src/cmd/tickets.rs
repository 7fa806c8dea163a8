use std::fmt::Display;
use std::path::Path;

use clap::Args;
use tracing::warn;

use crate::context::AppContext;
use crate::domain::query::QueryState;
use crate::domain::ticket::{Category, Priority, Site, Status, Ticket, TicketDraft};
use crate::error::{AppError, AppResult};
use crate::stash::DraftStash;
use crate::view::{render_table, render_ticket};

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Ignore the cached list and fetch it again.
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// Ticket id as assigned by the backend.
    pub id: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct CreateArgs {
    #[arg(long, required_unless_present = "resume")]
    pub title: Option<String>,
    #[arg(long, required_unless_present = "resume")]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_site)]
    pub site: Option<Site>,
    #[arg(long, value_parser = parse_category)]
    pub category: Option<Category>,
    /// 1 (lowest) to 5 (highest).
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<Status>,
    #[arg(long)]
    pub assigned_to: Option<String>,
    /// Defaults to the configured user.
    #[arg(long)]
    pub created_by: Option<String>,
    /// Resubmit the draft left behind by the last failed create.
    #[arg(long, conflicts_with_all = ["title", "description", "site", "category", "priority", "status", "assigned_to", "created_by"])]
    pub resume: bool,
}

impl CreateArgs {
    pub fn into_draft(self, default_creator: &str) -> TicketDraft {
        let created_by = self
            .created_by
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| default_creator.to_string());
        let mut draft = TicketDraft::new(
            self.title.unwrap_or_default(),
            self.description.unwrap_or_default(),
            created_by,
        );
        if let Some(site) = self.site {
            draft.site = site;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        draft.assigned_to = self.assigned_to.filter(|value| !value.trim().is_empty());
        draft
    }
}

pub async fn list(ctx: &AppContext, args: ListArgs, color: bool) -> AppResult<()> {
    let state = if args.refresh {
        ctx.queries.refetch().await
    } else {
        ctx.queries.tickets().await
    };

    match state {
        QueryState::Data(tickets) => {
            println!("{}", render_table(&tickets, color));
            Ok(())
        }
        QueryState::Error(err) => {
            eprintln!("Failed to load tickets.");
            Err((*err).clone())
        }
        QueryState::Pending => {
            println!("Loading tickets...");
            Ok(())
        }
    }
}

pub async fn view(ctx: &AppContext, args: ViewArgs, color: bool) -> AppResult<()> {
    let ticket = ctx.queries.ticket(&args.id).await?;
    println!("{}", render_ticket(&ticket, color));
    Ok(())
}

pub async fn create(ctx: &AppContext, args: CreateArgs, color: bool) -> AppResult<()> {
    create_with_stash(ctx, args, color, &DraftStash::default_path()?).await
}

async fn create_with_stash(
    ctx: &AppContext,
    args: CreateArgs,
    color: bool,
    stash_path: &Path,
) -> AppResult<()> {
    let (draft, mut stash) = if args.resume {
        let stash = DraftStash::load_from(stash_path)?;
        let draft = stash
            .draft()
            .cloned()
            .ok_or_else(|| AppError::Configuration("no failed draft to resume".to_string()))?;
        if let Some(reason) = stash.last_error() {
            eprintln!("Resubmitting draft '{}' (last attempt: {reason})", draft.title);
        }
        (draft, stash)
    } else {
        let draft = args.into_draft(&ctx.config.default_creator);
        (draft, DraftStash::load_or_empty(stash_path))
    };

    let ticket = submit(ctx, &draft, &mut stash).await?;
    println!("Ticket {} created.", ticket.id);
    println!("{}", render_ticket(&ticket, color));
    Ok(())
}

/// Creates the ticket; a failed attempt keeps the draft in `stash` for `--resume`.
pub async fn submit(ctx: &AppContext, draft: &TicketDraft, stash: &mut DraftStash) -> AppResult<Ticket> {
    match ctx.queries.create_ticket(draft).await {
        Ok(ticket) => {
            stash.clear();
            if let Err(err) = stash.save() {
                warn!(error = %err, "could not clear draft stash");
            }
            Ok(ticket)
        }
        Err(err) => {
            stash.keep(draft, &err);
            if let Err(save_err) = stash.save() {
                warn!(error = %save_err, "could not stash failed draft");
            } else {
                eprintln!("Draft saved; rerun with `nestqueue create --resume` to try again.");
            }
            Err(err)
        }
    }
}

fn one_of<T: Display>(values: &[T]) -> String {
    let names: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("expected one of: {}", names.join(", "))
}

fn parse_site(value: &str) -> Result<Site, String> {
    Site::from_str(value).ok_or_else(|| one_of(&Site::ALL))
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::from_str(value).ok_or_else(|| one_of(&Category::ALL))
}

fn parse_priority(value: &str) -> Result<Priority, String> {
    Priority::from_str(value).ok_or_else(|| one_of(&Priority::ALL))
}

fn parse_status(value: &str) -> Result<Status, String> {
    Status::from_str(value).ok_or_else(|| one_of(&Status::ALL))
}
