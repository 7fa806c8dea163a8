use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

use crate::domain::ticket::{Status, Ticket, UNASSIGNED};

const HEADERS: [&str; 6] = [
    "Priority",
    "Category",
    "Title",
    "Assigned To",
    "Status",
    "Last Modified",
];
const TITLE_WIDTH: usize = 40;
const STATUS_COLUMN: usize = 4;

pub fn format_date(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%a %b %d %Y").to_string()
}

fn paint_status(text: &str, status: Status) -> ColoredString {
    match status {
        Status::Open => text.green(),
        Status::Active => text.blue(),
        Status::Closed => text.red(),
        Status::Rejected => text.purple(),
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Renders the ticket list as an aligned table, one row per ticket in list order.
pub fn render_table(tickets: &[Ticket], color: bool) -> String {
    if tickets.is_empty() {
        return "No tickets.".to_string();
    }

    let rows: Vec<[String; 6]> = tickets
        .iter()
        .map(|ticket| {
            [
                ticket.priority.to_string(),
                ticket.category.to_string(),
                truncate(ticket.title.trim(), TITLE_WIDTH),
                ticket.assignee().to_string(),
                ticket.status.to_string(),
                format_date(&ticket.updated_at),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(join_cells(HEADERS.iter().map(|h| h.to_string()), &widths));
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );

    for (row, ticket) in rows.into_iter().zip(tickets) {
        let cells = row.into_iter().enumerate().map(|(column, cell)| {
            let padded = format!("{cell:<width$}", width = widths[column]);
            if color && column == STATUS_COLUMN {
                paint_status(&padded, ticket.status).to_string()
            } else {
                padded
            }
        });
        lines.push(cells.collect::<Vec<_>>().join("  ").trim_end().to_string());
    }

    lines.join("\n")
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn render_ticket(ticket: &Ticket, color: bool) -> String {
    let title = if color {
        ticket.title.bold().to_string()
    } else {
        ticket.title.clone()
    };
    let status = if color {
        paint_status(ticket.status.as_str(), ticket.status).to_string()
    } else {
        ticket.status.to_string()
    };
    let assignment = if ticket.is_assigned() {
        format!("Assigned to {}", ticket.assignee())
    } else {
        UNASSIGNED.to_string()
    };

    [
        format!("{title}  [{}]", ticket.id),
        format!("Status: {status}"),
        format!("Priority: {}", ticket.priority),
        format!("Category: {}", ticket.category),
        format!("Site: {}", ticket.site),
        assignment,
        format!("Created by {}", ticket.created_by),
        format!("Created on {}", format_date(&ticket.created_on)),
        format!("Last modified on {}", format_date(&ticket.updated_at)),
        String::new(),
        ticket.description.trim().to_string(),
    ]
    .join("\n")
}
