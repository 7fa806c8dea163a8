use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

pub const UNASSIGNED: &str = "Unassigned";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Site {
    Salinas,
    Watsonville,
    #[serde(rename = "HQ")]
    Hq,
    Gilroy,
    Modesto,
    Stockton,
}

impl Site {
    pub const ALL: [Site; 6] = [
        Site::Salinas,
        Site::Watsonville,
        Site::Hq,
        Site::Gilroy,
        Site::Modesto,
        Site::Stockton,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::Salinas => "Salinas",
            Site::Watsonville => "Watsonville",
            Site::Hq => "HQ",
            Site::Gilroy => "Gilroy",
            Site::Modesto => "Modesto",
            Site::Stockton => "Stockton",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "salinas" => Some(Site::Salinas),
            "watsonville" => Some(Site::Watsonville),
            "hq" => Some(Site::Hq),
            "gilroy" => Some(Site::Gilroy),
            "modesto" => Some(Site::Modesto),
            "stockton" => Some(Site::Stockton),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Software,
    Hardware,
    Network,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Software, Category::Hardware, Category::Network];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Software => "Software",
            Category::Hardware => "Hardware",
            Category::Network => "Network",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "software" => Some(Category::Software),
            "hardware" => Some(Category::Hardware),
            "network" => Some(Category::Network),
            _ => None,
        }
    }
}

/// Urgency ordinal carried on the wire as a bare integer; 5 is the most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Lowest = 1,
    Low = 2,
    Medium = 3,
    High = 4,
    Highest = 5,
}

impl Priority {
    /// Highest first, the order the create form offers them in.
    pub const ALL: [Priority; 5] = [
        Priority::Highest,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Lowest,
    ];

    pub fn value(&self) -> u8 {
        *self as u8
    }

    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Priority::Lowest),
            2 => Some(Priority::Low),
            3 => Some(Priority::Medium),
            4 => Some(Priority::High),
            5 => Some(Priority::Highest),
            _ => None,
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        value
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(Self::from_value)
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.value()
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Priority::from_value(i64::from(value))
            .ok_or_else(|| format!("priority {value} is outside 1..=5"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Open,
    Active,
    Closed,
    Rejected,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Active, Status::Open, Status::Closed, Status::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "Open",
            Status::Active => "Active",
            Status::Closed => "Closed",
            Status::Rejected => "Rejected",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "open" => Some(Status::Open),
            "active" => Some(Status::Active),
            "closed" => Some(Status::Closed),
            "rejected" => Some(Status::Rejected),
            _ => None,
        }
    }
}

/// Exact wire names plus `Display`. `from_str` stays lenient for CLI input only.
macro_rules! wire_names {
    ($($ty:ty),*) => {
        $(impl $ty {
            pub fn from_wire(value: &str) -> Option<Self> {
                Self::ALL.into_iter().find(|known| known.as_str() == value)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

wire_names!(Site, Category, Status);

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub site: Site,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_by: String,
    pub priority: Priority,
    pub status: Status,
    pub created_on: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Name shown for the assignee; a missing assignee is never an error.
    pub fn assignee(&self) -> &str {
        self.assigned_to.as_deref().unwrap_or(UNASSIGNED)
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }
}

/// A ticket as the backend sends it, before any invariant has been checked.
/// Closed-set fields stay raw JSON so a wrong type is reported like a wrong value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRecord {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub site: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub priority: Value,
    #[serde(default)]
    pub status: Value,
    pub created_on: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<TicketRecord> for Ticket {
    type Error = AppError;

    fn try_from(record: TicketRecord) -> AppResult<Self> {
        let id = record.id;
        if id.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "ticket '{}' has an empty id",
                record.title
            )));
        }

        let site = record
            .site
            .as_str()
            .and_then(Site::from_wire)
            .ok_or_else(|| unknown(&id, "site", &record.site))?;
        let category = record
            .category
            .as_str()
            .and_then(Category::from_wire)
            .ok_or_else(|| unknown(&id, "category", &record.category))?;
        let priority = record
            .priority
            .as_i64()
            .and_then(Priority::from_value)
            .ok_or_else(|| unknown(&id, "priority", &record.priority))?;
        let status = record
            .status
            .as_str()
            .and_then(Status::from_wire)
            .ok_or_else(|| unknown(&id, "status", &record.status))?;

        if record.updated_at < record.created_on {
            return Err(AppError::Validation(format!(
                "ticket {id} was updated at {} before it was created on {}",
                record.updated_at, record.created_on
            )));
        }

        let assigned_to = record
            .assigned_to
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Ticket {
            id,
            title: record.title,
            description: record.description,
            site,
            category,
            assigned_to,
            created_by: record.created_by,
            priority,
            status,
            created_on: record.created_on,
            updated_at: record.updated_at,
        })
    }
}

fn unknown(id: &str, field: &str, value: &Value) -> AppError {
    match value {
        Value::Null => AppError::Validation(format!("ticket {id} has no {field}")),
        Value::String(text) => {
            AppError::Validation(format!("ticket {id} has unknown {field} '{text}'"))
        }
        other => AppError::Validation(format!("ticket {id} has unknown {field} {other}")),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub site: Site,
    pub category: Category,
    pub priority: Priority,
    pub status: Status,
    pub created_by: String,
    #[serde(default, skip_serializing_if = "is_unassigned")]
    pub assigned_to: Option<String>,
}

impl TicketDraft {
    /// Starts a draft with the same defaults the create form preselects.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            site: Site::Watsonville,
            category: Category::Software,
            priority: Priority::Highest,
            status: Status::Open,
            created_by: created_by.into(),
            assigned_to: None,
        }
    }
}

fn is_unassigned(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|name| name.trim().is_empty())
}
