use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

pub const DEFAULT_PACKAGE_LIMIT: i64 = 50;
pub const MAX_PACKAGE_LIMIT: i64 = 200;

fn default_package_limit() -> i64 {
    DEFAULT_PACKAGE_LIMIT
}

/// A Python package someone asked to have installed in the Open WebUI runtime.
/// Timestamps are rendered in KST by the query.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Package {
    pub id: i32,
    pub package_name: String,
    pub added_by: String,
    pub added_at: NaiveDateTime,
    pub status: String,
    pub status_note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PackageCreate {
    #[validate(length(min = 1, max = 255))]
    pub package_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PackageStatusUpdate {
    pub status: String,
    pub status_note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageStatus {
    Pending,
    Installed,
    Rejected,
    Uninstalled,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::Pending => "pending",
            PackageStatus::Installed => "installed",
            PackageStatus::Rejected => "rejected",
            PackageStatus::Uninstalled => "uninstalled",
        }
    }
}

impl FromStr for PackageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PackageStatus::Pending),
            "installed" => Ok(PackageStatus::Installed),
            "rejected" => Ok(PackageStatus::Rejected),
            "uninstalled" => Ok(PackageStatus::Uninstalled),
            _ => Err("Status must be pending, installed, rejected, or uninstalled".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: i32,
    pub package_id: Option<i32>,
    pub package_name: String,
    pub action: String,
    pub performed_by: String,
    pub detail: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct PackageListQuery {
    #[serde(default)]
    #[validate(range(min = 0))]
    pub offset: i64,
    #[serde(default = "default_package_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: i64,
}

/// Normalizes a requested package spec (`numpy>=1.26`, `uvicorn[standard]`).
/// Returns `None` when the requirement is empty or contains characters pip would
/// not accept in a requirement line.
pub fn normalize_package_spec(raw: &str) -> Option<String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    let allowed = |c: char| {
        c.is_ascii_alphanumeric()
            || matches!(c, '.' | '_' | '-' | '[' | ']' | '>' | '=' | '<' | '!' | ',' | ' ')
    };
    if name.chars().all(allowed) {
        Some(name)
    } else {
        None
    }
}
