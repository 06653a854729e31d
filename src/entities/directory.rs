//! Directory records - employees and the organizations they act for

use chrono::{DateTime, Utc};
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Legal form of an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrganizationType {
    #[serde(rename = "IE")]
    Ie,
    #[default]
    #[serde(rename = "LLC")]
    Llc,
    #[serde(rename = "JSC")]
    Jsc,
}

impl std::fmt::Display for OrganizationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrganizationType::Ie => write!(f, "IE"),
            OrganizationType::Llc => write!(f, "LLC"),
            OrganizationType::Jsc => write!(f, "JSC"),
        }
    }
}

impl std::str::FromStr for OrganizationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IE" => Ok(OrganizationType::Ie),
            "LLC" => Ok(OrganizationType::Llc),
            "JSC" => Ok(OrganizationType::Jsc),
            _ => Err(format!("Unknown organization type: {}", s)),
        }
    }
}

/// A person who can act in the system under a username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl Employee {
    pub(crate) const COLUMNS: &'static str = "id, username, first_name, last_name, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            username: row.get(1)?,
            first_name: row.get(2)?,
            last_name: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

/// An organization that owns tenders and may author bids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub org_type: OrganizationType,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    pub(crate) const COLUMNS: &'static str = "id, name, description, type, created_at";

    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            org_type: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
