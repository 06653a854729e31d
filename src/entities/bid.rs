//! Bid entity type - an offer submitted against a published tender

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::core::entity::{
    check_text, AuthorType, BidStatus, Decision, Entity, DESCRIPTION_MAX_LEN, NAME_MAX_LEN,
};
use crate::core::error::{Result, TenderError};
use crate::core::identity::EntityPrefix;
use crate::core::store::versions::{non_empty, VersionFields, Versioned};

/// Current view of a bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: BidStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<Decision>,
    pub tender_id: String,
    pub author_type: AuthorType,
    /// Employee id for `User` bids, organization id for `Organization` bids
    pub author_id: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

/// Versioned bid fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidFields {
    pub name: String,
    pub description: String,
}

impl BidFields {
    pub fn validate(&self) -> Result<()> {
        check_text("name", &self.name, NAME_MAX_LEN, true)?;
        check_text("description", &self.description, DESCRIPTION_MAX_LEN, true)
    }
}

/// Edit request; `None` and empty strings keep the previous value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl BidPatch {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.name).is_none() && non_empty(&self.description).is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            check_text("name", name, NAME_MAX_LEN, false)?;
        }
        if let Some(description) = &self.description {
            check_text("description", description, DESCRIPTION_MAX_LEN, false)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BidHead {
    pub status: BidStatus,
    pub tender_id: String,
    pub author_type: AuthorType,
    pub author_id: String,
}

impl VersionFields for BidFields {
    const COLUMNS: &'static [&'static str] = &["name", "description"];

    type Patch = BidPatch;

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(offset)?,
            description: row.get(offset + 1)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.description.clone()),
        ]
    }

    fn merge(self, patch: &BidPatch) -> Self {
        Self {
            name: non_empty(&patch.name).map_or(self.name, str::to_string),
            description: non_empty(&patch.description).map_or(self.description, str::to_string),
        }
    }
}

impl Versioned for Bid {
    const PREFIX: EntityPrefix = EntityPrefix::Bid;
    const TABLE: &'static str = "bid";
    const VERSION_TABLE: &'static str = "bid_version";
    const OWNER_COLUMN: &'static str = "bid_id";
    const HEAD_COLUMNS: &'static [&'static str] =
        &["status", "decision", "tender_id", "author_type", "author_id"];

    type Head = BidHead;
    type Status = BidStatus;
    type Fields = BidFields;

    fn head_values(head: &BidHead) -> Vec<Value> {
        vec![
            Value::Text(head.status.to_string()),
            Value::Null,
            Value::Text(head.tender_id.clone()),
            Value::Text(head.author_type.to_string()),
            Value::Text(head.author_id.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let fields = BidFields::from_row(row, Self::fields_offset())?;
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            version: row.get(2)?,
            status: row.get(3)?,
            decision: row.get(4)?,
            tender_id: row.get(5)?,
            author_type: row.get(6)?,
            author_id: row.get(7)?,
            name: fields.name,
            description: fields.description,
        })
    }

    fn not_found() -> TenderError {
        TenderError::BidNotFound
    }
}

impl Entity for Bid {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn status_str(&self) -> String {
        self.status.to_string()
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn created(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_previous_values() {
        let previous = BidFields {
            name: "Offer".to_string(),
            description: "Two trucks".to_string(),
        };
        let merged = previous.merge(&BidPatch {
            name: Some("Better offer".to_string()),
            description: None,
        });
        assert_eq!(merged.name, "Better offer");
        assert_eq!(merged.description, "Two trucks");
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(BidPatch::default().is_empty());
        assert!(BidPatch {
            name: Some(String::new()),
            description: Some(String::new()),
        }
        .is_empty());
    }

    #[test]
    fn test_undecided_bid_omits_decision() {
        let bid = Bid {
            id: "BID-1".to_string(),
            name: "Offer".to_string(),
            description: "Two trucks".to_string(),
            status: BidStatus::Created,
            decision: None,
            tender_id: "TND-1".to_string(),
            author_type: AuthorType::User,
            author_id: "EMP-1".to_string(),
            version: 1,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&bid).unwrap();
        assert!(json.get("decision").is_none());
        assert_eq!(json["authorType"], "User");
    }
}
