//! Tender entity type - a procurement request owned by an organization

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::core::entity::{
    check_text, Entity, ServiceType, TenderStatus, DESCRIPTION_MAX_LEN, NAME_MAX_LEN,
};
use crate::core::error::{Result, TenderError};
use crate::core::identity::EntityPrefix;
use crate::core::store::versions::{non_empty, VersionFields, Versioned};

/// Current view of a tender: head row joined with its current version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tender {
    pub id: String,
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub status: TenderStatus,
    pub organization_id: String,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

/// Versioned tender fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenderFields {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
}

impl TenderFields {
    pub fn validate(&self) -> Result<()> {
        check_text("name", &self.name, NAME_MAX_LEN, true)?;
        check_text("description", &self.description, DESCRIPTION_MAX_LEN, true)
    }
}

/// Edit request; `None` and empty strings keep the previous value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<ServiceType>,
}

impl TenderPatch {
    pub fn is_empty(&self) -> bool {
        non_empty(&self.name).is_none()
            && non_empty(&self.description).is_none()
            && self.service_type.is_none()
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

/// Immutable and initial head columns
#[derive(Debug, Clone)]
pub struct TenderHead {
    pub status: TenderStatus,
    pub organization_id: String,
}

impl VersionFields for TenderFields {
    const COLUMNS: &'static [&'static str] = &["name", "description", "service_type"];

    type Patch = TenderPatch;

    fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(offset)?,
            description: row.get(offset + 1)?,
            service_type: row.get(offset + 2)?,
        })
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.description.clone()),
            Value::Text(self.service_type.to_string()),
        ]
    }

    fn merge(self, patch: &TenderPatch) -> Self {
        Self {
            name: non_empty(&patch.name).map_or(self.name, str::to_string),
            description: non_empty(&patch.description).map_or(self.description, str::to_string),
            service_type: patch.service_type.unwrap_or(self.service_type),
        }
    }
}

impl Versioned for Tender {
    const PREFIX: EntityPrefix = EntityPrefix::Tnd;
    const TABLE: &'static str = "tender";
    const VERSION_TABLE: &'static str = "tender_version";
    const OWNER_COLUMN: &'static str = "tender_id";
    const HEAD_COLUMNS: &'static [&'static str] = &["status", "organization_id"];

    type Head = TenderHead;
    type Status = TenderStatus;
    type Fields = TenderFields;

    fn head_values(head: &TenderHead) -> Vec<Value> {
        vec![
            Value::Text(head.status.to_string()),
            Value::Text(head.organization_id.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let fields = TenderFields::from_row(row, Self::fields_offset())?;
        Ok(Self {
            id: row.get(0)?,
            created_at: row.get(1)?,
            version: row.get(2)?,
            status: row.get(3)?,
            organization_id: row.get(4)?,
            name: fields.name,
            description: fields.description,
            service_type: fields.service_type,
        })
    }

    fn not_found() -> TenderError {
        TenderError::TenderNotFound
    }
}

impl Entity for Tender {
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
