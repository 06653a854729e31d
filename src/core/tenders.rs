//! Tender workflow
//!
//! Every operation resolves the caller through the directory before touching
//! the tender. Only responsible employees of the owning organization may
//! change a tender or see it before it is published.

use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::core::entity::{ServiceType, TenderStatus};
use crate::core::error::{Result, TenderError};
use crate::core::page::Page;
use crate::core::store::{Directory, SqlDirectory, Store, VersionRecord, Versions};
use crate::entities::tender::{Tender, TenderFields, TenderHead, TenderPatch};

/// Input for [`TenderWorkflow::create`]
#[derive(Debug, Clone)]
pub struct NewTender {
    pub name: String,
    pub description: String,
    pub service_type: ServiceType,
    pub organization_id: String,
    pub creator_username: String,
}

pub struct TenderWorkflow<'s> {
    store: &'s Store,
}

impl<'s> TenderWorkflow<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Create a tender at version 1 with status `Created`
    pub fn create(&self, input: &NewTender) -> Result<Tender> {
        let fields = TenderFields {
            name: input.name.clone(),
            description: input.description.clone(),
            service_type: input.service_type,
        };
        fields.validate()?;

        let tender = self.store.write(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(&input.creator_username)?;

            if !directory.organization_exists(&input.organization_id)? {
                return Err(TenderError::OrganizationNotFound);
            }
            if !directory.is_responsible(&employee_id, &input.organization_id)? {
                return Err(TenderError::UserIsNotOrganizationResponsible);
            }

            let versions = Versions::<Tender>::new(conn);
            let head = TenderHead {
                status: TenderStatus::Created,
                organization_id: input.organization_id.clone(),
            };
            let id = versions.create(&head, &fields)?;
            versions.current(&id)
        })?;

        info!(tender = %tender.id, organization = %tender.organization_id, "tender created");
        Ok(tender)
    }

    /// Write a new version with the patched fields
    pub fn edit(&self, tender_id: &str, username: &str, patch: &TenderPatch) -> Result<Tender> {
        if patch.is_empty() {
            return Err(TenderError::NoNewChanges);
        }
        patch.validate()?;

        let tender = self.store.write(|conn| {
            let versions = Versions::<Tender>::new(conn);
            let tender = versions.current(tender_id)?;
            authorize_responsible(conn, username, &tender)?;

            versions.edit_current(tender_id, patch)?;
            versions.current(tender_id)
        })?;

        info!(tender = %tender.id, version = tender.version, "tender edited");
        Ok(tender)
    }

    /// Current status
    ///
    /// Published tenders are visible to anyone. Anything else needs a
    /// username belonging to a responsible of the owning organization.
    pub fn status(&self, tender_id: &str, username: Option<&str>) -> Result<TenderStatus> {
        self.store.read(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = username
                .map(|name| directory.resolve_employee(name))
                .transpose()?;

            let tender = Versions::<Tender>::new(conn).current(tender_id)?;
            if tender.status == TenderStatus::Published {
                return Ok(tender.status);
            }

            let employee_id =
                employee_id.ok_or(TenderError::UnauthorizedTryToAccessWithEmployeeRights)?;
            if !directory.is_responsible(&employee_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToTender);
            }
            Ok(tender.status)
        })
    }

    /// Change the status; any value may follow any other
    pub fn set_status(&self, tender_id: &str, status: TenderStatus, username: &str) -> Result<Tender> {
        let tender = self.store.write(|conn| {
            let versions = Versions::<Tender>::new(conn);
            let tender = versions.current(tender_id)?;
            authorize_responsible(conn, username, &tender)?;

            versions.set_status(tender_id, status)?;
            versions.current(tender_id)
        })?;

        info!(tender = %tender.id, status = %tender.status, "tender status updated");
        Ok(tender)
    }

    /// Make the fields of `version` current again under a new version number
    pub fn rollback(&self, tender_id: &str, version: u32, username: &str) -> Result<Tender> {
        let tender = self.store.write(|conn| {
            let versions = Versions::<Tender>::new(conn);
            let tender = versions.current(tender_id)?;
            authorize_responsible(conn, username, &tender)?;

            versions.rollback_to(tender_id, version)?;
            versions.current(tender_id)
        })?;

        info!(tender = %tender.id, from = version, version = tender.version, "tender rolled back");
        Ok(tender)
    }

    /// Published tenders, optionally restricted to some service types
    pub fn published(&self, service_types: &[ServiceType], page: Page) -> Result<Vec<Tender>> {
        self.store.read(|conn| {
            let mut filter = String::from("e.status = ?1");
            let mut params = vec![Value::Text(TenderStatus::Published.to_string())];

            if !service_types.is_empty() {
                let placeholders: Vec<String> = (0..service_types.len())
                    .map(|i| format!("?{}", i + 2))
                    .collect();
                filter.push_str(&format!(" AND v.service_type IN ({})", placeholders.join(", ")));
                params.extend(service_types.iter().map(|t| Value::Text(t.to_string())));
            }

            debug!(%filter, limit = page.limit, offset = page.offset, "listing published tenders");
            Versions::<Tender>::new(conn).list(&filter, params, page)
        })
    }

    /// Tenders of the caller's organization, any status
    ///
    /// Without a username this is the unfiltered published listing. An
    /// employee who is not responsible for any organization gets an empty
    /// page.
    pub fn user_tenders(&self, username: Option<&str>, page: Page) -> Result<Vec<Tender>> {
        let Some(username) = username else {
            return self.published(&[], page);
        };

        self.store.read(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;
            let Some(organization_id) = directory.employee_organization(&employee_id)? else {
                return Ok(Vec::new());
            };

            Versions::<Tender>::new(conn).list(
                "e.organization_id = ?1",
                vec![Value::Text(organization_id)],
                page,
            )
        })
    }

    /// Every version of the tender, oldest first
    pub fn history(&self, tender_id: &str, username: &str) -> Result<Vec<VersionRecord<TenderFields>>> {
        self.store.read(|conn| {
            let versions = Versions::<Tender>::new(conn);
            let tender = versions.current(tender_id)?;
            authorize_responsible(conn, username, &tender)?;

            versions.history(tender_id)
        })
    }
}

/// Resolve `username` and require responsibility for the tender's organization
fn authorize_responsible(conn: &Connection, username: &str, tender: &Tender) -> Result<String> {
    let directory = SqlDirectory::new(conn);
    let employee_id = directory.resolve_employee(username)?;
    if !directory.is_responsible(&employee_id, &tender.organization_id)? {
        return Err(TenderError::UserHasNoAccessToTender);
    }
    Ok(employee_id)
}
