//! Identity and organization directory
//!
//! Resolves usernames to employee ids and answers "is this employee
//! responsible for that organization". Also carries the seeding operations
//! used to populate employees, organizations and responsibilities.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::core::error::{Result, TenderError};
use crate::core::identity::{self, EntityPrefix};
use crate::core::page::Page;
use crate::entities::directory::{Employee, Organization, OrganizationType};

/// Lookups the workflows authorize against
pub trait Directory {
    /// Employee id for `username`, or `EmployeeNotFound`
    fn resolve_employee(&self, username: &str) -> Result<String>;

    fn employee_exists(&self, employee_id: &str) -> Result<bool>;

    fn organization_exists(&self, organization_id: &str) -> Result<bool>;

    fn is_responsible(&self, employee_id: &str, organization_id: &str) -> Result<bool>;

    /// The organization an employee acts for
    ///
    /// When an employee is responsible for several organizations the one
    /// with the smallest id wins. `None` when there are none.
    fn employee_organization(&self, employee_id: &str) -> Result<Option<String>>;

    /// Every organization the employee is responsible for, ordered by id
    fn responsible_organizations(&self, employee_id: &str) -> Result<Vec<String>>;

    fn responsible_count(&self, organization_id: &str) -> Result<u32>;
}

/// [`Directory`] backed by the store's tables
pub struct SqlDirectory<'c> {
    conn: &'c Connection,
}

impl<'c> SqlDirectory<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Register a new employee; usernames are unique
    pub fn add_employee(
        &self,
        username: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Employee> {
        if username.is_empty() {
            return Err(TenderError::invalid("username", "must not be empty"));
        }

        let taken = self
            .conn
            .query_row(
                "SELECT 1 FROM employee WHERE username = ?1",
                [username],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Err(TenderError::DuplicateUsername(username.to_string()));
        }

        let id = identity::generate(EntityPrefix::Emp);
        self.conn.execute(
            "INSERT INTO employee (id, username, first_name, last_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, username, first_name, last_name, Utc::now().to_rfc3339()],
        )?;
        info!(employee = %id, username, "employee added");

        self.employee(&id)
    }

    pub fn add_organization(
        &self,
        name: &str,
        description: &str,
        org_type: OrganizationType,
    ) -> Result<Organization> {
        if name.is_empty() {
            return Err(TenderError::invalid("name", "must not be empty"));
        }

        let id = identity::generate(EntityPrefix::Org);
        self.conn.execute(
            "INSERT INTO organization (id, name, description, type, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, description, org_type, Utc::now().to_rfc3339()],
        )?;
        info!(organization = %id, name, "organization added");

        self.organization(&id)
    }

    /// Make `username` responsible for `organization_id`
    ///
    /// Registering an existing pair again is a no-op.
    pub fn add_responsible(&self, organization_id: &str, username: &str) -> Result<()> {
        if !self.organization_exists(organization_id)? {
            return Err(TenderError::OrganizationNotFound);
        }
        let employee_id = self.resolve_employee(username)?;

        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO organization_responsible (organization_id, user_id)
             VALUES (?1, ?2)",
            params![organization_id, employee_id],
        )?;
        debug!(organization = organization_id, employee = %employee_id, inserted, "responsible registered");
        Ok(())
    }

    /// Returns whether a registration was removed
    pub fn remove_responsible(&self, organization_id: &str, username: &str) -> Result<bool> {
        if !self.organization_exists(organization_id)? {
            return Err(TenderError::OrganizationNotFound);
        }
        let employee_id = self.resolve_employee(username)?;

        let removed = self.conn.execute(
            "DELETE FROM organization_responsible WHERE organization_id = ?1 AND user_id = ?2",
            params![organization_id, employee_id],
        )?;
        Ok(removed > 0)
    }

    pub fn employee(&self, employee_id: &str) -> Result<Employee> {
        let sql = format!("SELECT {} FROM employee WHERE id = ?1", Employee::COLUMNS);
        self.conn
            .query_row(&sql, [employee_id], Employee::from_row)
            .optional()?
            .ok_or(TenderError::EmployeeNotFound)
    }

    pub fn organization(&self, organization_id: &str) -> Result<Organization> {
        let sql = format!(
            "SELECT {} FROM organization WHERE id = ?1",
            Organization::COLUMNS
        );
        self.conn
            .query_row(&sql, [organization_id], Organization::from_row)
            .optional()?
            .ok_or(TenderError::OrganizationNotFound)
    }

    /// Employees ordered by username
    pub fn employees(&self, page: Page) -> Result<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employee ORDER BY username ASC LIMIT ?1 OFFSET ?2",
            Employee::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![page.limit, page.offset], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Organizations ordered by name, then id
    pub fn organizations(&self, page: Page) -> Result<Vec<Organization>> {
        let sql = format!(
            "SELECT {} FROM organization ORDER BY name ASC, id ASC LIMIT ?1 OFFSET ?2",
            Organization::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![page.limit, page.offset], Organization::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Employees responsible for an organization, ordered by username
    pub fn responsibles(&self, organization_id: &str) -> Result<Vec<Employee>> {
        if !self.organization_exists(organization_id)? {
            return Err(TenderError::OrganizationNotFound);
        }

        let sql = format!(
            "SELECT {} FROM employee e
             JOIN organization_responsible r ON r.user_id = e.id
             WHERE r.organization_id = ?1
             ORDER BY e.username ASC",
            prefixed_columns("e", Employee::COLUMNS)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([organization_id], Employee::from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn exists(&self, sql: &str, id: &str) -> Result<bool> {
        Ok(self
            .conn
            .query_row(sql, [id], |_| Ok(()))
            .optional()?
            .is_some())
    }
}

impl Directory for SqlDirectory<'_> {
    fn resolve_employee(&self, username: &str) -> Result<String> {
        self.conn
            .query_row(
                "SELECT id FROM employee WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(TenderError::EmployeeNotFound)
    }

    fn employee_exists(&self, employee_id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM employee WHERE id = ?1", employee_id)
    }

    fn organization_exists(&self, organization_id: &str) -> Result<bool> {
        self.exists("SELECT 1 FROM organization WHERE id = ?1", organization_id)
    }

    fn is_responsible(&self, employee_id: &str, organization_id: &str) -> Result<bool> {
        Ok(self
            .conn
            .query_row(
                "SELECT 1 FROM organization_responsible WHERE organization_id = ?1 AND user_id = ?2",
                params![organization_id, employee_id],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    fn employee_organization(&self, employee_id: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT MIN(organization_id) FROM organization_responsible WHERE user_id = ?1",
                [employee_id],
                |row| row.get(0),
            )?)
    }

    fn responsible_organizations(&self, employee_id: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT organization_id FROM organization_responsible
             WHERE user_id = ?1 ORDER BY organization_id ASC",
        )?;
        let rows = stmt.query_map([employee_id], |row| row.get(0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    fn responsible_count(&self, organization_id: &str) -> Result<u32> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM organization_responsible WHERE organization_id = ?1",
            [organization_id],
            |row| row.get(0),
        )?)
    }
}

fn prefixed_columns(alias: &str, columns: &str) -> String {
    columns
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}
