//! Output formatting utilities

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::store::{StoreStats, VersionRecord};
use crate::entities::{Bid, BidFields, Employee, Organization, Review, Tender, TenderFields};

/// Determine the effective output format based on context
pub fn effective_format(format: OutputFormat, is_list: bool) -> OutputFormat {
    match format {
        OutputFormat::Auto => {
            if is_list {
                OutputFormat::Table
            } else {
                OutputFormat::Yaml
            }
        }
        other => other,
    }
}

/// A record that can be rendered as one table row
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    /// Value printed by `--format id`
    fn row_id(&self) -> String;

    fn cells(&self) -> Vec<String>;
}

fn render_table<T: TableRow>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::HEADERS.iter().map(|h| h.to_string()));
    for record in records {
        builder.push_record(record.cells());
    }

    let mut table = builder.build();
    table.with(Style::sharp());
    table.to_string()
}

fn print_serialized<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(value).into_diagnostic()?;
        println!("{}", json);
    } else {
        let yaml = serde_yml::to_string(value).into_diagnostic()?;
        print!("{}", yaml);
    }
    Ok(())
}

/// Print a single record
pub fn print_record<T: Serialize + TableRow>(record: &T, global: &GlobalOpts) -> Result<()> {
    match effective_format(global.format, false) {
        OutputFormat::Id => println!("{}", record.row_id()),
        OutputFormat::Table => println!("{}", render_table(std::slice::from_ref(record))),
        format => print_serialized(record, format)?,
    }
    Ok(())
}

/// Print a listing; `noun` is used for the empty-listing notice
pub fn print_list<T: Serialize + TableRow>(
    records: &[T],
    noun: &str,
    global: &GlobalOpts,
) -> Result<()> {
    match effective_format(global.format, true) {
        OutputFormat::Id => {
            for record in records {
                println!("{}", record.row_id());
            }
        }
        OutputFormat::Table => {
            if records.is_empty() {
                println!("{}", style(format!("No {} found.", noun)).dim());
            } else {
                println!("{}", render_table(records));
                println!(
                    "{}",
                    style(format!("{} {}", records.len(), noun)).dim()
                );
            }
        }
        format => print_serialized(records, format)?,
    }
    Ok(())
}

/// Print the outcome of a mutation
///
/// In `auto` mode this is a one-line confirmation; every other format prints
/// the record itself.
pub fn print_changed<T: Serialize + TableRow>(
    verb: &str,
    noun: &str,
    record: &T,
    detail: &str,
    global: &GlobalOpts,
) -> Result<()> {
    if global.format != OutputFormat::Auto {
        return print_record(record, global);
    }

    println!(
        "{} {} {} {}",
        style("✓").green(),
        verb,
        noun,
        style(record.row_id()).cyan()
    );
    if !detail.is_empty() {
        println!("   {}", style(detail).yellow());
    }
    Ok(())
}

/// Print a bare value such as a status
pub fn print_value<T: Serialize + std::fmt::Display>(value: &T, global: &GlobalOpts) -> Result<()> {
    match global.format {
        OutputFormat::Json | OutputFormat::Yaml => print_serialized(value, global.format),
        _ => {
            println!("{}", value);
            Ok(())
        }
    }
}

fn or_dash(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// Leading cells shared by tenders and bids: id, name, status, version
fn entity_cells<E: Entity>(entity: &E) -> Vec<String> {
    vec![
        entity.id().to_string(),
        entity.name().to_string(),
        entity.status_str(),
        entity.version().to_string(),
    ]
}

impl TableRow for Tender {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "STATUS", "VERSION", "SERVICE", "ORGANIZATION", "CREATED"];

    fn row_id(&self) -> String {
        self.id().to_string()
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = entity_cells(self);
        cells.extend([
            self.service_type.to_string(),
            self.organization_id.clone(),
            self.created().format("%Y-%m-%d").to_string(),
        ]);
        cells
    }
}

impl TableRow for Bid {
    const HEADERS: &'static [&'static str] =
        &["ID", "NAME", "STATUS", "VERSION", "DECISION", "AUTHOR", "TENDER"];

    fn row_id(&self) -> String {
        self.id().to_string()
    }

    fn cells(&self) -> Vec<String> {
        let mut cells = entity_cells(self);
        cells.extend([
            self.decision
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            format!("{} ({})", self.author_id, self.author_type),
            self.tender_id.clone(),
        ]);
        cells
    }
}

impl TableRow for Review {
    const HEADERS: &'static [&'static str] = &["ID", "DESCRIPTION", "BID", "CREATED"];

    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.description.clone(),
            self.bid_id.clone(),
            self.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]
    }
}

impl TableRow for Employee {
    const HEADERS: &'static [&'static str] = &["ID", "USERNAME", "FIRST NAME", "LAST NAME"];

    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.username.clone(),
            or_dash(&self.first_name),
            or_dash(&self.last_name),
        ]
    }
}

impl TableRow for Organization {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "TYPE", "DESCRIPTION"];

    fn row_id(&self) -> String {
        self.id.clone()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.org_type.to_string(),
            or_dash(&self.description),
        ]
    }
}

impl TableRow for VersionRecord<TenderFields> {
    const HEADERS: &'static [&'static str] = &["VERSION", "NAME", "SERVICE", "DESCRIPTION"];

    fn row_id(&self) -> String {
        self.version.to_string()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.version.to_string(),
            self.fields.name.clone(),
            self.fields.service_type.to_string(),
            self.fields.description.clone(),
        ]
    }
}

impl TableRow for VersionRecord<BidFields> {
    const HEADERS: &'static [&'static str] = &["VERSION", "NAME", "DESCRIPTION"];

    fn row_id(&self) -> String {
        self.version.to_string()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.version.to_string(),
            self.fields.name.clone(),
            self.fields.description.clone(),
        ]
    }
}

impl TableRow for StoreStats {
    const HEADERS: &'static [&'static str] = &[
        "SQLITE", "SCHEMA", "EMPLOYEES", "ORGANIZATIONS", "TENDERS", "BIDS", "REVIEWS",
    ];

    fn row_id(&self) -> String {
        self.sqlite_version.clone()
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sqlite_version.clone(),
            self.schema_version.to_string(),
            self.employees.to_string(),
            self.organizations.to_string(),
            self.tenders.to_string(),
            self.bids.to_string(),
            self.reviews.to_string(),
        ]
    }
}
