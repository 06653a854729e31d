//! Shared test helpers for integration tests
//!
//! Library-level helpers seed an in-memory [`Store`]; the command helpers run
//! the `tender` binary against a database file in a temp directory.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

use tender::core::store::SqlDirectory;
use tender::core::{
    AuthorType, BidWorkflow, NewBid, NewTender, ServiceType, Store, TenderStatus, TenderWorkflow,
};
use tender::entities::{Bid, OrganizationType, Tender};

// ============================================================================
// Library helpers
// ============================================================================

pub fn memory_store() -> Store {
    Store::open_in_memory().unwrap()
}

/// Register an employee and return its id
pub fn add_employee(store: &Store, username: &str) -> String {
    store
        .write(|conn| SqlDirectory::new(conn).add_employee(username, username, "Tester"))
        .unwrap()
        .id
}

/// Register an organization with the given responsibles and return its id
pub fn add_org(store: &Store, name: &str, responsibles: &[&str]) -> String {
    store
        .write(|conn| {
            let dir = SqlDirectory::new(conn);
            let org = dir.add_organization(name, "", OrganizationType::Llc)?;
            for username in responsibles {
                dir.add_responsible(&org.id, username)?;
            }
            Ok(org.id)
        })
        .unwrap()
}

pub fn new_tender(org: &str, creator: &str, name: &str) -> NewTender {
    NewTender {
        name: name.to_string(),
        description: "Build a warehouse".to_string(),
        service_type: ServiceType::Construction,
        organization_id: org.to_string(),
        creator_username: creator.to_string(),
    }
}

/// Create a tender and publish it
pub fn published_tender(store: &Store, org: &str, creator: &str) -> Tender {
    let workflow = TenderWorkflow::new(store);
    let tender = workflow.create(&new_tender(org, creator, "Warehouse")).unwrap();
    workflow
        .set_status(&tender.id, TenderStatus::Published, creator)
        .unwrap()
}

pub fn new_bid(tender_id: &str, author_type: AuthorType, author_id: &str) -> NewBid {
    NewBid {
        name: "Offer".to_string(),
        description: "We can do it".to_string(),
        tender_id: tender_id.to_string(),
        author_type,
        author_id: author_id.to_string(),
    }
}

/// Submit a `User` bid by the given employee id
pub fn user_bid(store: &Store, tender_id: &str, author_id: &str) -> Bid {
    BidWorkflow::new(store)
        .create(&new_bid(tender_id, AuthorType::User, author_id))
        .unwrap()
}

// ============================================================================
// Command helpers
// ============================================================================

/// Helper to get a tender command
pub fn tender() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tender"));
    cmd.env_remove("TENDER_DB").env_remove("TENDER_LOG");
    cmd
}

/// Temp directory holding an initialized database
pub fn setup_test_db() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tender_in(&tmp).args(["db", "init"]).assert().success();
    tmp
}

/// A tender command bound to the database in `tmp`
pub fn tender_in(tmp: &TempDir) -> Command {
    let mut cmd = tender();
    cmd.arg("--db").arg(tmp.path().join("tender.db"));
    cmd
}

/// Run a command with `--format id` and return the first printed line
pub fn run_for_id(tmp: &TempDir, args: &[&str]) -> String {
    let output = tender_in(tmp)
        .args(["--format", "id"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "command {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Seed employee `alice` responsible for organization `Acme` plus a
/// bidder `bob`; returns the organization id
pub fn seed_directory(tmp: &TempDir) -> String {
    run_for_id(tmp, &["dir", "employee-add", "alice"]);
    run_for_id(tmp, &["dir", "employee-add", "bob"]);
    let org = run_for_id(tmp, &["dir", "org-add", "Acme"]);
    tender_in(tmp)
        .args(["dir", "responsible-add", "--org", &org, "-u", "alice"])
        .assert()
        .success();
    org
}

/// Create and publish a tender through the command line
pub fn create_published_tender(tmp: &TempDir, org: &str) -> String {
    let id = run_for_id(
        tmp,
        &[
            "tenders",
            "new",
            "--name",
            "Warehouse",
            "-d",
            "Build a warehouse",
            "--service-type",
            "Construction",
            "--org",
            org,
            "-u",
            "alice",
        ],
    );
    tender_in(tmp)
        .args(["tenders", "set-status", &id, "Published", "-u", "alice"])
        .assert()
        .success();
    id
}
