//! Bid workflow and decisions
//!
//! Bids are owned by their author. For a `User` bid the author is the
//! employee whose id is `author_id`; for an `Organization` bid every
//! responsible of that organization acts as the author.
//!
//! Decisions are made by responsibles of the tender's organization and
//! resolved by the quorum rules in [`crate::core::quorum`]. The whole
//! decision, from the permission checks to the ledger write, runs inside a
//! single write transaction, so concurrent votes on one bid are counted one
//! at a time.

use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::core::entity::{
    check_text, AuthorType, BidStatus, Decision, TenderStatus, FEEDBACK_MAX_LEN,
};
use crate::core::error::{Result, TenderError};
use crate::core::page::Page;
use crate::core::quorum::{self, VoteOutcome};
use crate::core::store::versions::placeholders;
use crate::core::store::{
    ApprovalLedger, Directory, Reviews, SqlDirectory, Store, VersionRecord, Versions,
};
use crate::entities::bid::{Bid, BidFields, BidHead, BidPatch};
use crate::entities::review::Review;
use crate::entities::tender::Tender;

/// Input for [`BidWorkflow::create`]
#[derive(Debug, Clone)]
pub struct NewBid {
    pub name: String,
    pub description: String,
    pub tender_id: String,
    pub author_type: AuthorType,
    pub author_id: String,
}

impl Versions<'_, Bid> {
    /// Overwrite the bid's final decision
    pub fn set_decision(&self, bid_id: &str, decision: Decision) -> Result<()> {
        let changed = self.conn().execute(
            "UPDATE bid SET decision = ?2 WHERE id = ?1",
            (bid_id, decision),
        )?;
        if changed == 0 {
            return Err(TenderError::BidNotFound);
        }
        Ok(())
    }
}

pub struct BidWorkflow<'s> {
    store: &'s Store,
}

impl<'s> BidWorkflow<'s> {
    pub fn new(store: &'s Store) -> Self {
        Self { store }
    }

    /// Submit a bid against a published tender
    pub fn create(&self, input: &NewBid) -> Result<Bid> {
        let fields = BidFields {
            name: input.name.clone(),
            description: input.description.clone(),
        };
        fields.validate()?;

        let bid = self.store.write(|conn| {
            let tender = Versions::<Tender>::new(conn).current(&input.tender_id)?;
            if tender.status != TenderStatus::Published {
                return Err(TenderError::UserHasNoAccessToTender);
            }

            let directory = SqlDirectory::new(conn);
            match input.author_type {
                AuthorType::User => {
                    if !directory.employee_exists(&input.author_id)? {
                        return Err(TenderError::EmployeeNotFound);
                    }
                    if directory.is_responsible(&input.author_id, &tender.organization_id)? {
                        return Err(TenderError::BidCanNotBeProposedBySameOrganization);
                    }
                }
                AuthorType::Organization => {
                    if !directory.organization_exists(&input.author_id)? {
                        return Err(TenderError::OrganizationNotFound);
                    }
                    if input.author_id == tender.organization_id {
                        return Err(TenderError::BidCanNotBeProposedBySameOrganization);
                    }
                }
            }

            let versions = Versions::<Bid>::new(conn);
            let head = BidHead {
                status: BidStatus::Created,
                tender_id: input.tender_id.clone(),
                author_type: input.author_type,
                author_id: input.author_id.clone(),
            };
            let id = versions.create(&head, &fields)?;
            versions.current(&id)
        })?;

        info!(bid = %bid.id, tender = %bid.tender_id, author = %bid.author_id, "bid created");
        Ok(bid)
    }

    /// Write a new version with the patched fields; author only
    pub fn edit(&self, bid_id: &str, username: &str, patch: &BidPatch) -> Result<Bid> {
        if patch.is_empty() {
            return Err(TenderError::NoNewChanges);
        }
        patch.validate()?;

        let bid = self.store.write(|conn| {
            let versions = Versions::<Bid>::new(conn);
            let bid = versions.current(bid_id)?;
            authorize_author(conn, username, &bid)?;

            versions.edit_current(bid_id, patch)?;
            versions.current(bid_id)
        })?;

        info!(bid = %bid.id, version = bid.version, "bid edited");
        Ok(bid)
    }

    /// Current status, visible to the author and the tender's responsibles
    pub fn status(&self, bid_id: &str, username: &str) -> Result<BidStatus> {
        self.store.read(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;
            let bid = Versions::<Bid>::new(conn).current(bid_id)?;

            if is_author(&directory, &bid, &employee_id)? {
                return Ok(bid.status);
            }

            let tender = Versions::<Tender>::new(conn).current(&bid.tender_id)?;
            if !directory.is_responsible(&employee_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToBid);
            }
            Ok(bid.status)
        })
    }

    /// Change the status; any value may follow any other. Author only.
    pub fn set_status(&self, bid_id: &str, status: BidStatus, username: &str) -> Result<Bid> {
        let bid = self.store.write(|conn| {
            let versions = Versions::<Bid>::new(conn);
            let bid = versions.current(bid_id)?;
            authorize_author(conn, username, &bid)?;

            versions.set_status(bid_id, status)?;
            versions.current(bid_id)
        })?;

        info!(bid = %bid.id, status = %bid.status, "bid status updated");
        Ok(bid)
    }

    /// Make the fields of `version` current again; author only
    pub fn rollback(&self, bid_id: &str, version: u32, username: &str) -> Result<Bid> {
        let bid = self.store.write(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;

            let versions = Versions::<Bid>::new(conn);
            let bid = versions.current(bid_id)?;
            if !is_author(&directory, &bid, &employee_id)? {
                return Err(TenderError::UserHasNoAccessToBid);
            }

            versions.rollback_to(bid_id, version)?;
            versions.current(bid_id)
        })?;

        info!(bid = %bid.id, from = version, version = bid.version, "bid rolled back");
        Ok(bid)
    }

    /// Cast an approve or reject vote on a bid
    ///
    /// Returns the bid as it stands after the vote. A vote that would not
    /// change a final decision returns the bid untouched.
    pub fn submit_decision(&self, bid_id: &str, decision: Decision, username: &str) -> Result<Bid> {
        self.store.write(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;

            let versions = Versions::<Bid>::new(conn);
            let bid = versions.current(bid_id)?;
            let tender = Versions::<Tender>::new(conn).current(&bid.tender_id)?;

            if is_author(&directory, &bid, &employee_id)? {
                return Err(TenderError::BidAuthorCanNotMakeDecisionsOnIt);
            }
            if !directory.is_responsible(&employee_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToTender);
            }

            let ledger = ApprovalLedger::new(conn);
            if ledger.has_voted(bid_id, &employee_id)? {
                return Err(TenderError::AlreadyApproveBid);
            }

            if quorum::short_circuits(bid.decision, decision) {
                debug!(bid = bid_id, stored = ?bid.decision, requested = %decision, "decision unchanged");
                return Ok(bid);
            }

            let pending = ledger.count(bid_id)?;
            let responsible = directory.responsible_count(&tender.organization_id)?;
            match quorum::vote_outcome(decision, pending, responsible) {
                VoteOutcome::Recorded { approvals, quorum } => {
                    ledger.record(bid_id, &employee_id)?;
                    info!(bid = bid_id, employee = %employee_id, approvals, quorum, "approve recorded");
                }
                VoteOutcome::Final(outcome) => {
                    versions.set_decision(bid_id, outcome)?;
                    let cleared = ledger.clear(bid_id)?;
                    info!(bid = bid_id, decision = %outcome, cleared, "bid decision final");
                }
            }

            versions.current(bid_id)
        })
    }

    /// Leave feedback on a bid, addressed to its author
    pub fn submit_feedback(&self, bid_id: &str, username: &str, feedback: &str) -> Result<Bid> {
        check_text("feedback", feedback, FEEDBACK_MAX_LEN, true)?;

        self.store.write(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;

            let bid = Versions::<Bid>::new(conn).current(bid_id)?;
            let tender = Versions::<Tender>::new(conn).current(&bid.tender_id)?;
            if !directory.is_responsible(&employee_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToBid);
            }

            let review = Reviews::new(conn).insert(&bid.id, &employee_id, &bid.author_id, feedback)?;
            info!(review = %review.id, bid = %bid.id, receiver = %review.receiver_id, "feedback left");
            Ok(bid)
        })
    }

    /// Reviews received by a bid author, for a responsible of `tender_id`
    ///
    /// The listing covers every review the author received, not only those
    /// on bids for this tender. Reviews on bids of organizations the author
    /// is responsible for count as received by the author.
    pub fn reviews_on_author_bids(
        &self,
        tender_id: &str,
        author_username: &str,
        requester_username: &str,
        page: Page,
    ) -> Result<Vec<Review>> {
        self.store.read(|conn| {
            let directory = SqlDirectory::new(conn);
            let author_id = directory
                .resolve_employee(author_username)
                .map_err(|e| match e {
                    TenderError::EmployeeNotFound => TenderError::BidAuthorNotAnEmployee,
                    other => other,
                })?;
            let requester_id = directory
                .resolve_employee(requester_username)
                .map_err(|e| match e {
                    TenderError::EmployeeNotFound => TenderError::RequesterNotAnEmployee,
                    other => other,
                })?;

            let tender = Versions::<Tender>::new(conn).current(tender_id)?;
            if !directory.is_responsible(&requester_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToTender);
            }

            let receivers = acting_ids(&directory, &author_id)?;
            Reviews::new(conn).received_by(&receivers, page)
        })
    }

    /// Bids submitted against a tender; responsibles only
    pub fn tender_bids(&self, tender_id: &str, username: &str, page: Page) -> Result<Vec<Bid>> {
        self.store.read(|conn| {
            let tender = Versions::<Tender>::new(conn).current(tender_id)?;

            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;
            if !directory.is_responsible(&employee_id, &tender.organization_id)? {
                return Err(TenderError::UserHasNoAccessToTender);
            }

            Versions::<Bid>::new(conn).list(
                "e.tender_id = ?1",
                vec![Value::Text(tender.id)],
                page,
            )
        })
    }

    /// Bids authored by the caller or by an organization the caller is
    /// responsible for
    pub fn user_bids(&self, username: &str, page: Page) -> Result<Vec<Bid>> {
        self.store.read(|conn| {
            let directory = SqlDirectory::new(conn);
            let employee_id = directory.resolve_employee(username)?;
            let authors = acting_ids(&directory, &employee_id)?;

            let filter = format!("e.author_id IN ({})", placeholders(authors.len()));
            let params = authors.into_iter().map(Value::Text).collect();
            Versions::<Bid>::new(conn).list(&filter, params, page)
        })
    }

    /// Every version of the bid, oldest first; author only
    pub fn history(&self, bid_id: &str, username: &str) -> Result<Vec<VersionRecord<BidFields>>> {
        self.store.read(|conn| {
            let versions = Versions::<Bid>::new(conn);
            let bid = versions.current(bid_id)?;
            authorize_author(conn, username, &bid)?;

            versions.history(bid_id)
        })
    }
}

/// The employee id followed by the organizations it is responsible for
fn acting_ids(directory: &impl Directory, employee_id: &str) -> Result<Vec<String>> {
    let mut ids = vec![employee_id.to_string()];
    ids.extend(directory.responsible_organizations(employee_id)?);
    Ok(ids)
}

fn is_author(directory: &impl Directory, bid: &Bid, employee_id: &str) -> Result<bool> {
    match bid.author_type {
        AuthorType::User => Ok(bid.author_id == employee_id),
        AuthorType::Organization => directory.is_responsible(employee_id, &bid.author_id),
    }
}

/// Resolve `username` and require it to be the bid's author
fn authorize_author(conn: &Connection, username: &str, bid: &Bid) -> Result<String> {
    let directory = SqlDirectory::new(conn);
    let employee_id = directory.resolve_employee(username)?;
    if !is_author(&directory, bid, &employee_id)? {
        return Err(TenderError::UserHasNoAccessToBid);
    }
    Ok(employee_id)
}
