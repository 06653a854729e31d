//! Bid workflow tests - submission, authorship, quorum decisions and feedback

mod common;

use common::{add_employee, add_org, memory_store, new_bid, new_tender, published_tender, user_bid};
use tender::core::store::{ApprovalLedger, SqlDirectory, Versions};
use tender::core::{
    AuthorType, BidStatus, BidWorkflow, Decision, Page, Store, TenderError, TenderStatus,
    TenderWorkflow,
};
use tender::entities::{Bid, BidPatch, Tender};

fn pending_approvals(store: &Store, bid: &Bid) -> u32 {
    store
        .read(|conn| ApprovalLedger::new(conn).count(&bid.id))
        .unwrap()
}

/// Organization "Acme" with `responsibles` responsibles named r0, r1, ...,
/// a published tender and a bid by outsider `bob`
fn decision_setup(responsibles: usize) -> (Store, Bid, Vec<String>) {
    let store = memory_store();
    let names: Vec<String> = (0..responsibles).map(|i| format!("r{}", i)).collect();
    for name in &names {
        add_employee(&store, name);
    }
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let org = add_org(&store, "Acme", &refs);
    let tender = published_tender(&store, &org, &names[0]);

    let bob = add_employee(&store, "bob");
    let bid = user_bid(&store, &tender.id, &bob);
    (store, bid, names)
}

/// Organization owning the tender the bid was submitted to
fn tender_org(store: &Store, bid: &Bid) -> String {
    store
        .read(|conn| Versions::<Tender>::new(conn).current(&bid.tender_id))
        .unwrap()
        .organization_id
}

// ============================================================================
// End to end
// ============================================================================

#[test]
fn test_tender_to_approved_bid() {
    let store = memory_store();
    add_employee(&store, "alice");
    add_employee(&store, "carol");
    let bob = add_employee(&store, "bob");
    let org = add_org(&store, "Acme", &["alice", "carol"]);

    let tenders = TenderWorkflow::new(&store);
    let tender = tenders.create(&new_tender(&org, "alice", "Warehouse")).unwrap();
    assert_eq!(tender.version, 1);
    tenders
        .set_status(&tender.id, TenderStatus::Published, "alice")
        .unwrap();

    let bids = BidWorkflow::new(&store);
    let bid = bids
        .create(&new_bid(&tender.id, AuthorType::User, &bob))
        .unwrap();
    assert_eq!(bid.status, BidStatus::Created);
    assert_eq!(bid.version, 1);
    assert_eq!(bid.decision, None);
    assert_eq!(bids.status(&bid.id, "bob").unwrap(), BidStatus::Created);

    let after_first = bids
        .submit_decision(&bid.id, Decision::Approved, "alice")
        .unwrap();
    assert_eq!(after_first.decision, None);
    assert_eq!(pending_approvals(&store, &bid), 1);
    assert_eq!(bids.status(&bid.id, "bob").unwrap(), BidStatus::Created);

    let after_second = bids
        .submit_decision(&bid.id, Decision::Approved, "carol")
        .unwrap();
    assert_eq!(after_second.decision, Some(Decision::Approved));
    assert_eq!(pending_approvals(&store, &bid), 0);
    assert_eq!(bids.status(&bid.id, "bob").unwrap(), BidStatus::Created);
}

// ============================================================================
// Quorum
// ============================================================================

#[test]
fn test_single_responsible_approves_alone() {
    let (store, bid, names) = decision_setup(1);
    let decided = BidWorkflow::new(&store)
        .submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    assert_eq!(decided.decision, Some(Decision::Approved));
}

#[test]
fn test_quorum_capped_at_three() {
    let (store, bid, names) = decision_setup(5);
    let bids = BidWorkflow::new(&store);

    for (i, name) in names.iter().take(2).enumerate() {
        let voted = bids.submit_decision(&bid.id, Decision::Approved, name).unwrap();
        assert_eq!(voted.decision, None);
        assert_eq!(pending_approvals(&store, &bid), i as u32 + 1);
    }

    let decided = bids
        .submit_decision(&bid.id, Decision::Approved, &names[2])
        .unwrap();
    assert_eq!(decided.decision, Some(Decision::Approved));
    assert_eq!(pending_approvals(&store, &bid), 0);
}

#[test]
fn test_quorum_shrinks_when_responsible_leaves() {
    let (store, bid, names) = decision_setup(3);
    let org = tender_org(&store, &bid);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    assert_eq!(pending_approvals(&store, &bid), 1);

    let removed = store
        .write(|conn| SqlDirectory::new(conn).remove_responsible(&org, &names[2]))
        .unwrap();
    assert!(removed);

    let decided = bids
        .submit_decision(&bid.id, Decision::Approved, &names[1])
        .unwrap();
    assert_eq!(decided.decision, Some(Decision::Approved));
    assert_eq!(pending_approvals(&store, &bid), 0);
}

#[test]
fn test_quorum_grows_when_responsible_joins() {
    let (store, bid, names) = decision_setup(2);
    let org = tender_org(&store, &bid);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    add_employee(&store, "r2");
    store
        .write(|conn| SqlDirectory::new(conn).add_responsible(&org, "r2"))
        .unwrap();

    let pending = bids
        .submit_decision(&bid.id, Decision::Approved, &names[1])
        .unwrap();
    assert_eq!(pending.decision, None);
    assert_eq!(pending_approvals(&store, &bid), 2);

    let decided = bids
        .submit_decision(&bid.id, Decision::Approved, "r2")
        .unwrap();
    assert_eq!(decided.decision, Some(Decision::Approved));
    assert_eq!(pending_approvals(&store, &bid), 0);
}

#[test]
fn test_approve_twice_is_refused() {
    let (store, bid, names) = decision_setup(3);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    let again = bids.submit_decision(&bid.id, Decision::Approved, &names[0]);
    assert!(matches!(again, Err(TenderError::AlreadyApproveBid)));

    let reject = bids.submit_decision(&bid.id, Decision::Rejected, &names[0]);
    assert!(matches!(reject, Err(TenderError::AlreadyApproveBid)));
    assert_eq!(pending_approvals(&store, &bid), 1);
}

#[test]
fn test_reject_is_final_and_clears_ledger() {
    let (store, bid, names) = decision_setup(3);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    let rejected = bids
        .submit_decision(&bid.id, Decision::Rejected, &names[1])
        .unwrap();
    assert_eq!(rejected.decision, Some(Decision::Rejected));
    assert_eq!(pending_approvals(&store, &bid), 0);

    // The ledger was cleared, so the earlier voter is not refused; the
    // approve simply leaves the rejection in place.
    let ignored = bids
        .submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    assert_eq!(ignored.decision, Some(Decision::Rejected));
    assert_eq!(pending_approvals(&store, &bid), 0);

    let repeat = bids
        .submit_decision(&bid.id, Decision::Rejected, &names[2])
        .unwrap();
    assert_eq!(repeat.decision, Some(Decision::Rejected));
}

#[test]
fn test_reject_overrides_approval() {
    let (store, bid, names) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    let rejected = bids
        .submit_decision(&bid.id, Decision::Rejected, &names[0])
        .unwrap();
    assert_eq!(rejected.decision, Some(Decision::Rejected));
}

#[test]
fn test_repeat_approve_on_approved_bid_changes_nothing() {
    let (store, bid, names) = decision_setup(2);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    bids.submit_decision(&bid.id, Decision::Approved, &names[1])
        .unwrap();

    let again = bids
        .submit_decision(&bid.id, Decision::Approved, &names[0])
        .unwrap();
    assert_eq!(again.decision, Some(Decision::Approved));
    assert_eq!(pending_approvals(&store, &bid), 0);
}

#[test]
fn test_decision_permissions() {
    let (store, bid, _) = decision_setup(2);
    add_employee(&store, "mallory");
    let bids = BidWorkflow::new(&store);

    assert!(matches!(
        bids.submit_decision(&bid.id, Decision::Approved, "bob"),
        Err(TenderError::BidAuthorCanNotMakeDecisionsOnIt)
    ));
    assert!(matches!(
        bids.submit_decision(&bid.id, Decision::Approved, "mallory"),
        Err(TenderError::UserHasNoAccessToTender)
    ));
    assert!(matches!(
        bids.submit_decision(&bid.id, Decision::Approved, "ghost"),
        Err(TenderError::EmployeeNotFound)
    ));
    assert!(matches!(
        bids.submit_decision("BID-missing", Decision::Approved, "r0"),
        Err(TenderError::BidNotFound)
    ));
    assert_eq!(pending_approvals(&store, &bid), 0);
}

// ============================================================================
// Submission and authorship
// ============================================================================

#[test]
fn test_bid_needs_published_tender() {
    let store = memory_store();
    add_employee(&store, "alice");
    let bob = add_employee(&store, "bob");
    let org = add_org(&store, "Acme", &["alice"]);
    let tender = TenderWorkflow::new(&store)
        .create(&new_tender(&org, "alice", "Warehouse"))
        .unwrap();

    let result = BidWorkflow::new(&store).create(&new_bid(&tender.id, AuthorType::User, &bob));
    assert!(matches!(result, Err(TenderError::UserHasNoAccessToTender)));

    let result = BidWorkflow::new(&store).create(&new_bid("TND-missing", AuthorType::User, &bob));
    assert!(matches!(result, Err(TenderError::TenderNotFound)));
}

#[test]
fn test_owning_organization_cannot_bid() {
    let store = memory_store();
    let alice = add_employee(&store, "alice");
    let org = add_org(&store, "Acme", &["alice"]);
    let tender = published_tender(&store, &org, "alice");
    let bids = BidWorkflow::new(&store);

    assert!(matches!(
        bids.create(&new_bid(&tender.id, AuthorType::User, &alice)),
        Err(TenderError::BidCanNotBeProposedBySameOrganization)
    ));
    assert!(matches!(
        bids.create(&new_bid(&tender.id, AuthorType::Organization, &org)),
        Err(TenderError::BidCanNotBeProposedBySameOrganization)
    ));
}

#[test]
fn test_bid_author_must_exist() {
    let store = memory_store();
    add_employee(&store, "alice");
    let org = add_org(&store, "Acme", &["alice"]);
    let tender = published_tender(&store, &org, "alice");
    let bids = BidWorkflow::new(&store);

    assert!(matches!(
        bids.create(&new_bid(&tender.id, AuthorType::User, "EMP-missing")),
        Err(TenderError::EmployeeNotFound)
    ));
    assert!(matches!(
        bids.create(&new_bid(&tender.id, AuthorType::Organization, "ORG-missing")),
        Err(TenderError::OrganizationNotFound)
    ));
}

#[test]
fn test_organization_bid_belongs_to_its_responsibles() {
    let store = memory_store();
    add_employee(&store, "alice");
    add_employee(&store, "carol");
    add_employee(&store, "dave");
    add_employee(&store, "erin");
    let acme = add_org(&store, "Acme", &["alice"]);
    let globex = add_org(&store, "Globex", &["carol", "dave"]);
    let tender = published_tender(&store, &acme, "alice");
    let bids = BidWorkflow::new(&store);

    let bid = bids
        .create(&new_bid(&tender.id, AuthorType::Organization, &globex))
        .unwrap();
    assert_eq!(bid.author_type, AuthorType::Organization);

    let edited = bids
        .edit(
            &bid.id,
            "dave",
            &BidPatch {
                name: Some("Better offer".to_string()),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(edited.version, 2);
    assert_eq!(bids.status(&bid.id, "carol").unwrap(), BidStatus::Created);

    assert!(matches!(
        bids.edit(
            &bid.id,
            "erin",
            &BidPatch {
                name: Some("Mine now".to_string()),
                description: None,
            },
        ),
        Err(TenderError::UserHasNoAccessToBid)
    ));
    assert!(matches!(
        bids.submit_decision(&bid.id, Decision::Approved, "carol"),
        Err(TenderError::BidAuthorCanNotMakeDecisionsOnIt)
    ));
}

#[test]
fn test_bid_status_visibility() {
    let (store, bid, names) = decision_setup(1);
    add_employee(&store, "mallory");
    let bids = BidWorkflow::new(&store);

    assert_eq!(bids.status(&bid.id, "bob").unwrap(), BidStatus::Created);
    assert_eq!(bids.status(&bid.id, &names[0]).unwrap(), BidStatus::Created);
    assert!(matches!(
        bids.status(&bid.id, "mallory"),
        Err(TenderError::UserHasNoAccessToBid)
    ));
}

#[test]
fn test_set_status_is_author_only() {
    let (store, bid, names) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    let published = bids
        .set_status(&bid.id, BidStatus::Published, "bob")
        .unwrap();
    assert_eq!(published.status, BidStatus::Published);

    let canceled = bids.set_status(&bid.id, BidStatus::Canceled, "bob").unwrap();
    assert_eq!(canceled.status, BidStatus::Canceled);

    assert!(matches!(
        bids.set_status(&bid.id, BidStatus::Created, &names[0]),
        Err(TenderError::UserHasNoAccessToBid)
    ));
}

// ============================================================================
// Versions
// ============================================================================

#[test]
fn test_bid_edit_and_rollback() {
    let (store, bid, _) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    assert!(matches!(
        bids.edit(&bid.id, "bob", &BidPatch::default()),
        Err(TenderError::NoNewChanges)
    ));

    bids.edit(
        &bid.id,
        "bob",
        &BidPatch {
            name: None,
            description: Some("Cheaper".to_string()),
        },
    )
    .unwrap();

    let rolled = bids.rollback(&bid.id, 1, "bob").unwrap();
    assert_eq!(rolled.version, 3);
    assert_eq!(rolled.description, "We can do it");

    let history = bids.history(&bid.id, "bob").unwrap();
    let descriptions: Vec<&str> = history.iter().map(|r| r.fields.description.as_str()).collect();
    assert_eq!(descriptions, vec!["We can do it", "Cheaper", "We can do it"]);

    assert!(matches!(
        bids.rollback(&bid.id, 9, "bob"),
        Err(TenderError::NoSuchVersion)
    ));
    assert_eq!(bids.history(&bid.id, "bob").unwrap().len(), 3);
}

#[test]
fn test_decision_survives_edits() {
    let (store, bid, names) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    bids.submit_decision(&bid.id, Decision::Rejected, &names[0])
        .unwrap();
    let edited = bids
        .edit(
            &bid.id,
            "bob",
            &BidPatch {
                name: Some("Second try".to_string()),
                description: None,
            },
        )
        .unwrap();
    assert_eq!(edited.decision, Some(Decision::Rejected));
    assert_eq!(edited.version, 2);
}

// ============================================================================
// Listings
// ============================================================================

#[test]
fn test_tender_bids_and_user_bids() {
    let (store, bid, names) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    let on_tender = bids
        .tender_bids(&bid.tender_id, &names[0], Page::default())
        .unwrap();
    assert_eq!(on_tender.len(), 1);
    assert_eq!(on_tender[0].id, bid.id);

    assert!(matches!(
        bids.tender_bids(&bid.tender_id, "bob", Page::default()),
        Err(TenderError::UserHasNoAccessToTender)
    ));

    let mine = bids.user_bids("bob", Page::default()).unwrap();
    assert_eq!(mine.len(), 1);
    assert!(bids.user_bids(&names[0], Page::default()).unwrap().is_empty());
    assert!(bids.user_bids("bob", Page::new(0, 0)).unwrap().is_empty());
}

// ============================================================================
// Feedback
// ============================================================================

#[test]
fn test_feedback_reaches_author() {
    let (store, bid, names) = decision_setup(1);
    let bids = BidWorkflow::new(&store);

    bids.submit_feedback(&bid.id, &names[0], "Too expensive")
        .unwrap();
    bids.submit_feedback(&bid.id, &names[0], "Good references")
        .unwrap();

    let reviews = bids
        .reviews_on_author_bids(&bid.tender_id, "bob", &names[0], Page::default())
        .unwrap();
    let texts: Vec<&str> = reviews.iter().map(|r| r.description.as_str()).collect();
    assert_eq!(texts, vec!["Good references", "Too expensive"]);
    assert!(reviews.iter().all(|r| r.receiver_id == bid.author_id));
    assert!(reviews.iter().all(|r| r.bid_id == bid.id));
}

#[test]
fn test_feedback_permissions_and_validation() {
    let (store, bid, names) = decision_setup(1);
    add_employee(&store, "mallory");
    let bids = BidWorkflow::new(&store);

    assert!(matches!(
        bids.submit_feedback(&bid.id, "mallory", "Nope"),
        Err(TenderError::UserHasNoAccessToBid)
    ));
    assert!(matches!(
        bids.submit_feedback(&bid.id, &names[0], ""),
        Err(TenderError::InvalidValue { .. })
    ));
    assert!(matches!(
        bids.submit_feedback(&bid.id, &names[0], &"x".repeat(1001)),
        Err(TenderError::InvalidValue { .. })
    ));
    assert_eq!(store.ping().unwrap().reviews, 0);
}

#[test]
fn test_review_listing_errors() {
    let (store, bid, names) = decision_setup(1);
    add_employee(&store, "mallory");
    let bids = BidWorkflow::new(&store);
    let page = Page::default();

    assert!(matches!(
        bids.reviews_on_author_bids(&bid.tender_id, "ghost", &names[0], page),
        Err(TenderError::BidAuthorNotAnEmployee)
    ));
    assert!(matches!(
        bids.reviews_on_author_bids(&bid.tender_id, "bob", "ghost", page),
        Err(TenderError::RequesterNotAnEmployee)
    ));
    assert!(matches!(
        bids.reviews_on_author_bids(&bid.tender_id, "bob", "mallory", page),
        Err(TenderError::UserHasNoAccessToTender)
    ));
    assert!(matches!(
        bids.reviews_on_author_bids("TND-missing", "bob", &names[0], page),
        Err(TenderError::TenderNotFound)
    ));
}

#[test]
fn test_organization_bid_listed_and_reviewed_for_responsibles() {
    let store = memory_store();
    add_employee(&store, "alice");
    add_employee(&store, "carol");
    add_employee(&store, "erin");
    let acme = add_org(&store, "Acme", &["alice"]);
    let globex = add_org(&store, "Globex", &["carol"]);
    let tender = published_tender(&store, &acme, "alice");
    let bids = BidWorkflow::new(&store);

    let bid = bids
        .create(&new_bid(&tender.id, AuthorType::Organization, &globex))
        .unwrap();

    let mine = bids.user_bids("carol", Page::default()).unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, bid.id);
    assert!(bids.user_bids("erin", Page::default()).unwrap().is_empty());

    bids.submit_feedback(&bid.id, "alice", "Strong team")
        .unwrap();

    let reviews = bids
        .reviews_on_author_bids(&tender.id, "carol", "alice", Page::default())
        .unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].receiver_id, globex);
    assert_eq!(reviews[0].description, "Strong team");

    let unrelated = bids
        .reviews_on_author_bids(&tender.id, "erin", "alice", Page::default())
        .unwrap();
    assert!(unrelated.is_empty());
}
