//! Error types shared by the store and the workflows
//!
//! Every condition a caller can trigger is a named variant; storage failures
//! are wrapped unmodified.

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T, E = TenderError> = std::result::Result<T, E>;

/// Broad classification of an error, independent of its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    Unauthorized,
    Conflict,
    NoNewChanges,
    Invalid,
    Storage,
}

impl ErrorKind {
    /// Process exit status the CLI reports for this kind
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Storage => 1,
            ErrorKind::Invalid => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Forbidden => 4,
            ErrorKind::Unauthorized => 5,
            ErrorKind::Conflict => 6,
            ErrorKind::NoNewChanges => 7,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Forbidden => write!(f, "forbidden"),
            ErrorKind::Unauthorized => write!(f, "unauthorized"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::NoNewChanges => write!(f, "no new changes"),
            ErrorKind::Invalid => write!(f, "invalid input"),
            ErrorKind::Storage => write!(f, "storage failure"),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum TenderError {
    #[error("tender not found")]
    #[diagnostic(code(tender::tender_not_found))]
    TenderNotFound,

    #[error("bid not found")]
    #[diagnostic(code(tender::bid_not_found))]
    BidNotFound,

    #[error("employee not found")]
    #[diagnostic(code(tender::employee_not_found))]
    EmployeeNotFound,

    #[error("organization not found")]
    #[diagnostic(code(tender::organization_not_found))]
    OrganizationNotFound,

    #[error("no bid author employee with given username")]
    #[diagnostic(code(tender::bid_author_not_an_employee))]
    BidAuthorNotAnEmployee,

    #[error("no requester employee with given username")]
    #[diagnostic(code(tender::requester_not_an_employee))]
    RequesterNotAnEmployee,

    #[error("user doesn't have sufficient rights to access the tender")]
    #[diagnostic(code(tender::no_access_to_tender))]
    UserHasNoAccessToTender,

    #[error("user doesn't have sufficient rights to access the bid")]
    #[diagnostic(code(tender::no_access_to_bid))]
    UserHasNoAccessToBid,

    #[error("user isn't organization responsible")]
    #[diagnostic(code(tender::not_organization_responsible))]
    UserIsNotOrganizationResponsible,

    #[error("attempt to create a bid on behalf of the organization that owns the tender")]
    #[diagnostic(code(tender::same_organization_bid))]
    BidCanNotBeProposedBySameOrganization,

    #[error("bid author can't approve or reject bid")]
    #[diagnostic(code(tender::author_decision))]
    BidAuthorCanNotMakeDecisionsOnIt,

    #[error("can't approve bid twice")]
    #[diagnostic(code(tender::already_approved))]
    AlreadyApproveBid,

    #[error("try to sign in as employee")]
    #[diagnostic(
        code(tender::employee_rights_required),
        help("pass --username of a responsible employee to see unpublished tenders")
    )]
    UnauthorizedTryToAccessWithEmployeeRights,

    #[error("no such version")]
    #[diagnostic(code(tender::no_such_version))]
    NoSuchVersion,

    #[error("no new values")]
    #[diagnostic(code(tender::no_new_changes))]
    NoNewChanges,

    #[error("invalid {field}: {message}")]
    #[diagnostic(code(tender::invalid_value))]
    InvalidValue { field: &'static str, message: String },

    #[error("invalid pagination: {0}")]
    #[diagnostic(code(tender::invalid_pagination))]
    InvalidPagination(String),

    #[error("username '{0}' is already taken")]
    #[diagnostic(code(tender::duplicate_username))]
    DuplicateUsername(String),

    #[error("database error: {0}")]
    #[diagnostic(code(tender::storage))]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(tender::io))]
    Io(#[from] std::io::Error),

    #[error("failed to parse config {path}: {message}")]
    #[diagnostic(code(tender::config))]
    Config { path: String, message: String },
}

impl TenderError {
    pub fn kind(&self) -> ErrorKind {
        use TenderError::*;

        match self {
            TenderNotFound
            | BidNotFound
            | EmployeeNotFound
            | OrganizationNotFound
            | BidAuthorNotAnEmployee
            | RequesterNotAnEmployee => ErrorKind::NotFound,
            UserHasNoAccessToTender
            | UserHasNoAccessToBid
            | UserIsNotOrganizationResponsible
            | BidCanNotBeProposedBySameOrganization
            | BidAuthorCanNotMakeDecisionsOnIt
            | AlreadyApproveBid => ErrorKind::Forbidden,
            UnauthorizedTryToAccessWithEmployeeRights => ErrorKind::Unauthorized,
            NoSuchVersion => ErrorKind::Conflict,
            NoNewChanges => ErrorKind::NoNewChanges,
            InvalidValue { .. } | InvalidPagination(_) | DuplicateUsername(_) => ErrorKind::Invalid,
            Storage(_) | Io(_) | Config { .. } => ErrorKind::Storage,
        }
    }

    /// Build an `InvalidValue` from a parse failure
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        TenderError::InvalidValue {
            field,
            message: message.into(),
        }
    }
}
