//! Entity trait and the status/decision enums shared by tenders and bids
//!
//! String forms are the wire forms (`Published`, `Approved`, ...). Status
//! changes are unconstrained: any value may follow any other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TenderError};

/// Longest accepted tender/bid name
pub const NAME_MAX_LEN: usize = 100;

/// Longest accepted tender/bid description
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Longest accepted bid feedback
pub const FEEDBACK_MAX_LEN: usize = 1000;

/// Check a user supplied text value against its length limit
///
/// With `required` an empty value is rejected as well.
pub fn check_text(field: &'static str, value: &str, max_len: usize, required: bool) -> Result<()> {
    if required && value.is_empty() {
        return Err(TenderError::invalid(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max_len {
        return Err(TenderError::invalid(
            field,
            format!("must be at most {} characters, got {}", max_len, len),
        ));
    }
    Ok(())
}

/// Common view over tenders and bids
pub trait Entity {
    /// Get the entity's unique ID
    fn id(&self) -> &str;

    /// Get the name from the current version
    fn name(&self) -> &str;

    /// Get the status as its wire string
    fn status_str(&self) -> String;

    /// Get the current version number
    fn version(&self) -> u32;

    /// Get the creation timestamp
    fn created(&self) -> DateTime<Utc>;
}

/// Tender lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TenderStatus {
    #[default]
    Created,
    Published,
    Closed,
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TenderStatus::Created => write!(f, "Created"),
            TenderStatus::Published => write!(f, "Published"),
            TenderStatus::Closed => write!(f, "Closed"),
        }
    }
}

impl std::str::FromStr for TenderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Created" => Ok(TenderStatus::Created),
            "Published" => Ok(TenderStatus::Published),
            "Closed" => Ok(TenderStatus::Closed),
            _ => Err(format!("Unknown tender status: {}", s)),
        }
    }
}

/// Bid lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BidStatus {
    #[default]
    Created,
    Published,
    Canceled,
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BidStatus::Created => write!(f, "Created"),
            BidStatus::Published => write!(f, "Published"),
            BidStatus::Canceled => write!(f, "Canceled"),
        }
    }
}

impl std::str::FromStr for BidStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Created" => Ok(BidStatus::Created),
            "Published" => Ok(BidStatus::Published),
            "Canceled" => Ok(BidStatus::Canceled),
            _ => Err(format!("Unknown bid status: {}", s)),
        }
    }
}

/// Final outcome of the approval quorum on a bid
///
/// A bid with no decision yet stores `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Decision {
    Approved,
    Rejected,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Approved => write!(f, "Approved"),
            Decision::Rejected => write!(f, "Rejected"),
        }
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Decision::Approved),
            "Rejected" => Ok(Decision::Rejected),
            _ => Err(format!("Unknown decision: {}", s)),
        }
    }
}

/// Kind of service a tender procures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    Construction,
    Delivery,
    Manufacture,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::Construction => write!(f, "Construction"),
            ServiceType::Delivery => write!(f, "Delivery"),
            ServiceType::Manufacture => write!(f, "Manufacture"),
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Construction" => Ok(ServiceType::Construction),
            "Delivery" => Ok(ServiceType::Delivery),
            "Manufacture" => Ok(ServiceType::Manufacture),
            _ => Err(format!("Unknown service type: {}", s)),
        }
    }
}

/// Who a bid is submitted on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorType {
    Organization,
    User,
}

impl std::fmt::Display for AuthorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthorType::Organization => write!(f, "Organization"),
            AuthorType::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for AuthorType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Organization" => Ok(AuthorType::Organization),
            "User" => Ok(AuthorType::User),
            _ => Err(format!("Unknown author type: {}", s)),
        }
    }
}
