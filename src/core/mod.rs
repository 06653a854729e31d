//! Core module - store, workflows and shared types

pub mod bids;
pub mod config;
pub mod entity;
pub mod error;
pub mod identity;
pub mod logging;
pub mod page;
pub mod quorum;
pub mod store;
pub mod tenders;

pub use bids::{BidWorkflow, NewBid};
pub use config::Config;
pub use entity::{AuthorType, BidStatus, Decision, Entity, ServiceType, TenderStatus};
pub use error::{ErrorKind, Result, TenderError};
pub use identity::EntityPrefix;
pub use page::Page;
pub use quorum::VoteOutcome;
pub use store::{Directory, SqlDirectory, Store, StoreStats, VersionRecord};
pub use tenders::{NewTender, TenderWorkflow};
