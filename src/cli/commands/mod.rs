//! CLI command implementations

pub mod bids;
pub mod db;
pub mod dir;
pub mod tenders;
