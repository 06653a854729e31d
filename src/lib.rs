//! Tender Management Toolkit
//!
//! Organizations publish tenders, employees bid on them, and responsible
//! employees approve or reject bids by quorum. Tenders and bids keep a full
//! version history; rolling back copies an old version forward as the new
//! current one.

pub mod cli;
pub mod core;
pub mod entities;
