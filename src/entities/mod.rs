//! Entity type definitions

pub mod bid;
pub mod directory;
pub mod review;
pub mod tender;

pub use bid::{Bid, BidFields, BidHead, BidPatch};
pub use directory::{Employee, Organization, OrganizationType};
pub use review::Review;
pub use tender::{Tender, TenderFields, TenderHead, TenderPatch};
