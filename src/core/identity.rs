//! Entity identity - prefixed ULIDs
//!
//! Generated ids look like `TND-01KCWY20F01B21V0G4E835NW3J`. The core treats
//! them as opaque strings; the prefix only makes them readable in listings.

use std::fmt;

use ulid::Ulid;

/// Kind of record an id was generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityPrefix {
    Tnd,
    Bid,
    Emp,
    Org,
    Rev,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::Tnd => "TND",
            EntityPrefix::Bid => "BID",
            EntityPrefix::Emp => "EMP",
            EntityPrefix::Org => "ORG",
            EntityPrefix::Rev => "REV",
        }
    }
}

impl fmt::Display for EntityPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generate a fresh id string for the given prefix
pub fn generate(prefix: EntityPrefix) -> String {
    format!("{}-{}", prefix, Ulid::new())
}
