//! Limit/offset pagination

use crate::core::error::{Result, TenderError};

/// Largest page a caller may request
pub const MAX_LIMIT: u32 = 50;

/// Page size used when the caller does not give one
pub const DEFAULT_LIMIT: u32 = 5;

/// A window into an ordered listing
///
/// The core accepts any value here: a zero limit or an offset past the end
/// both yield an empty page. Bounds are enforced by [`Page::checked`] at the
/// caller boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// Validate raw caller input: `0 <= limit <= max_limit`, `offset >= 0`
    pub fn checked(limit: i64, offset: i64, max_limit: u32) -> Result<Self> {
        if limit < 0 || limit > i64::from(max_limit) {
            return Err(TenderError::InvalidPagination(format!(
                "limit should be between 0 and {}, got {}",
                max_limit, limit
            )));
        }
        if offset < 0 {
            return Err(TenderError::InvalidPagination(format!(
                "offset should be greater or equal than 0, got {}",
                offset
            )));
        }
        let offset = u32::try_from(offset).map_err(|_| {
            TenderError::InvalidPagination(format!("offset {} is too large", offset))
        })?;
        Ok(Self::new(limit as u32, offset))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, 0)
    }
}
