//! License validity window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Inclusive validity window of a license.
///
/// Invariant: `valid_to` is strictly after `valid_from`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

impl ValidityWindow {
    pub fn new(valid_from: NaiveDate, valid_to: NaiveDate) -> DomainResult<Self> {
        if valid_to <= valid_from {
            return Err(DomainError::invalid_input(
                "valid_to must be after valid_from",
            ));
        }
        Ok(Self {
            valid_from,
            valid_to,
        })
    }

    /// Days from `today` to expiry. Negative means the window has lapsed.
    pub fn days_until_expiry(&self, today: NaiveDate) -> i64 {
        (self.valid_to - today).num_days()
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.valid_to < today
    }
}
