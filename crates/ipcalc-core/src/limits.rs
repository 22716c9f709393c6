//! Materialization limits
//!
//! Lazy iterators never need these. They only bound the eager helpers that
//! collect a range or a split into a `Vec`.

use serde::{Deserialize, Serialize};
use std::env::{self, VarError};
use tracing::debug;

use crate::{IpCalcError, Result};

/// Environment variable overriding [`Limits::max_materialize`]
pub const MAX_MATERIALIZE_ENV: &str = "IPCALC_MAX_MATERIALIZE";

/// Default cap on eagerly collected items
pub const DEFAULT_MAX_MATERIALIZE: u64 = 1 << 20;

/// Bounds for eager collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Largest number of items collected into a `Vec`
    pub max_materialize: u64,
}

impl Limits {
    /// Create limits with an explicit cap
    pub fn new(max_materialize: u64) -> Self {
        Self { max_materialize }
    }

    /// Read limits from the environment
    ///
    /// Checks `IPCALC_MAX_MATERIALIZE`; falls back to the default only when
    /// unset. A value that is not a number or not valid Unicode is an error.
    pub fn from_env() -> Result<Self> {
        match env::var(MAX_MATERIALIZE_ENV) {
            Ok(raw) => {
                let max_materialize = raw.trim().parse::<u64>().map_err(|_| {
                    IpCalcError::Config(format!("{} must be a number, got {:?}", MAX_MATERIALIZE_ENV, raw))
                })?;
                debug!(max_materialize, "materialization limit from environment");
                Ok(Self { max_materialize })
            }
            Err(VarError::NotPresent) => Ok(Self::default()),
            Err(VarError::NotUnicode(raw)) => Err(IpCalcError::Config(format!(
                "{} must be a number, got {:?}",
                MAX_MATERIALIZE_ENV, raw
            ))),
        }
    }

    /// Fail with `RangeTooLarge` when `count` items exceed the cap
    ///
    /// `None` means the count does not fit in a u128 at all.
    pub fn check(&self, count: Option<u128>) -> Result<usize> {
        match count {
            Some(n) if n <= u128::from(self.max_materialize) => usize::try_from(n)
                .map_err(|_| IpCalcError::RangeTooLarge(format!("{} items", n))),
            Some(n) => Err(IpCalcError::RangeTooLarge(format!(
                "{} items exceeds limit of {}",
                n, self.max_materialize
            ))),
            None => Err(IpCalcError::RangeTooLarge(format!(
                "2^128 items exceeds limit of {}",
                self.max_materialize
            ))),
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MATERIALIZE)
    }
}
