//! Address ranges and lazy range enumeration

use ipcalc_core::{Address, IpCalcError, Limits, Result, Width};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::FusedIterator;

use crate::aggregate::aggregate;
use crate::block::{address, CidrBlock};

/// Inclusive range of addresses of one width, with `first <= last`
///
/// Deserialization rejects mixed widths and descending endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAddressRange")]
pub struct AddressRange {
    first: Address,
    last: Address,
}

impl AddressRange {
    /// Create a range from two addresses of the same width
    ///
    /// Endpoints given in descending order are swapped.
    pub fn new(first: Address, last: Address) -> Result<Self> {
        if first.width() != last.width() {
            return Err(IpCalcError::InvalidRange(format!(
                "Mixed address widths: {} ({}) and {} ({})",
                first,
                first.width(),
                last,
                last.width()
            )));
        }
        if first > last {
            Ok(Self::from_ordered(last, first))
        } else {
            Ok(Self::from_ordered(first, last))
        }
    }

    pub(crate) fn from_ordered(first: Address, last: Address) -> Self {
        Self { first, last }
    }

    /// Parse a range from two address texts
    ///
    /// # Examples
    ///
    /// ```
    /// use ipcalc_cidr::AddressRange;
    ///
    /// let range = AddressRange::parse("10.0.0.0", "10.0.0.255").unwrap();
    /// assert_eq!(range.len(), Some(256));
    /// assert!(AddressRange::parse("10.0.0.0", "::1").is_err());
    /// ```
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        let first = Address::parse(from).map_err(|e| IpCalcError::InvalidRange(e.to_string()))?;
        let last = Address::parse(to).map_err(|e| IpCalcError::InvalidRange(e.to_string()))?;
        Self::new(first, last)
    }

    /// Lowest address in the range
    pub fn first(&self) -> Address {
        self.first
    }

    /// Highest address in the range
    pub fn last(&self) -> Address {
        self.last
    }

    /// Address family shared by both endpoints
    pub fn width(&self) -> Width {
        self.first.width()
    }

    /// Number of addresses, `None` for the full IPv6 space (2^128)
    pub fn len(&self) -> Option<u128> {
        (self.last.value() - self.first.value()).checked_add(1)
    }

    /// Ranges always hold at least one address
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `ip` has the range's width and lies between the endpoints
    pub fn contains(&self, ip: &Address) -> bool {
        ip.width() == self.width() && self.first <= *ip && *ip <= self.last
    }

    /// Lazy ascending iterator over every address in the range
    pub fn iter(&self) -> AddressIter {
        AddressIter {
            width: self.width(),
            next: self.first.value(),
            last: self.last.value(),
            exhausted: false,
        }
    }

    /// Collect every address, failing when the range exceeds `limits`
    pub fn collect_bounded(&self, limits: &Limits) -> Result<Vec<Address>> {
        let count = limits.check(self.len())?;
        let mut ips = Vec::with_capacity(count);
        ips.extend(self.iter());
        Ok(ips)
    }

    /// Minimal ascending list of CIDR blocks covering exactly this range
    pub fn to_cidrs(&self) -> Vec<CidrBlock> {
        aggregate(self)
    }

    /// The single block equal to this range, if there is one
    pub fn as_cidr(&self) -> Option<CidrBlock> {
        match self.to_cidrs().as_slice() {
            [block] => Some(*block),
            _ => None,
        }
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

impl IntoIterator for &AddressRange {
    type Item = Address;
    type IntoIter = AddressIter;

    fn into_iter(self) -> AddressIter {
        self.iter()
    }
}

impl From<CidrBlock> for AddressRange {
    fn from(block: CidrBlock) -> Self {
        block.range()
    }
}

#[derive(Deserialize)]
struct RawAddressRange {
    first: Address,
    last: Address,
}

impl TryFrom<RawAddressRange> for AddressRange {
    type Error = IpCalcError;

    fn try_from(raw: RawAddressRange) -> Result<Self> {
        if raw.first > raw.last && raw.first.width() == raw.last.width() {
            return Err(IpCalcError::InvalidRange(format!(
                "Descending endpoints: {}-{}",
                raw.first, raw.last
            )));
        }
        Self::new(raw.first, raw.last)
    }
}

/// Iterator over the addresses of a range
///
/// Each address is computed from the previous one, so dropping the
/// iterator early leaves nothing behind. Clone it to restart from the
/// current position.
#[derive(Debug, Clone)]
pub struct AddressIter {
    width: Width,
    next: u128,
    last: u128,
    exhausted: bool,
}

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let ip = self.next;
        if ip == self.last {
            self.exhausted = true;
        } else {
            self.next += 1;
        }
        Some(address(self.width, ip))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.exhausted {
            return (0, Some(0));
        }
        match (self.last - self.next)
            .checked_add(1)
            .and_then(|n| usize::try_from(n).ok())
        {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for AddressIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let ip = self.last;
        if ip == self.next {
            self.exhausted = true;
        } else {
            self.last -= 1;
        }
        Some(address(self.width, ip))
    }
}

impl FusedIterator for AddressIter {}
