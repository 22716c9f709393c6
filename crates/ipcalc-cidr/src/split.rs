//! Subnet splitting
//!
//! A block split into `/new_prefix` yields `2^(new_prefix - prefix)`
//! sub-blocks. That count reaches 2^128 for IPv6, so sub-blocks are produced
//! lazily by integer stepping from the parent's low address.

use ipcalc_core::{masks, IpCalcError, Limits, Result, Width};
use std::iter::FusedIterator;
use tracing::debug;

use crate::block::CidrBlock;

/// Lazy ascending sequence of equal-sized sub-blocks
///
/// # Examples
///
/// ```
/// use ipcalc_cidr::CidrBlock;
///
/// let cidr = CidrBlock::parse("10.0.0.0/8").unwrap();
/// let mut subnets = cidr.split(16).unwrap();
/// assert_eq!(subnets.total(), Some(256));
/// assert_eq!(subnets.next().unwrap().to_string(), "10.0.0.0/16");
/// assert_eq!(subnets.next_back().unwrap().to_string(), "10.255.0.0/16");
/// ```
#[derive(Debug, Clone)]
pub struct Subnets {
    width: Width,
    prefix_len: u8,
    host_bits: u32,
    total: Option<u128>,
    next: u128,
    last: u128,
    exhausted: bool,
}

impl Subnets {
    /// Split `block` into `/new_prefix` sub-blocks
    pub fn new(block: &CidrBlock, new_prefix: u8) -> Result<Self> {
        let parent = block.subnet();
        let width = parent.width;
        if new_prefix < parent.prefix_len {
            return Err(IpCalcError::InvalidSplit(format!(
                "/{} is shorter than {}",
                new_prefix, block
            )));
        }
        if u32::from(new_prefix) > width.bits() {
            return Err(IpCalcError::InvalidSplit(format!(
                "/{} exceeds {} width of {} bits",
                new_prefix,
                width,
                width.bits()
            )));
        }

        let (net_mask, _) = masks(width, new_prefix);
        let fan_out = u32::from(new_prefix - parent.prefix_len);
        let total = 1u128.checked_shl(fan_out);

        debug!(block = %block, new_prefix, fan_out, "splitting block");

        Ok(Self {
            width,
            prefix_len: new_prefix,
            host_bits: parent.host_bits - fan_out,
            total,
            next: parent.low,
            last: parent.high & net_mask,
            exhausted: false,
        })
    }

    /// Total number of sub-blocks, `None` when it is 2^128
    pub fn total(&self) -> Option<u128> {
        self.total
    }

    /// Sub-blocks not yet yielded, `None` when it is 2^128
    pub fn remaining(&self) -> Option<u128> {
        if self.exhausted {
            return Some(0);
        }
        (self.last - self.next)
            .checked_shr(self.host_bits)
            .unwrap_or(0)
            .checked_add(1)
    }

    /// Prefix length of every yielded block
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Collect the remaining sub-blocks, failing when they exceed `limits`
    pub fn collect_bounded(self, limits: &Limits) -> Result<Vec<CidrBlock>> {
        let count = limits.check(self.remaining())?;
        let mut blocks = Vec::with_capacity(count);
        blocks.extend(self);
        Ok(blocks)
    }

    fn step(&self) -> u128 {
        // Only called with more than one block left, so host_bits < 128
        1u128 << self.host_bits
    }
}

impl Iterator for Subnets {
    type Item = CidrBlock;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let base = self.next;
        if base == self.last {
            self.exhausted = true;
        } else {
            self.next += self.step();
        }
        Some(CidrBlock::from_aligned(self.width, base, self.prefix_len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining().and_then(|n| usize::try_from(n).ok()) {
            Some(n) => (n, Some(n)),
            None => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for Subnets {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let base = self.last;
        if base == self.next {
            self.exhausted = true;
        } else {
            self.last -= self.step();
        }
        Some(CidrBlock::from_aligned(self.width, base, self.prefix_len))
    }
}

impl FusedIterator for Subnets {}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(cidr: &str, new_prefix: u8) -> Result<Vec<String>> {
        let subnets = CidrBlock::parse(cidr)?.split(new_prefix)?;
        Ok(subnets.map(|b| b.to_string()).collect())
    }

    #[test]
    fn test_split_slash_24_into_26() {
        assert_eq!(
            split("192.168.0.0/24", 26).unwrap(),
            [
                "192.168.0.0/26",
                "192.168.0.64/26",
                "192.168.0.128/26",
                "192.168.0.192/26",
            ]
        );
    }

    #[test]
    fn test_split_same_prefix() {
        assert_eq!(split("10.0.0.0/8", 8).unwrap(), ["10.0.0.0/8"]);
    }

    #[test]
    fn test_split_normalizes_host_bits() {
        assert_eq!(
            split("10.0.0.77/30", 31).unwrap(),
            ["10.0.0.76/31", "10.0.0.78/31"]
        );
    }

    #[test]
    fn test_split_to_host_routes() {
        let blocks = split("10.0.0.0/30", 32).unwrap();
        assert_eq!(blocks, ["10.0.0.0/32", "10.0.0.1/32", "10.0.0.2/32", "10.0.0.3/32"]);
    }

    #[test]
    fn test_split_ipv6() {
        assert_eq!(
            split("2001:db8::/32", 34).unwrap(),
            [
                "2001:db8::/34",
                "2001:db8:4000::/34",
                "2001:db8:8000::/34",
                "2001:db8:c000::/34",
            ]
        );
    }

    #[test]
    fn test_split_invalid() {
        assert!(matches!(
            split("192.168.0.0/24", 23),
            Err(IpCalcError::InvalidSplit(_))
        ));
        assert!(matches!(
            split("192.168.0.0/24", 33),
            Err(IpCalcError::InvalidSplit(_))
        ));
        assert!(matches!(
            split("2001:db8::/32", 129),
            Err(IpCalcError::InvalidSplit(_))
        ));
    }

    #[test]
    fn test_split_huge_ipv6_is_lazy() {
        let block = CidrBlock::parse("::/0").unwrap();
        let mut subnets = block.split(64).unwrap();
        assert_eq!(subnets.total(), Some(1 << 64));
        assert_eq!(subnets.next().unwrap().to_string(), "::/64");
        assert_eq!(subnets.next().unwrap().to_string(), "0:0:0:1::/64");
        assert_eq!(
            subnets.next_back().unwrap().to_string(),
            "ffff:ffff:ffff:ffff::/64"
        );
        assert_eq!(subnets.remaining(), Some((1 << 64) - 3));
    }

    #[test]
    fn test_split_whole_ipv6_space_to_hosts() {
        let block = CidrBlock::parse("::/0").unwrap();
        let mut subnets = block.split(128).unwrap();
        assert_eq!(subnets.total(), None);
        assert_eq!(subnets.remaining(), None);
        assert_eq!(subnets.size_hint(), (usize::MAX, None));
        assert_eq!(subnets.next().unwrap().to_string(), "::/128");
        assert_eq!(subnets.remaining(), Some(u128::MAX));
    }

    #[test]
    fn test_split_whole_ipv4_space() {
        let block = CidrBlock::parse("0.0.0.0/0").unwrap();
        let mut subnets = block.split(32).unwrap();
        assert_eq!(subnets.total(), Some(1 << 32));
        assert_eq!(
            subnets.next_back().unwrap().to_string(),
            "255.255.255.255/32"
        );
    }

    #[test]
    fn test_collect_bounded() {
        let block = CidrBlock::parse("10.0.0.0/8").unwrap();
        let blocks = block.split(24).unwrap().collect_bounded(&Limits::default()).unwrap();
        assert_eq!(blocks.len(), 65536);

        let err = block.split(32).unwrap().collect_bounded(&Limits::new(1024)).unwrap_err();
        assert!(matches!(err, IpCalcError::RangeTooLarge(_)));
    }
}
