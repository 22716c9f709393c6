//! CIDR blocks and CIDR → range conversion

use ipcalc_core::{classify, masks, Address, IpCalcError, Result, Width};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::range::{AddressIter, AddressRange};
use crate::split::Subnets;

/// CIDR block representation
///
/// The base address never has host bits set; constructors mask them off.
/// Deserialization rejects a prefix beyond the width and a base with host
/// bits set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawCidrBlock")]
pub struct CidrBlock {
    /// Lowest address, host bits clear
    base: Address,
    /// Leading fixed bits, at most the width
    prefix_len: u8,
}

impl CidrBlock {
    /// Parse `address/prefix` text
    ///
    /// The address part decides the width: dotted quads are IPv4, anything
    /// else must parse as IPv6. Host bits in the address are cleared.
    ///
    /// # Examples
    ///
    /// ```
    /// use ipcalc_cidr::CidrBlock;
    ///
    /// let cidr = CidrBlock::parse("10.1.2.3/8").unwrap();
    /// assert_eq!(cidr.to_string(), "10.0.0.0/8");
    /// ```
    pub fn parse(cidr: &str) -> Result<Self> {
        let parts: Vec<&str> = cidr.split('/').collect();
        if parts.len() != 2 {
            return Err(IpCalcError::InvalidCidr(format!(
                "Expected format: address/prefix, got {:?}",
                cidr
            )));
        }

        let ip_str = parts[0];
        let prefix_str = parts[1];

        let width = classify(ip_str)
            .width()
            .ok_or_else(|| IpCalcError::InvalidCidr(format!("Invalid address: {:?}", ip_str)))?;

        let prefix_len = parse_prefix(prefix_str, width).ok_or_else(|| {
            IpCalcError::InvalidCidr(format!("Invalid {} prefix: {:?}", width, prefix_str))
        })?;

        let ip = Address::parse_as(ip_str, width)
            .map_err(|e| IpCalcError::InvalidCidr(e.to_string()))?;

        Self::new(ip, prefix_len)
    }

    /// Create new CIDR from an address and prefix length
    ///
    /// Host bits of `ip` are cleared.
    pub fn new(ip: Address, prefix_len: u8) -> Result<Self> {
        let width = ip.width();
        if u32::from(prefix_len) > width.bits() {
            return Err(IpCalcError::InvalidCidr(format!(
                "Invalid prefix length: {} (must be 0-{})",
                prefix_len,
                width.bits()
            )));
        }

        let (net, _) = masks(width, prefix_len);
        Ok(Self::from_aligned(width, ip.value() & net, prefix_len))
    }

    /// Build a block whose base is already aligned to `prefix_len`
    pub(crate) fn from_aligned(width: Width, base: u128, prefix_len: u8) -> Self {
        Self {
            base: address(width, base),
            prefix_len,
        }
    }

    /// Base address, host bits clear
    pub fn base(&self) -> Address {
        self.base
    }

    /// Number of fixed leading bits
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Address family of the block
    pub fn width(&self) -> Width {
        self.base.width()
    }

    /// Mask with the top `prefix_len` bits set
    pub fn network_mask(&self) -> u128 {
        self.subnet().net_mask
    }

    /// Complement of the network mask within the width
    pub fn host_mask(&self) -> u128 {
        self.subnet().host_mask
    }

    /// First address of the block
    pub fn first(&self) -> Address {
        self.base
    }

    /// Last address of the block (IPv4 broadcast)
    pub fn last(&self) -> Address {
        let width = self.width();
        let last = (self.base.value() | self.host_mask()).min(width.max_value());
        address(width, last)
    }

    /// Inclusive address range covered by this block
    pub fn range(&self) -> AddressRange {
        AddressRange::from_ordered(self.first(), self.last())
    }

    /// Number of addresses in this block
    ///
    /// `None` only for the IPv6 `/0` block, whose size is 2^128.
    pub fn size(&self) -> Option<u128> {
        1u128.checked_shl(self.subnet().host_bits)
    }

    /// Whether `ip` has the same width and lies inside the block
    pub fn contains(&self, ip: &Address) -> bool {
        let subnet = self.subnet();
        ip.width() == subnet.width && (ip.value() & subnet.net_mask) == subnet.low
    }

    /// Derived mask/bound view of this block
    pub fn subnet(&self) -> Subnet {
        Subnet::new(self)
    }

    /// Split into equal sub-blocks of `new_prefix`
    ///
    /// See [`Subnets`]; the sequence is lazy.
    pub fn split(&self, new_prefix: u8) -> Result<Subnets> {
        Subnets::new(self, new_prefix)
    }

    /// Lazy iterator over all addresses in this block
    pub fn iter(&self) -> AddressIter {
        self.range().iter()
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix_len)
    }
}

impl FromStr for CidrBlock {
    type Err = IpCalcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Deserialize)]
struct RawCidrBlock {
    base: Address,
    prefix_len: u8,
}

impl TryFrom<RawCidrBlock> for CidrBlock {
    type Error = IpCalcError;

    fn try_from(raw: RawCidrBlock) -> Result<Self> {
        let block = Self::new(raw.base, raw.prefix_len)?;
        if block.base != raw.base {
            return Err(IpCalcError::InvalidCidr(format!(
                "{}/{} has host bits set",
                raw.base, raw.prefix_len
            )));
        }
        Ok(block)
    }
}

/// Masks and bounds of a block, recomputed from its prefix length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    pub width: Width,
    pub prefix_len: u8,
    pub host_bits: u32,
    pub net_mask: u128,
    pub host_mask: u128,
    pub low: u128,
    pub high: u128,
}

impl Subnet {
    pub fn new(block: &CidrBlock) -> Self {
        let width = block.width();
        let (net_mask, host_mask) = masks(width, block.prefix_len());
        let low = block.base().value() & net_mask;
        Self {
            width,
            prefix_len: block.prefix_len(),
            host_bits: width.bits() - u32::from(block.prefix_len()),
            net_mask,
            host_mask,
            low,
            high: low | host_mask,
        }
    }
}

/// Prefix text: ASCII digits only, at most 2 digits for IPv4 and 3 for IPv6
fn parse_prefix(text: &str, width: Width) -> Option<u8> {
    let max_digits = match width {
        Width::V4 => 2,
        Width::V6 => 3,
    };
    if text.is_empty() || text.len() > max_digits || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let prefix: u8 = text.parse().ok()?;
    (u32::from(prefix) <= width.bits()).then_some(prefix)
}

/// Address of `width` from a value already bounded by the width
pub(crate) fn address(width: Width, value: u128) -> Address {
    match width {
        Width::V4 => Address::V4(value as u32),
        Width::V6 => Address::V6(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v4(text: &str) -> Address {
        Address::parse_as(text, Width::V4).unwrap()
    }

    #[test]
    fn test_parse_cidr_widths() {
        let cidr = CidrBlock::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.base(), Address::V4(0xC0A80100));
        assert_eq!(cidr.width(), Width::V4);

        let cidr = CidrBlock::parse("2001:db8::/32").unwrap();
        assert_eq!(cidr.base(), Address::V6(0x2001_0db8 << 96));
        assert_eq!(cidr.prefix_len(), 32);
        assert_eq!(cidr.width(), Width::V6);
    }

    #[test]
    fn test_parse_dotted_quad_wins_over_ipv6() {
        let cidr = CidrBlock::parse("10.0.0.0/8").unwrap();
        assert_eq!(cidr.width(), Width::V4);
        assert_eq!(cidr.prefix_len(), 8);

        let cidr = CidrBlock::parse("::ffff:10.0.0.0/96").unwrap();
        assert_eq!(cidr.width(), Width::V6);
        assert_eq!(cidr.to_string(), "::ffff:0.0.0.0/96");
    }

    #[test]
    fn test_parse_masks_host_bits() {
        let cidr = CidrBlock::parse("192.168.1.77/24").unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.0/24");

        let cidr = CidrBlock::parse("2001:db8::ffff/112").unwrap();
        assert_eq!(cidr.to_string(), "2001:db8::/112");
    }

    #[test]
    fn test_parse_invalid_cidr() {
        assert!(CidrBlock::parse("192.168.1.0").is_err());
        assert!(CidrBlock::parse("192.168.1.0/33").is_err());
        assert!(CidrBlock::parse("256.0.0.0/24").is_err());
        assert!(CidrBlock::parse("10.0.0.0/24/1").is_err());
        assert!(CidrBlock::parse("10.0.0.0/").is_err());
        assert!(CidrBlock::parse("10.0.0.0/-1").is_err());
        assert!(CidrBlock::parse("10.0.0.0/+8").is_err());
        assert!(CidrBlock::parse("10.0.0.0/008").is_err());
        assert!(CidrBlock::parse("::/129").is_err());
        assert!(CidrBlock::parse("::/1280").is_err());
        assert!(matches!(
            CidrBlock::parse("10.0.0.0/33"),
            Err(IpCalcError::InvalidCidr(_))
        ));
    }

    #[test]
    fn test_cidr_contains() {
        let cidr = CidrBlock::parse("192.168.1.0/24").unwrap();
        assert!(cidr.contains(&v4("192.168.1.0")));
        assert!(cidr.contains(&v4("192.168.1.1")));
        assert!(cidr.contains(&v4("192.168.1.255")));
        assert!(!cidr.contains(&v4("192.168.0.1")));
        assert!(!cidr.contains(&v4("192.168.2.0")));
        assert!(!cidr.contains(&Address::V6(0xC0A80101)));
    }

    #[test]
    fn test_cidr_bounds() {
        let cidr = CidrBlock::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.first().to_string(), "192.168.1.0");
        assert_eq!(cidr.last().to_string(), "192.168.1.255");
    }

    #[test]
    fn test_slash_zero_bounds() {
        let cidr = CidrBlock::parse("0.0.0.0/0").unwrap();
        assert_eq!(cidr.last(), Address::V4(u32::MAX));

        let cidr = CidrBlock::parse("::/0").unwrap();
        assert_eq!(cidr.last(), Address::V6(u128::MAX));
    }

    #[test]
    fn test_cidr_size() {
        assert_eq!(CidrBlock::parse("192.168.1.0/24").unwrap().size(), Some(256));
        assert_eq!(CidrBlock::parse("10.0.0.0/8").unwrap().size(), Some(16777216));
        assert_eq!(CidrBlock::parse("0.0.0.0/0").unwrap().size(), Some(1 << 32));
        assert_eq!(CidrBlock::parse("::/1").unwrap().size(), Some(1 << 127));
        assert_eq!(CidrBlock::parse("::/0").unwrap().size(), None);
    }

    #[test]
    fn test_cidr_masks() {
        let cidr = CidrBlock::parse("10.0.0.0/8").unwrap();
        assert_eq!(cidr.network_mask(), 0xFF00_0000);
        assert_eq!(cidr.host_mask(), 0x00FF_FFFF);

        let cidr = CidrBlock::parse("fe80::/10").unwrap();
        assert_eq!(cidr.network_mask(), 0xFFC0 << 112);
        assert_eq!(cidr.host_mask(), u128::MAX >> 10);
    }

    #[test]
    fn test_subnet_view() {
        let subnet = CidrBlock::parse("2001:db8::/126").unwrap().subnet();
        assert_eq!(subnet.width, Width::V6);
        assert_eq!(subnet.prefix_len, 126);
        assert_eq!(subnet.host_bits, 2);
        assert_eq!(subnet.host_mask, 3);
        assert_eq!(subnet.net_mask, !3);
        assert_eq!(subnet.high - subnet.low, 3);
    }

    #[test]
    fn test_cidr_new() {
        let cidr = CidrBlock::new(Address::V4(0xC0A80101), 24).unwrap();
        assert_eq!(cidr.base(), Address::V4(0xC0A80100));
        assert!(CidrBlock::new(Address::V4(0), 33).is_err());
        assert!(CidrBlock::new(Address::V6(0), 128).is_ok());
    }

    #[test]
    fn test_cidr_display() {
        let cidr: CidrBlock = "192.168.1.0/24".parse().unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_cidr_slash_32() {
        let cidr = CidrBlock::parse("192.168.1.1/32").unwrap();
        assert_eq!(cidr.size(), Some(1));
        assert_eq!(cidr.first(), cidr.last());
    }

    #[test]
    fn test_cidr_serialization() {
        let cidr = CidrBlock::parse("10.0.0.0/8").unwrap();
        let json = serde_json::to_string(&cidr).expect("serialization failed");
        let back: CidrBlock = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(back, cidr);
    }

    #[test]
    fn test_cidr_deserialization_rejects_bad_prefix() {
        let json = r#"{"base":{"V4":167772160},"prefix_len":40}"#;
        assert!(serde_json::from_str::<CidrBlock>(json).is_err());

        let json = r#"{"base":{"V6":0},"prefix_len":129}"#;
        assert!(serde_json::from_str::<CidrBlock>(json).is_err());
    }

    #[test]
    fn test_cidr_deserialization_rejects_host_bits() {
        // 10.0.0.1/24
        let json = r#"{"base":{"V4":167772161},"prefix_len":24}"#;
        assert!(serde_json::from_str::<CidrBlock>(json).is_err());

        let json = r#"{"base":{"V4":167772160},"prefix_len":24}"#;
        let cidr: CidrBlock = serde_json::from_str(json).unwrap();
        assert!(cidr.contains(&cidr.base()));
    }
}
