//! CIDR operations and IP range queries
//!
//! Converts between address text, numeric values, ranges and CIDR blocks
//! for both IPv4 and IPv6:
//! - CIDR → range (`cidr2range`)
//! - Range → minimal CIDR list (`range2cidr`)
//! - Lazy enumeration of a range or block (`range2list`, `cidr2list`)
//! - Splitting a block into equal sub-blocks (`splitcidr`)
//!
//! Every operation is a pure function of its inputs. Sequences that can be
//! astronomically long (IPv6 enumeration, splitting short IPv6 prefixes)
//! are returned as lazy iterators.
//!
//! # Examples
//!
//! ```
//! let range = ipcalc_cidr::cidr_to_range("192.168.1.0/24").unwrap();
//! assert_eq!(range.first().to_string(), "192.168.1.0");
//! assert_eq!(range.last().to_string(), "192.168.1.255");
//!
//! let blocks = ipcalc_cidr::range_to_cidr("194.36.0.0", "194.36.0.255").unwrap();
//! assert_eq!(blocks[0].to_string(), "194.36.0.0/24");
//!
//! let first_five: Vec<String> = ipcalc_cidr::enumerate("2001:db8::", "2001:db8::ffff")
//!     .unwrap()
//!     .take(5)
//!     .map(|ip| ip.to_string())
//!     .collect();
//! assert_eq!(first_five[4], "2001:db8::4");
//! ```

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

pub mod aggregate;
pub mod block;
pub mod range;
pub mod split;

pub use aggregate::aggregate;
pub use block::{CidrBlock, Subnet};
pub use ipcalc_core::{
    classify, masks, Address, Classification, IpCalcError, Limits, Result, Width,
};
pub use range::{AddressIter, AddressRange};
pub use split::Subnets;

/// Parse address text, inferring IPv4 or IPv6
pub fn parse_address(text: &str) -> Result<Address> {
    Address::parse(text)
}

/// Numeric value of address text of the given width
///
/// # Examples
///
/// ```
/// use ipcalc_cidr::{to_decimal, Width};
///
/// assert_eq!(to_decimal("1.0.0.1", Width::V4).unwrap(), 16777217);
/// assert!(to_decimal("::1", Width::V4).is_err());
/// ```
pub fn to_decimal(text: &str, width: Width) -> Result<u128> {
    Address::parse_as(text, width).map(|ip| ip.value())
}

/// Canonical text for a numeric address value of the given width
pub fn to_text(value: u128, width: Width) -> Result<String> {
    Address::from_value(width, value).map(|ip| ip.to_string())
}

/// Inclusive address range of a CIDR block
pub fn cidr_to_range(cidr: &str) -> Result<AddressRange> {
    Ok(CidrBlock::parse(cidr)?.range())
}

/// Minimal ascending CIDR list covering the range between two addresses
///
/// The endpoints may be given in either order.
pub fn range_to_cidr(from: &str, to: &str) -> Result<Vec<CidrBlock>> {
    Ok(AddressRange::parse(from, to)?.to_cidrs())
}

/// Lazy iterator over every address between two addresses
pub fn enumerate(from: &str, to: &str) -> Result<AddressIter> {
    Ok(AddressRange::parse(from, to)?.iter())
}

/// Lazy iterator over every address in a CIDR block
pub fn cidr_to_list(cidr: &str) -> Result<AddressIter> {
    Ok(CidrBlock::parse(cidr)?.iter())
}

/// Lazy sequence of the `/new_prefix` sub-blocks of a CIDR block
///
/// Malformed CIDR text is reported as `InvalidCidr`; a bad target prefix as
/// `InvalidSplit`.
pub fn split(cidr: &str, new_prefix: u8) -> Result<Subnets> {
    CidrBlock::parse(cidr)?.split(new_prefix)
}

/// Random IPv4 address with every octet drawn from `0..255`
pub fn random_v4<R: Rng + ?Sized>(rng: &mut R) -> Address {
    let octet = Uniform::from(0..255u8);
    let octets = [
        octet.sample(rng),
        octet.sample(rng),
        octet.sample(rng),
        octet.sample(rng),
    ];
    Address::V4(u32::from_be_bytes(octets))
}
