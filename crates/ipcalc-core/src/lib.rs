//! Core types for IPCALC (IP address / CIDR calculator)
//!
//! This crate provides the foundational types shared by the CIDR engine:
//! - [`Width`] - Address family (32-bit IPv4 or 128-bit IPv6)
//! - [`Address`] - An IPv4 or IPv6 address held as an exact unsigned integer
//! - [`masks`] - Network/host mask arithmetic
//! - [`Limits`] - Bounds for eager materialization
//! - [`IpCalcError`] - Error types
//!
//! ```
//! use ipcalc_core::{Address, Width};
//!
//! let addr: Address = "192.168.1.1".parse().unwrap();
//! assert_eq!(addr.width(), Width::V4);
//! assert_eq!(addr.value(), 0xC0A80101);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

pub mod limits;
pub mod mask;

pub use limits::Limits;
pub use mask::{masks, masks_v4, masks_v6};

/// Address family, identified by its bit width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Width {
    /// 32-bit IPv4
    V4,
    /// 128-bit IPv6
    V6,
}

impl Width {
    /// Number of bits in an address of this width
    pub const fn bits(self) -> u32 {
        match self {
            Width::V4 => 32,
            Width::V6 => 128,
        }
    }

    /// Largest address value of this width (2^bits - 1)
    pub const fn max_value(self) -> u128 {
        match self {
            Width::V4 => u32::MAX as u128,
            Width::V6 => u128::MAX,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Width::V4 => write!(f, "IPv4"),
            Width::V6 => write!(f, "IPv6"),
        }
    }
}

/// Result of classifying address text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Dotted-quad IPv4 text
    V4,
    /// IPv6 text (hextets, `::` compression, optional IPv4 tail)
    V6,
    /// Neither
    Invalid,
}

impl Classification {
    /// Width for a valid classification
    pub fn width(self) -> Option<Width> {
        match self {
            Classification::V4 => Some(Width::V4),
            Classification::V6 => Some(Width::V6),
            Classification::Invalid => None,
        }
    }
}

/// Classify address text as IPv4, IPv6 or invalid
///
/// IPv4 wins when the text is a dotted quad; everything else that parses
/// under the IPv6 grammar is IPv6.
///
/// # Examples
///
/// ```
/// use ipcalc_core::{classify, Classification};
///
/// assert_eq!(classify("10.0.0.1"), Classification::V4);
/// assert_eq!(classify("2001:db8::1"), Classification::V6);
/// assert_eq!(classify("::ffff:10.0.0.1"), Classification::V6);
/// assert_eq!(classify("10.0.0"), Classification::Invalid);
/// ```
pub fn classify(text: &str) -> Classification {
    if text.parse::<Ipv4Addr>().is_ok() {
        Classification::V4
    } else if text.parse::<Ipv6Addr>().is_ok() {
        Classification::V6
    } else {
        Classification::Invalid
    }
}

/// IPv4 or IPv6 address
///
/// The numeric value never exceeds the width's maximum; both variants are
/// plain values and compare by width first, then by value.
///
/// # Examples
///
/// ```
/// use ipcalc_core::{Address, Width};
///
/// let v6 = Address::parse_as("2001:db8::1", Width::V6).unwrap();
/// assert_eq!(v6.to_string(), "2001:db8::1");
/// assert_eq!(v6.expanded(), "2001:0db8:0000:0000:0000:0000:0000:0001");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Address {
    /// IPv4 address as u32
    V4(u32),
    /// IPv6 address as u128
    V6(u128),
}

impl Address {
    /// Parse address text, inferring the width
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(ip) = text.parse::<Ipv4Addr>() {
            return Ok(Address::V4(u32::from(ip)));
        }
        text.parse::<Ipv6Addr>()
            .map(|ip| Address::V6(u128::from(ip)))
            .map_err(|_| IpCalcError::InvalidAddress(format!("Not a valid IP address: {}", text)))
    }

    /// Parse address text that must be of the given width
    pub fn parse_as(text: &str, width: Width) -> Result<Self> {
        if classify(text).width() != Some(width) {
            return Err(IpCalcError::InvalidAddress(format!(
                "Not a valid {} address: {}",
                width, text
            )));
        }
        Self::parse(text)
    }

    /// Create an address from its numeric value
    ///
    /// Fails when `value` does not fit the width.
    pub fn from_value(width: Width, value: u128) -> Result<Self> {
        match width {
            Width::V4 => u32::try_from(value).map(Address::V4).map_err(|_| {
                IpCalcError::InvalidAddress(format!("Invalid IPv4 number: {}", value))
            }),
            Width::V6 => Ok(Address::V6(value)),
        }
    }

    /// Address width
    pub fn width(&self) -> Width {
        match self {
            Address::V4(_) => Width::V4,
            Address::V6(_) => Width::V6,
        }
    }

    /// Numeric ("decimal") value
    pub fn value(&self) -> u128 {
        match *self {
            Address::V4(v) => u128::from(v),
            Address::V6(v) => v,
        }
    }

    pub fn is_v4(&self) -> bool {
        matches!(self, Address::V4(_))
    }

    pub fn is_v6(&self) -> bool {
        matches!(self, Address::V6(_))
    }

    /// Same-width address `n` steps above this one, or `None` past the top
    pub fn checked_add(&self, n: u128) -> Option<Self> {
        let value = self.value().checked_add(n)?;
        Self::from_value(self.width(), value).ok()
    }

    /// Full form: eight zero-padded hextets for IPv6, dotted quad for IPv4
    pub fn expanded(&self) -> String {
        match *self {
            Address::V4(v) => Ipv4Addr::from(v).to_string(),
            Address::V6(v) => Ipv6Addr::from(v)
                .segments()
                .iter()
                .map(|s| format!("{:04x}", s))
                .collect::<Vec<_>>()
                .join(":"),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Address::V4(v) => write!(f, "{}", Ipv4Addr::from(v)),
            Address::V6(v) => write!(f, "{}", Ipv6Addr::from(v)),
        }
    }
}

impl FromStr for Address {
    type Err = IpCalcError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Address::V4(u32::from(ip))
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Address::V6(u128::from(ip))
    }
}

/// Error types for IPCALC operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpCalcError {
    /// Text is not an IPv4 or IPv6 address of the expected width
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed CIDR text, or prefix out of range
    #[error("Invalid CIDR: {0}")]
    InvalidCidr(String),

    /// Bad range endpoint or mixed widths
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Target prefix shorter than the source prefix or beyond the width
    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    /// Too many items to collect eagerly
    #[error("Range too large: {0}")]
    RangeTooLarge(String),

    /// Bad configuration value
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for IPCALC operations
pub type Result<T> = std::result::Result<T, IpCalcError>;
