//! Network and host mask arithmetic
//!
//! Masks are built with shifts only. A prefix longer than the width is
//! clamped to the width.

use crate::Width;

/// Network and host masks for `prefix` at the given width
///
/// Both masks are returned in the low `width.bits()` bits of a u128.
///
/// # Examples
///
/// ```
/// use ipcalc_core::{masks, Width};
///
/// let (net, host) = masks(Width::V4, 24);
/// assert_eq!(net, 0xFFFF_FF00);
/// assert_eq!(host, 0x0000_00FF);
/// ```
pub fn masks(width: Width, prefix: u8) -> (u128, u128) {
    let prefix = u32::from(prefix).min(width.bits());
    let full = width.max_value();
    let host = full.checked_shr(prefix).unwrap_or(0);
    (full ^ host, host)
}

/// Network and host masks for an IPv4 prefix
pub fn masks_v4(prefix: u8) -> (u32, u32) {
    let prefix = u32::from(prefix).min(32);
    let host = u32::MAX.checked_shr(prefix).unwrap_or(0);
    (!host, host)
}

/// Network and host masks for an IPv6 prefix
pub fn masks_v6(prefix: u8) -> (u128, u128) {
    let prefix = u32::from(prefix).min(128);
    let host = u128::MAX.checked_shr(prefix).unwrap_or(0);
    (!host, host)
}
