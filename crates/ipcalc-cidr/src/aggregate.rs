//! Range → CIDR aggregation
//!
//! Both bounds are walked up one bit level at a time. At level `n` the
//! bounds are indices of `2^n`-sized units. An odd lower index is a unit
//! that cannot merge with its left sibling, so it is emitted as a block and
//! the lower bound moves up; an even upper index is emitted the same way
//! from the top. When both are aligned, the bounds are halved and the walk
//! moves to level `n + 1`. The walk ends when the bounds meet, which happens
//! at the latest at level `width`.
//!
//! Each level emits at most one block per side, which gives the minimal
//! block count.

use ipcalc_core::{Address, Result, Width};
use tracing::{debug, trace};

use crate::block::CidrBlock;
use crate::range::AddressRange;

/// Minimal ascending list of CIDR blocks whose union is exactly `range`
///
/// # Examples
///
/// ```
/// use ipcalc_cidr::{aggregate, AddressRange};
///
/// let range = AddressRange::parse("10.0.0.1", "10.0.0.6").unwrap();
/// let blocks: Vec<String> = aggregate(&range).iter().map(|b| b.to_string()).collect();
/// assert_eq!(blocks, ["10.0.0.1/32", "10.0.0.2/31", "10.0.0.4/31", "10.0.0.6/32"]);
/// ```
pub fn aggregate(range: &AddressRange) -> Vec<CidrBlock> {
    let width = range.width();
    let mut lo = range.first().value();
    let mut hi = range.last().value();
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut level = 0u32;

    loop {
        trace!("level {}: units {:#x}..={:#x}", level, lo, hi);

        if lo == hi {
            head.push(unit_block(width, lo, level));
            break;
        }
        if lo & 1 == 1 {
            head.push(unit_block(width, lo, level));
            lo += 1;
        }
        if hi & 1 == 0 {
            tail.push(unit_block(width, hi, level));
            hi -= 1;
        }
        if lo > hi {
            break;
        }

        lo >>= 1;
        hi >>= 1;
        level += 1;
    }

    head.extend(tail.into_iter().rev());
    debug!(range = %range, blocks = head.len(), "range aggregated");
    head
}

/// Aggregate the range between two addresses, in either order
pub fn range_to_cidr(first: Address, last: Address) -> Result<Vec<CidrBlock>> {
    Ok(aggregate(&AddressRange::new(first, last)?))
}

/// Block for unit `index` of size `2^level`
fn unit_block(width: Width, index: u128, level: u32) -> CidrBlock {
    let base = index.checked_shl(level).unwrap_or(0);
    let prefix_len = (width.bits() - level) as u8;
    CidrBlock::from_aligned(width, base, prefix_len)
}
