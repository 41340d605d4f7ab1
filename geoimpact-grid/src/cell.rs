//! 64-bit hierarchical hexagonal cell index.
//!
//! # Layout
//!
//! ```text
//!  63  62..59  58..56   55..52   51..45     44..0
//! ┌───┬───────┬───────┬────────┬─────────┬─────────────────────────┐
//! │ 0 │ mode  │ 0 0 0 │  res   │  base   │ 15 × 3-bit child digits │
//! └───┴───────┴───────┴────────┴─────────┴─────────────────────────┘
//! ```
//!
//! The digit for resolution `r` sits at bit `(15 - r) * 3`. Digits finer than
//! the cell's own resolution are all ones (7). Each hexagon has seven
//! children (digits 0..=6). The twelve pentagon base cells, and every
//! all-zero-digit descendant of them, lack the digit-1 child and have six.

use crate::error::{GridError, Result};
use geoimpact_core::MAX_RESOLUTION;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const NUM_BASE_CELLS: u8 = 122;

const PENTAGON_BASE_CELLS: [u8; 12] = [4, 14, 24, 38, 49, 58, 63, 72, 83, 97, 107, 117];

const CELL_MODE: u64 = 1;
const MODE_OFFSET: u32 = 59;
const RES_OFFSET: u32 = 52;
const BASE_OFFSET: u32 = 45;
const DIGIT_BITS: u32 = 3;

const MODE_MASK: u64 = 0xF << MODE_OFFSET;
const RES_MASK: u64 = 0xF << RES_OFFSET;
const BASE_MASK: u64 = 0x7F << BASE_OFFSET;
const DIGIT_MASK: u64 = 0b111;
const RESERVED_MASK: u64 = (1 << 63) | (0b111 << 56);
const ALL_DIGITS_UNUSED: u64 = (1 << BASE_OFFSET) - 1;

const CENTER_DIGIT: u8 = 0;
/// Digit deleted from pentagon children.
const K_AXES_DIGIT: u8 = 1;
const UNUSED_DIGIT: u8 = 7;

#[inline]
fn digit_offset(res: u8) -> u32 {
    u32::from(MAX_RESOLUTION - res) * DIGIT_BITS
}

/// A valid cell index.
///
/// Ordering is the raw integer order. Within one resolution cells sort by
/// base cell, then by digit path, which keeps siblings adjacent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(u64);

impl CellIndex {
    /// Build a cell from its base cell and digit path. The resolution is the
    /// path length.
    pub fn from_parts(base_cell: u8, digits: &[u8]) -> Result<Self> {
        if digits.len() > usize::from(MAX_RESOLUTION) {
            return Err(GridError::invalid_cell(format!(
                "digit path of length {} exceeds resolution {MAX_RESOLUTION}",
                digits.len()
            )));
        }
        let res = digits.len() as u8;
        let mut raw = (CELL_MODE << MODE_OFFSET)
            | (u64::from(res) << RES_OFFSET)
            | (u64::from(base_cell) << BASE_OFFSET)
            | ALL_DIGITS_UNUSED;
        for (i, &d) in digits.iter().enumerate() {
            let off = digit_offset(i as u8 + 1);
            raw = (raw & !(DIGIT_MASK << off)) | (u64::from(d) << off);
        }
        Self::from_raw(raw)
    }

    /// Validate a raw 64-bit index.
    pub fn from_raw(raw: u64) -> Result<Self> {
        let invalid = |why: &str| GridError::invalid_cell(format!("{raw:x}: {why}"));

        if raw & RESERVED_MASK != 0 {
            return Err(invalid("reserved bits set"));
        }
        if (raw & MODE_MASK) >> MODE_OFFSET != CELL_MODE {
            return Err(invalid("not a cell index"));
        }
        let cell = Self(raw);
        if cell.base_cell() >= NUM_BASE_CELLS {
            return Err(invalid("base cell out of range"));
        }

        let res = cell.resolution();
        let mut leading = CENTER_DIGIT;
        for r in 1..=res {
            let d = cell.digit(r);
            if d >= UNUSED_DIGIT {
                return Err(invalid("unused digit within resolution"));
            }
            if leading == CENTER_DIGIT {
                leading = d;
            }
        }
        for r in res + 1..=MAX_RESOLUTION {
            if cell.digit(r) != UNUSED_DIGIT {
                return Err(invalid("digit set beyond resolution"));
            }
        }
        if is_pentagon_base(cell.base_cell()) && leading == K_AXES_DIGIT {
            return Err(invalid("deleted pentagon subsequence"));
        }
        Ok(cell)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn resolution(self) -> u8 {
        ((self.0 & RES_MASK) >> RES_OFFSET) as u8
    }

    pub fn base_cell(self) -> u8 {
        ((self.0 & BASE_MASK) >> BASE_OFFSET) as u8
    }

    /// Digit at resolution `res` (1-based).
    pub fn digit(self, res: u8) -> u8 {
        ((self.0 >> digit_offset(res)) & DIGIT_MASK) as u8
    }

    fn with_digit(self, res: u8, digit: u8) -> Self {
        let off = digit_offset(res);
        Self((self.0 & !(DIGIT_MASK << off)) | (u64::from(digit) << off))
    }

    fn with_resolution(self, res: u8) -> Self {
        Self((self.0 & !RES_MASK) | (u64::from(res) << RES_OFFSET))
    }

    pub fn is_pentagon(self) -> bool {
        is_pentagon_base(self.base_cell())
            && (1..=self.resolution()).all(|r| self.digit(r) == CENTER_DIGIT)
    }

    /// Ancestor at `res`, or the cell itself when `res` equals its
    /// resolution. `None` when `res` is finer than the cell.
    pub fn parent(self, res: u8) -> Option<Self> {
        let own = self.resolution();
        if res > own {
            return None;
        }
        let mut cell = self.with_resolution(res);
        for r in res + 1..=own {
            cell = cell.with_digit(r, UNUSED_DIGIT);
        }
        Some(cell)
    }

    /// All descendants at `res`, sorted. Empty when `res` is coarser than the
    /// cell or beyond the maximum resolution.
    pub fn children(self, res: u8) -> Vec<Self> {
        let own = self.resolution();
        if res < own || res > MAX_RESOLUTION {
            return Vec::new();
        }
        let mut level = vec![self];
        for r in own + 1..=res {
            let mut next = Vec::with_capacity(level.len() * 7);
            for cell in &level {
                let pentagon = cell.is_pentagon();
                let base = cell.with_resolution(r);
                for d in CENTER_DIGIT..UNUSED_DIGIT {
                    if pentagon && d == K_AXES_DIGIT {
                        continue;
                    }
                    next.push(base.with_digit(r, d));
                }
            }
            level = next;
        }
        level
    }

    /// Number of descendants at `res` without materializing them.
    pub fn children_count(self, res: u8) -> u64 {
        let own = self.resolution();
        if res < own || res > MAX_RESOLUTION {
            return 0;
        }
        let depth = u32::from(res - own);
        let hexagons = 7u64.saturating_pow(depth);
        if self.is_pentagon() {
            // one pentagonal centre child per level plus five hexagon subtrees
            1 + 5 * (hexagons - 1) / 6
        } else {
            hexagons
        }
    }
}

fn is_pentagon_base(base: u8) -> bool {
    PENTAGON_BASE_CELLS.binary_search(&base).is_ok()
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl fmt::Debug for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CellIndex({:x}@{})", self.0, self.resolution())
    }
}

impl FromStr for CellIndex {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let hex = s.strip_prefix("0x").unwrap_or(s);
        let raw = u64::from_str_radix(hex, 16)
            .map_err(|e| GridError::invalid_cell(format!("{s}: {e}")))?;
        Self::from_raw(raw)
    }
}

impl TryFrom<u64> for CellIndex {
    type Error = GridError;

    fn try_from(raw: u64) -> Result<Self> {
        Self::from_raw(raw)
    }
}

impl Serialize for CellIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(base: u8, digits: &[u8]) -> CellIndex {
        CellIndex::from_parts(base, digits).unwrap()
    }

    #[test]
    fn base_cell_layout() {
        let c = cell(0, &[]);
        assert_eq!(c.raw(), 0x8001fffffffffff);
        assert_eq!(c.to_string(), "8001fffffffffff");
        assert_eq!(c.resolution(), 0);

        let c = cell(20, &[2, 6, 0]);
        assert_eq!(c.resolution(), 3);
        assert_eq!(c.base_cell(), 20);
        assert_eq!((c.digit(1), c.digit(2), c.digit(3), c.digit(4)), (2, 6, 0, 7));
    }

    #[test]
    fn rejects_malformed_indexes() {
        assert!(CellIndex::from_parts(122, &[]).is_err());
        assert!(CellIndex::from_parts(0, &[7]).is_err());
        assert!(CellIndex::from_raw(0).is_err());
        // leading digit 1 below a pentagon base cell does not exist
        assert!(CellIndex::from_parts(4, &[1]).is_err());
        assert!(CellIndex::from_parts(4, &[0, 1]).is_err());
        assert!(CellIndex::from_parts(4, &[2, 1]).is_ok());
        assert!(CellIndex::from_parts(0, &[0; 16]).is_err());
    }

    #[test]
    fn parse_and_display_agree() {
        let c = cell(37, &[3, 3, 1, 4, 5, 0]);
        let parsed: CellIndex = c.to_string().parse().unwrap();
        assert_eq!(parsed, c);
        let prefixed: CellIndex = format!("0x{c}").parse().unwrap();
        assert_eq!(prefixed, c);
        assert!("zz".parse::<CellIndex>().is_err());
    }

    #[test]
    fn parent_truncates_digits() {
        let c = cell(10, &[1, 2, 3, 4]);
        assert_eq!(c.parent(2), Some(cell(10, &[1, 2])));
        assert_eq!(c.parent(0), Some(cell(10, &[])));
        assert_eq!(c.parent(4), Some(c));
        assert_eq!(c.parent(5), None);
    }

    #[test]
    fn hexagon_has_seven_children() {
        let c = cell(10, &[3]);
        let kids = c.children(2);
        assert_eq!(kids.len(), 7);
        assert!(kids.iter().all(|k| k.parent(1) == Some(c)));
        assert_eq!(c.children(4).len(), 343);
        assert_eq!(c.children_count(4), 343);
        assert_eq!(c.children(1), vec![c]);
        assert!(c.children(0).is_empty());
    }

    #[test]
    fn pentagon_skips_deleted_digit() {
        let p = cell(4, &[]);
        assert!(p.is_pentagon());
        let kids = p.children(1);
        assert_eq!(kids.len(), 6);
        assert!(kids.iter().all(|k| k.digit(1) != K_AXES_DIGIT));

        let grandkids = p.children(2);
        assert_eq!(grandkids.len(), 6 + 5 * 7);
        assert_eq!(p.children_count(2), grandkids.len() as u64);
        assert_eq!(p.children_count(3), p.children(3).len() as u64);
        assert!(grandkids.iter().all(|k| CellIndex::from_raw(k.raw()).is_ok()));
        assert!(!cell(4, &[2]).is_pentagon());
    }

    #[test]
    fn children_are_sorted_and_unique() {
        let kids = cell(50, &[5, 5]).children(5);
        assert!(kids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn serde_as_hex_string() {
        let c = cell(2, &[1, 0, 6]);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, format!("\"{c}\""));
        let back: CellIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
    }
}
