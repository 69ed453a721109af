//! Single-slot transposition table.
//!
//! Replacement is last-write-wins: a store always overwrites its slot, with
//! no depth preference and no aging. Slots are shared by every key with the
//! same low bits, so a probe only trusts an entry whose full key matches.

use crate::board::Move;
use crate::search::eval::{MATE_SCORE, MAX_PLY};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    /// Fail-high: the true score is at least `score`.
    Lower,
    /// Fail-low: the true score is at most `score`.
    Upper,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub bound: Bound,
}

pub const DEFAULT_ENTRIES: usize = 1 << 16;

pub struct Tt {
    slots: Vec<Option<Entry>>,
    mask: usize,
}

impl Default for Tt {
    fn default() -> Self {
        Self::with_capacity_entries(DEFAULT_ENTRIES)
    }
}

impl Tt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rounds `entries` up to a power of two.
    pub fn with_capacity_entries(entries: usize) -> Self {
        let size = entries.max(1).next_power_of_two();
        Self { slots: vec![None; size], mask: size - 1 }
    }

    /// Largest power-of-two table that fits in `mb` megabytes.
    pub fn with_capacity_mb(mb: usize) -> Self {
        let bytes = mb.max(1).saturating_mul(1024 * 1024);
        let fit = (bytes / std::mem::size_of::<Option<Entry>>()).max(1);
        let size = if fit.is_power_of_two() { fit } else { fit.next_power_of_two() >> 1 };
        Self::with_capacity_entries(size)
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        (key as usize) & self.mask
    }

    pub fn probe(&self, key: u64) -> Option<Entry> {
        self.slots[self.index(key)].filter(|e| e.key == key)
    }

    pub fn store(&mut self, key: u64, best: Option<Move>, depth: u32, score: i32, bound: Bound) {
        let idx = self.index(key);
        self.slots[idx] = Some(Entry { key, depth, score, best, bound });
    }
}

/// Mate scores are stored relative to the node, not the root.
pub fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE - MAX_PLY {
        score + ply
    } else if score <= -(MATE_SCORE - MAX_PLY) {
        score - ply
    } else {
        score
    }
}

pub fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score >= MATE_SCORE - MAX_PLY {
        score - ply
    } else if score <= -(MATE_SCORE - MAX_PLY) {
        score + ply
    } else {
        score
    }
}
