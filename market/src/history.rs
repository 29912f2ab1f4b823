//! Bounded Price History
//!
//! A fixed-capacity circular buffer of price samples shared between the feed
//! tasks that write ticks and the analysis tasks that read snapshots.
//!
//! ## Locking
//! Cursor, fill count and the sample array sit behind a single
//! `parking_lot::RwLock`:
//! - `append` holds the write guard for one slot write + cursor bump.
//! - readers hold the read guard only while copying their snapshot out.
//!
//! Analysis never runs under the lock, so concurrent analyses only contend
//! with writers for the duration of a `memcpy`.
//!
//! ## Snapshot consistency
//! A `read_last` call observes every append that completed before it took
//! the read guard and none that started after. It can never see a
//! half-applied append (sample written, cursor not yet advanced).

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ring size used by the service when none is configured.
pub const DEFAULT_CAPACITY: usize = 1_000;

/// Point-in-time view of the ring's bookkeeping, as rendered by status endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    /// Next slot to be written.
    pub write_index: usize,
    /// Number of valid samples (saturates at `size`).
    pub count: usize,
    /// Fixed capacity.
    pub size: usize,
    /// Most recent sample, `0.0` when empty.
    pub current_price: f64,
}

/// Samples copied out of a history together with the cursor they were read at.
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySnapshot {
    /// Oldest first.
    pub prices: Vec<f64>,
    /// Next slot to be written when the copy was taken.
    pub write_index: usize,
}

struct Ring {
    samples: Vec<f64>,
    write_cursor: usize,
    filled: usize,
}

impl Ring {
    fn latest(&self) -> f64 {
        if self.filled == 0 {
            return 0.0;
        }
        let cap = self.samples.len();
        self.samples[(self.write_cursor + cap - 1) % cap]
    }
}

/// Fixed-capacity circular price buffer, safe to share behind an `Arc`.
pub struct PriceHistory {
    capacity: usize,
    inner: RwLock<Ring>,
}

impl PriceHistory {
    /// Create an empty history. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: RwLock::new(Ring {
                samples: vec![0.0; capacity],
                write_cursor: 0,
                filled: 0,
            }),
        }
    }

    /// Record one price, overwriting the oldest sample once full.
    pub fn append(&self, price: f64) {
        let mut g = self.inner.write();

        let slot = g.write_cursor;
        g.samples[slot] = price;
        g.write_cursor = (slot + 1) % self.capacity;
        if g.filled < self.capacity {
            g.filled += 1;
        }
    }

    /// Copy of the most recent `min(n, filled)` samples, oldest first.
    pub fn read_last(&self, n: usize) -> Vec<f64> {
        self.snapshot(n).prices
    }

    /// Like `read_last`, paired with the write cursor taken under the same
    /// read guard.
    pub fn snapshot(&self, n: usize) -> HistorySnapshot {
        let requested = n;
        let g = self.inner.read();

        let n = n.min(g.filled);
        let start = (g.write_cursor + self.capacity - n) % self.capacity;

        let mut prices = Vec::with_capacity(n);
        if start + n <= self.capacity {
            prices.extend_from_slice(&g.samples[start..start + n]);
        } else {
            let head = self.capacity - start;
            prices.extend_from_slice(&g.samples[start..]);
            prices.extend_from_slice(&g.samples[..n - head]);
        }
        let write_index = g.write_cursor;
        drop(g);

        debug!(requested, returned = prices.len(), "history snapshot taken");
        HistorySnapshot {
            prices,
            write_index,
        }
    }

    /// Most recently appended price, or `0.0` before the first append.
    pub fn current_price(&self) -> f64 {
        self.inner.read().latest()
    }

    /// Fixed capacity.
    pub fn size(&self) -> usize {
        self.capacity
    }

    pub fn filled_count(&self) -> usize {
        self.inner.read().filled
    }

    pub fn write_cursor(&self) -> usize {
        self.inner.read().write_cursor
    }

    /// Cursor, count and current price read under one guard.
    pub fn status(&self) -> HistoryStatus {
        let g = self.inner.read();
        HistoryStatus {
            write_index: g.write_cursor,
            count: g.filled,
            size: self.capacity,
            current_price: g.latest(),
        }
    }
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(capacity: usize, prices: &[f64]) -> PriceHistory {
        let h = PriceHistory::new(capacity);
        for &p in prices {
            h.append(p);
        }
        h
    }

    #[test]
    fn empty_history_reads_nothing() {
        let h = PriceHistory::new(8);

        assert!(h.read_last(5).is_empty());
        assert_eq!(h.current_price(), 0.0);
        assert_eq!(h.filled_count(), 0);
        assert_eq!(h.write_cursor(), 0);
        assert_eq!(h.size(), 8);
    }

    #[test]
    fn read_last_clamps_to_filled() {
        let h = filled(8, &[1.0, 2.0, 3.0]);

        assert_eq!(h.read_last(10), vec![1.0, 2.0, 3.0]);
        assert_eq!(h.read_last(2), vec![2.0, 3.0]);
        assert!(h.read_last(0).is_empty());
    }

    #[test]
    fn wraparound_keeps_chronological_order() {
        // 7 writes into 5 slots: 1 and 2 are overwritten.
        let h = filled(5, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);

        assert_eq!(h.read_last(5), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(h.read_last(3), vec![5.0, 6.0, 7.0]);
        assert_eq!(h.write_cursor(), 2);
        assert_eq!(h.current_price(), 7.0);
    }

    #[test]
    fn fill_count_saturates_at_capacity() {
        let h = PriceHistory::new(4);
        for i in 0..4 {
            h.append(i as f64);
        }
        assert_eq!(h.filled_count(), 4);

        for i in 0..37 {
            h.append(i as f64);
            assert_eq!(h.filled_count(), 4);
        }
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let h = filled(0, &[10.0, 11.0]);

        assert_eq!(h.size(), 1);
        assert_eq!(h.read_last(3), vec![11.0]);
    }

    #[test]
    fn snapshot_pairs_prices_with_cursor() {
        let h = filled(4, &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let snap = h.snapshot(3);

        assert_eq!(snap.prices, vec![3.0, 4.0, 5.0]);
        assert_eq!(snap.write_index, 1);
    }

    #[test]
    fn status_reflects_single_instant() {
        let h = filled(3, &[100.0, 101.5]);

        assert_eq!(
            h.status(),
            HistoryStatus {
                write_index: 2,
                count: 2,
                size: 3,
                current_price: 101.5,
            }
        );
    }

    #[test]
    fn status_uses_wire_field_names() {
        let h = filled(4, &[42.0]);
        let json = serde_json::to_value(h.status()).unwrap();

        assert_eq!(json["writeIndex"], 1);
        assert_eq!(json["count"], 1);
        assert_eq!(json["size"], 4);
        assert_eq!(json["currentPrice"], 42.0);
    }
}
