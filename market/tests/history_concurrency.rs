//! Concurrent stress tests for `PriceHistory`.
//!
//! A single writer appends the monotonic sequence 1, 2, 3, ... while several
//! readers take snapshots. Any torn read would show up as a gap or a
//! reordering in a snapshot, or as a status whose fields disagree.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use market::PriceHistory;

const CAPACITY: usize = 256;
const WRITES: u64 = 50_000;
const READERS: usize = 4;

fn assert_contiguous(snapshot: &[f64]) {
    for w in snapshot.windows(2) {
        assert_eq!(
            w[1] - w[0],
            1.0,
            "snapshot is not a contiguous run: {:?}",
            &snapshot[..snapshot.len().min(8)]
        );
    }
}

#[test]
fn snapshots_are_contiguous_under_concurrent_appends() {
    let history = Arc::new(PriceHistory::new(CAPACITY));
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..READERS)
        .map(|r| {
            let history = Arc::clone(&history);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let want = 50 + r * 60;
                let mut last_seen = 0.0;
                let mut reads = 0u64;

                while !done.load(Ordering::Acquire) {
                    let snap = history.read_last(want);
                    assert!(snap.len() <= want);
                    assert_contiguous(&snap);

                    // Time never runs backwards for a single reader.
                    if let Some(&newest) = snap.last() {
                        assert!(newest >= last_seen);
                        last_seen = newest;
                    }
                    reads += 1;
                }
                reads
            })
        })
        .collect();

    let writer = {
        let history = Arc::clone(&history);
        thread::spawn(move || {
            for v in 1..=WRITES {
                history.append(v as f64);
            }
        })
    };

    writer.join().unwrap();
    done.store(true, Ordering::Release);

    for r in readers {
        assert!(r.join().unwrap() > 0);
    }

    let tail = history.read_last(CAPACITY);
    assert_eq!(tail.len(), CAPACITY);
    assert_eq!(tail[0], (WRITES - CAPACITY as u64 + 1) as f64);
    assert_eq!(*tail.last().unwrap(), WRITES as f64);
}

#[test]
fn status_fields_never_disagree() {
    let history = Arc::new(PriceHistory::new(CAPACITY));
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let history = Arc::clone(&history);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let s = history.status();
                let writes = s.current_price as usize;

                assert_eq!(s.size, CAPACITY);
                assert_eq!(s.write_index, writes % CAPACITY);
                assert_eq!(s.count, writes.min(CAPACITY));
            }
        })
    };

    for v in 1..=WRITES {
        history.append(v as f64);
    }
    done.store(true, Ordering::Release);
    observer.join().unwrap();

    assert_eq!(history.filled_count(), CAPACITY);
}

#[test]
fn snapshot_cursor_matches_its_newest_price() {
    let history = Arc::new(PriceHistory::new(CAPACITY));
    let done = Arc::new(AtomicBool::new(false));

    let observer = {
        let history = Arc::clone(&history);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::Acquire) {
                let snap = history.snapshot(64);
                let writes = snap.prices.last().copied().unwrap_or(0.0) as usize;

                assert_eq!(snap.write_index, writes % CAPACITY);
                assert_contiguous(&snap.prices);
            }
        })
    };

    for v in 1..=WRITES {
        history.append(v as f64);
    }
    done.store(true, Ordering::Release);
    observer.join().unwrap();
}

#[test]
fn several_producers_share_one_history() {
    // Each producer writes its own arithmetic sequence; per-producer order
    // must survive the interleaving.
    let history = Arc::new(PriceHistory::new(4_096));

    let producers: Vec<_> = (0..4u64)
        .map(|id| {
            let history = Arc::clone(&history);
            thread::spawn(move || {
                for k in 0..1_000u64 {
                    history.append((id * 1_000_000 + k) as f64);
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }

    let all = history.read_last(4_096);
    assert_eq!(all.len(), 4_000);

    for id in 0..4u64 {
        let own: Vec<f64> = all
            .iter()
            .copied()
            .filter(|&v| (v as u64) / 1_000_000 == id)
            .collect();
        assert_eq!(own.len(), 1_000);
        assert!(own.windows(2).all(|w| w[1] > w[0]));
    }
}
