use msgring::MessageRing;
use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Barrier,
};
use std::thread;

const PRODUCERS: u64 = 4;
const DRAINERS: usize = 2;
const PER_PRODUCER: u64 = 20_000;

fn id(producer: u64, seq: u64) -> u64 {
    (producer << 32) | seq
}

#[test]
fn concurrent_push_and_drain_stay_consistent() {
    let ring = Arc::new(MessageRing::new(64));
    let done = Arc::new(AtomicBool::new(false));
    let start = Arc::new(Barrier::new(PRODUCERS as usize + DRAINERS));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let ring = Arc::clone(&ring);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                for seq in 0..PER_PRODUCER {
                    ring.push(id(p, seq));
                }
            })
        })
        .collect();

    let drainers: Vec<_> = (0..DRAINERS)
        .map(|_| {
            let ring = Arc::clone(&ring);
            let done = Arc::clone(&done);
            let start = Arc::clone(&start);
            thread::spawn(move || {
                start.wait();
                let mut drained = Vec::new();
                while !done.load(Ordering::Acquire) {
                    drained.extend(ring.drain_batch(16));
                    let len = ring.len();
                    assert!(len <= ring.capacity());
                }
                drained
            })
        })
        .collect();

    for h in producers {
        h.join().unwrap();
    }
    done.store(true, Ordering::Release);
    let per_drainer: Vec<Vec<u64>> = drainers.into_iter().map(|h| h.join().unwrap()).collect();

    let leftover = ring.drain_batch(usize::MAX);
    assert!(ring.is_empty());

    // Each drainer sees every producer's messages in the order they were pushed.
    for drained in per_drainer.iter().chain(std::iter::once(&leftover)) {
        for p in 0..PRODUCERS {
            let seqs: Vec<u64> = drained
                .iter()
                .filter(|m| *m >> 32 == p)
                .map(|m| m & 0xffff_ffff)
                .collect();
            assert!(seqs.windows(2).all(|w| w[0] < w[1]));
        }
    }

    let mut seen = HashSet::new();
    for msg in per_drainer.iter().flatten().chain(&leftover) {
        assert!(seen.insert(*msg), "message {msg:#x} delivered twice");
    }

    let stats = ring.stats();
    assert_eq!(stats.inserted, PRODUCERS * PER_PRODUCER);
    assert_eq!(stats.drained, seen.len() as u64);
    assert_eq!(stats.live, 0);
    assert_eq!(stats.inserted, stats.drained + stats.evicted);
}

#[test]
fn concurrent_overwrite_keeps_capacity() {
    let ring = Arc::new(MessageRing::new(8));
    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for seq in 0..1_000 {
                    ring.push(id(p, seq));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert!(ring.is_full());
    let batch = ring.drain_batch(100);
    assert_eq!(batch.len(), 8);

    let stats = ring.stats();
    assert_eq!(stats.evicted, PRODUCERS * 1_000 - 8);
    assert_eq!(stats.inserted, stats.drained + stats.evicted);
}

#[test]
fn zero_capacity_under_contention() {
    let ring = Arc::new(MessageRing::<u64>::new(0));
    let handles: Vec<_> = (0..PRODUCERS)
        .map(|p| {
            let ring = Arc::clone(&ring);
            thread::spawn(move || {
                for seq in 0..1_000 {
                    ring.push(id(p, seq));
                    assert!(ring.drain_batch(4).is_empty());
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(ring.len(), 0);

    let stats = ring.stats();
    assert_eq!(stats.capacity, 0);
    assert_eq!(stats.drained, 0);
    assert_eq!(stats.inserted, PRODUCERS * 1_000);
    assert_eq!(stats.inserted, stats.evicted);
}
