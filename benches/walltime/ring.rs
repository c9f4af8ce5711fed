use std::sync::Arc;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BatchSize;
use criterion::Criterion;
use msgring::MessageRing;

fn push_harness(ring: &MessageRing<u64>, n: usize) {
    for i in 0..n {
        ring.push(i as u64);
    }
}

fn contended_push_harness(ring: &Arc<MessageRing<u64>>, n: usize, num_thread: usize) {
    let handles: Vec<_> = (0..num_thread)
        .map(|_| {
            let ring = Arc::clone(ring);
            std::thread::spawn(move || push_harness(&ring, n / num_thread))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

fn push(c: &mut Criterion) {
    let mut bgroup = c.benchmark_group("push");

    for n in &[1000, 10000, 100000] {
        // Capacity above n: no eviction.
        let ring = MessageRing::new(*n);
        bgroup.bench_function(format!("fill/{n}"), |b| {
            b.iter(|| {
                push_harness(&ring, *n);
                ring.drain_batch(*n)
            })
        });

        // Capacity far below n: nearly every push evicts.
        let ring = MessageRing::new(64);
        bgroup.bench_function(format!("overwrite/{n}"), |b| {
            b.iter(|| push_harness(&ring, *n))
        });

        let ring = Arc::new(MessageRing::new(4096));
        bgroup.bench_function(format!("contended_4_threads/{n}"), |b| {
            b.iter(|| contended_push_harness(&ring, *n, 4))
        });
    }

    bgroup.finish();
}

fn drain(c: &mut Criterion) {
    let mut bgroup = c.benchmark_group("drain");

    for batch in &[16, 256, 4096] {
        bgroup.bench_function(format!("batch/{batch}"), |b| {
            b.iter_batched(
                || {
                    let ring = MessageRing::new(16384);
                    push_harness(&ring, 16384);
                    ring
                },
                |ring| while !ring.drain_batch(*batch).is_empty() {},
                BatchSize::SmallInput,
            )
        });
    }

    bgroup.finish();
}

criterion_group!(benches, push, drain);
criterion_main!(benches);
