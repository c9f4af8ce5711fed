use msgring::{Config, Flusher};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

static PUBLISHED: AtomicUsize = AtomicUsize::new(0);

fn producers(flusher: &Arc<Flusher<String>>, n: usize, num_thread: usize) -> anyhow::Result<()> {
    let mut handles = vec![];
    for i in 0..num_thread {
        let flusher = Arc::clone(flusher);
        let h = std::thread::Builder::new()
            .name(format!("producer {i}"))
            .spawn(move || {
                for seq in 0..n / num_thread {
                    flusher.push(format!("producer {i} message {seq}"));
                }
            })?;
        handles.push(h);
    }
    for h in handles {
        h.join()
            .map_err(|_| anyhow::anyhow!("producer thread panicked"))?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let _logger = flexi_logger::Logger::try_with_str("info")?.start()?;

    let config = Config::default()
        .with_capacity(4096)
        .with_batch_size(256)
        .with_flush_interval(Duration::from_millis(20));
    let flusher = Arc::new(Flusher::spawn(
        Arc::new(config.ring::<String>()),
        &config,
        |batch: Vec<String>| {
            // Stand-in for a network client.
            PUBLISHED.fetch_add(batch.len(), Ordering::Relaxed);
            anyhow::Ok(())
        },
    )?);

    let num_messages = 1_000_000;
    let num_threads = 4;
    let now = std::time::Instant::now();
    producers(&flusher, num_messages, num_threads)?;
    println!("producers done!");

    flusher.flush();
    let dur = now.elapsed();

    let stats = flusher.ring().stats();
    println!("published: {}", PUBLISHED.load(Ordering::Relaxed));
    println!("evicted: {}", stats.evicted);
    println!("dur: {:?}", &dur);

    match Arc::try_unwrap(flusher) {
        Ok(flusher) => flusher.shutdown(),
        Err(_) => anyhow::bail!("flusher still shared"),
    }
}
