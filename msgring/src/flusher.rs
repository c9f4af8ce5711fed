use crate::{config::Config, publisher::Publisher, MessageRing};
use anyhow::Context;
use log::{debug, info, warn};
use parking_lot::{Condvar, Mutex};
use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// Drains a shared [`MessageRing`] on a background thread and hands each batch to a
/// [`Publisher`].
///
/// The thread wakes every `flush_interval`, or earlier when [`notify`](Self::notify) is
/// called, and drains everything live at that moment in batches of `batch_size`.
/// Dropping the flusher stops the thread after one last flush.
pub struct Flusher<T: Send + 'static> {
    shared: Arc<Shared<T>>,
    handle: Option<JoinHandle<()>>,
}

struct Shared<T> {
    ring: Arc<MessageRing<T>>,
    publisher: Mutex<Box<dyn Publisher<T>>>,
    batch_size: usize,
    // A full ring also counts as a full batch; `None` for a zero-capacity ring.
    wake_at: Option<usize>,
    flush_interval: Duration,
    signal: Mutex<Signal>,
    wakeup: Condvar,
}

#[derive(Default)]
struct Signal {
    notified: bool,
    shutdown: bool,
}

impl<T: Send + 'static> Flusher<T> {
    /// Start flushing `ring` into `publisher`.
    pub fn spawn(
        ring: Arc<MessageRing<T>>,
        config: &Config,
        publisher: impl Publisher<T>,
    ) -> anyhow::Result<Self> {
        config.validate()?;

        let wake_at = match config.batch_size.min(ring.capacity()) {
            0 => None,
            n => Some(n),
        };
        let shared = Arc::new(Shared {
            ring,
            publisher: Mutex::new(Box::new(publisher)),
            batch_size: config.batch_size,
            wake_at,
            flush_interval: config.flush_interval,
            signal: Mutex::new(Signal::default()),
            wakeup: Condvar::new(),
        });

        let handle = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("msgring-flusher".to_string())
                .spawn(move || shared.run())
                .context("failed to spawn flusher thread")?
        };

        info!(
            "flusher started (capacity {}, batch size {}, interval {:?})",
            shared.ring.capacity(),
            shared.batch_size,
            shared.flush_interval
        );

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    pub fn ring(&self) -> &Arc<MessageRing<T>> {
        &self.shared.ring
    }

    /// Push into the ring, waking the flusher once a full batch is waiting or the ring
    /// is full.
    pub fn push(&self, msg: T) {
        self.shared.ring.push(msg);
        if let Some(wake_at) = self.shared.wake_at {
            if self.shared.ring.len() >= wake_at {
                self.notify();
            }
        }
    }

    /// Wake the background thread now instead of at the end of its interval.
    pub fn notify(&self) {
        self.shared.signal.lock().notified = true;
        self.shared.wakeup.notify_one();
    }

    /// Drain and publish everything currently live from the calling thread.
    ///
    /// Returns how many messages the publisher accepted.
    pub fn flush(&self) -> usize {
        self.shared.flush()
    }

    /// Stop the background thread, flushing whatever is left first.
    pub fn shutdown(mut self) -> anyhow::Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.shared.signal.lock().shutdown = true;
        self.shared.wakeup.notify_one();
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("flusher thread panicked"))?;

        info!("flusher stopped");
        Ok(())
    }
}

impl<T: Send + 'static> Drop for Flusher<T> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!("{err:#}");
        }
    }
}

impl<T: Send + 'static> Shared<T> {
    fn run(&self) {
        loop {
            let shutdown = {
                let mut signal = self.signal.lock();
                if !signal.notified && !signal.shutdown {
                    self.wakeup.wait_for(&mut signal, self.flush_interval);
                }
                signal.notified = false;
                signal.shutdown
            };

            self.flush();

            if shutdown {
                break;
            }
        }
    }

    fn flush(&self) -> usize {
        let mut publisher = self.publisher.lock();

        // Bounded by what is live now so busy producers can't keep us here forever.
        let mut remaining = self.ring.len();
        let mut published = 0;
        while remaining > 0 {
            let batch = self.ring.drain_batch(self.batch_size.min(remaining));
            if batch.is_empty() {
                break;
            }

            let len = batch.len();
            remaining = remaining.saturating_sub(len);
            match publisher.publish(batch) {
                Ok(()) => {
                    debug!("published batch of {len} messages");
                    published += len;
                }
                Err(err) => warn!("dropping batch of {len} messages: {err:#}"),
            }
        }
        published
    }
}
