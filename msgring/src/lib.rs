//! A bounded staging area for outbound messages.
//!
//! Producers [`push`](MessageRing::push) into a fixed-capacity [`MessageRing`]; a
//! consumer periodically [`drain_batch`](MessageRing::drain_batch)es it and hands the
//! batch to whatever publishes downstream.
//!
//! ### Structure
//!
//! ```text
//! | slot | slot | slot | slot | slot | slot |
//!          ^ read               ^ write
//! ```
//!
//! * The slot array is allocated once and never resized.
//! * `read` points at the oldest live message, `write` at the next slot to fill.
//!   When they meet, a `full` flag says whether the ring is empty or full.
//! * Pushing into a full ring evicts the oldest message. Producers never block on
//!   capacity and are never told about the loss.
//! * One lock covers every operation.
//!
//! ### Flushing
//!
//! [`Flusher`] owns the consumer side: a named background thread that wakes on an
//! interval (or on [`Flusher::notify`]) and drains the ring into a [`Publisher`].
//! Batches rejected by the publisher are logged and dropped, there is no retry.
//!
//! ```no_run
//! use msgring::{Config, Flusher};
//! use std::sync::Arc;
//!
//! let config = Config::default().with_batch_size(128);
//! let ring = Arc::new(config.ring::<String>());
//! let flusher = Flusher::spawn(Arc::clone(&ring), &config, |batch: Vec<String>| {
//!     println!("sending {} messages", batch.len());
//!     anyhow::Ok(())
//! })?;
//!
//! flusher.push("hello".to_string());
//! flusher.shutdown()?;
//! # anyhow::Ok(())
//! ```

pub mod config;
pub mod flusher;
pub mod publisher;
pub mod ring_buffer;

pub use config::Config;
pub use flusher::Flusher;
pub use publisher::Publisher;
pub use ring_buffer::{MessageRing, Stats};
