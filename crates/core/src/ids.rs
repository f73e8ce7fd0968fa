//! Unique id generation.
//!
//! The ingestion pipeline takes an `Arc<dyn IdGenerator>` so that production
//! code uses time-ordered random UUIDs while tests can substitute a
//! predictable sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> Uuid;
}

/// UUIDv7: 48-bit millisecond timestamp followed by 74 random bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Generator;

impl IdGenerator for UuidV7Generator {
    fn next_id(&self) -> Uuid {
        Uuid::now_v7()
    }
}

/// Deterministic generator yielding `prefix`-tagged counters 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: u64,
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: u64) -> Self {
        Self {
            prefix,
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Uuid {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        Uuid::from_u64_pair(self.prefix, n)
    }
}
