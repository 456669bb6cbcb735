//! Request generations for discarding superseded responses.
//!
//! Each load or filter change takes a new ticket before it awaits the
//! network. When the response arrives, the handler applies it only if no newer
//! ticket has been issued in the meantime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Generation {
    counter: Arc<AtomicU64>,
}

/// Proof of which generation a request belongs to.
#[derive(Debug, Clone)]
pub struct Ticket {
    value: u64,
    counter: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, superseding every outstanding ticket.
    pub fn advance(&self) -> Ticket {
        let value = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            value,
            counter: Arc::clone(&self.counter),
        }
    }

    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl Ticket {
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.value
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}
