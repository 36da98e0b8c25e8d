//! In-flight limiter
//!
//! Counting semaphore used when the datagram service is configured with
//! `max_in_flight`. Without it, handler fan-out is unbounded.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

/// Bounds the number of concurrently running handlers
#[derive(Debug)]
pub struct InFlightLimit {
    /// Handlers currently holding a permit
    active: Mutex<usize>,

    /// Signalled whenever a permit is released
    released: Condvar,

    capacity: usize,
}

impl InFlightLimit {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(0),
            released: Condvar::new(),
            capacity,
        })
    }

    /// Block until a slot is free, then take it
    pub fn acquire(self: &Arc<Self>) -> Permit {
        let mut active = self.active.lock();
        while *active >= self.capacity {
            self.released.wait(&mut active);
        }
        *active += 1;

        Permit {
            limit: Arc::clone(self),
        }
    }

    /// Number of permits currently held
    pub fn active(&self) -> usize {
        *self.active.lock()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Slot held by one running handler; released on drop
#[derive(Debug)]
pub struct Permit {
    limit: Arc<InFlightLimit>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        let mut active = self.limit.active.lock();
        *active -= 1;
        self.limit.released.notify_one();
    }
}
