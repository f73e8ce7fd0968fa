//! Backend liveness flag.
//!
//! A single boolean cell with one writer and many readers. The writer half
//! ([`LivenessSetter`]) is not `Clone`, so whoever owns it (the connectivity
//! monitor) is the only component able to change the flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Read side of the liveness flag. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Liveness {
    flag: Arc<AtomicBool>,
}

impl Liveness {
    /// Result of the most recent probe.
    pub fn is_live(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// Write side of the liveness flag.
#[derive(Debug)]
pub struct LivenessSetter {
    flag: Arc<AtomicBool>,
}

impl LivenessSetter {
    /// Store `live` and return the previous value.
    pub fn set(&self, live: bool) -> bool {
        self.flag.swap(live, Ordering::AcqRel)
    }

    /// A reader observing this setter's flag.
    pub fn reader(&self) -> Liveness {
        Liveness {
            flag: Arc::clone(&self.flag),
        }
    }
}

/// Create a connected setter/reader pair starting at `initial`.
pub fn liveness_pair(initial: bool) -> (LivenessSetter, Liveness) {
    let flag = Arc::new(AtomicBool::new(initial));
    (
        LivenessSetter {
            flag: Arc::clone(&flag),
        },
        Liveness { flag },
    )
}
