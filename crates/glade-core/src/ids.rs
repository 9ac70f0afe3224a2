//! Monotonic identifier newtypes.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation number of a published representation page.
///
/// Incremented on every page commit. Consumers can poll it to detect
/// whether a new generation of data has been published since they last
/// looked, without touching the page contents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageSerial(pub u64);

impl fmt::Display for PageSerial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for PageSerial {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`SubscriberId`] allocation.
static SUBSCRIBER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Opaque token identifying one event subscription.
///
/// Returned by the registry's subscribe operations and required to
/// unsubscribe. Allocated from a process-wide monotonic counter via
/// [`SubscriberId::next`], so tokens from different subscriber lists
/// never collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Allocate a fresh, unique subscriber token. Thread-safe.
    pub fn next() -> Self {
        Self(SUBSCRIBER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
