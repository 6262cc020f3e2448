use std::sync::atomic::{AtomicI64, Ordering};

use comercio_core::id::Code;

/// Monotonic integer code allocator shared by a repository. Codes are
/// unique per process; persistent deployments seed the sequence from
/// the highest stored code at startup.
#[derive(Debug)]
pub struct CodeSequence {
    next: AtomicI64,
}

impl CodeSequence {
    pub fn starting_at(first: i64) -> Self {
        Self {
            next: AtomicI64::new(first),
        }
    }

    pub fn allocate<C: Code>(&self) -> C {
        C::new(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Bumps the sequence so the next allocation is past `seen`.
    pub fn observe(&self, seen: i64) {
        self.next.fetch_max(seen + 1, Ordering::Relaxed);
    }
}

impl Default for CodeSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
