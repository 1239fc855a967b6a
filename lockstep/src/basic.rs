//! The first rungs of the ladder: sleep on the semaphore alone, then keep
//! the lock in an atomic flag and use the semaphore only for parking, then
//! spin briefly before each sleep.

use crate::runtime::{self, Semaphore};
use std::sync::atomic::{AtomicU32, Ordering};

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;

/// Semaphore-only mutex: the single permit is the lock.
pub struct SemaMutex {
    sema: Semaphore,
}

impl SemaMutex {
    pub const fn new() -> Self {
        SemaMutex {
            sema: Semaphore::new(1),
        }
    }

    /// Blocks until the permit, and with it the mutex, is held.
    pub fn lock(&self) {
        self.sema.acquire(false);
    }

    /// Returns the permit. Calling this without holding the mutex breaks it.
    pub fn unlock(&self) {
        self.sema.release(false);
    }
}

impl Default for SemaMutex {
    fn default() -> Self {
        SemaMutex::new()
    }
}

/// Atomic-flag mutex: ownership is decided by a swap on the flag, and the
/// semaphore only parks the losers. Every unlock releases a permit, so an
/// uncontended unlock banks one a future contender will burn through.
pub struct FlagMutex {
    locked: AtomicU32,
    sema: Semaphore,
}

impl FlagMutex {
    pub const fn new() -> Self {
        FlagMutex {
            locked: AtomicU32::new(UNLOCKED),
            sema: Semaphore::new(0),
        }
    }

    /// Acquires the mutex without blocking, returning whether it did.
    pub fn try_lock(&self) -> bool {
        self.locked.swap(LOCKED, Ordering::Acquire) == UNLOCKED
    }

    pub fn lock(&self) {
        while self.locked.swap(LOCKED, Ordering::Acquire) != UNLOCKED {
            self.sema.acquire(false);
        }
    }

    pub fn unlock(&self) {
        self.locked.store(UNLOCKED, Ordering::Release);
        self.sema.release(false);
    }
}

impl Default for FlagMutex {
    fn default() -> Self {
        FlagMutex::new()
    }
}

/// [`FlagMutex`] plus adaptive spinning: a contender retries the swap a few
/// times at the cost of a short busy-wait before it pays for a sleep.
pub struct SpinMutex {
    locked: AtomicU32,
    sema: Semaphore,
}

impl SpinMutex {
    pub const fn new() -> Self {
        SpinMutex {
            locked: AtomicU32::new(UNLOCKED),
            sema: Semaphore::new(0),
        }
    }

    pub fn try_lock(&self) -> bool {
        self.locked.swap(LOCKED, Ordering::Acquire) == UNLOCKED
    }

    pub fn lock(&self) {
        if self.try_lock() {
            return;
        }
        let mut iter = 0;
        loop {
            if runtime::can_spin(iter) {
                runtime::spin();
                iter += 1;
            } else {
                self.sema.acquire(false);
                iter = 0;
            }
            if self.locked.swap(LOCKED, Ordering::Acquire) == UNLOCKED {
                return;
            }
        }
    }

    pub fn unlock(&self) {
        self.locked.store(UNLOCKED, Ordering::Release);
        self.sema.release(false);
    }
}

impl Default for SpinMutex {
    fn default() -> Self {
        SpinMutex::new()
    }
}
