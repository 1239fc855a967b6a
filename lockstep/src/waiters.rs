//! Counting variants: the state word tracks sleepers so unlock only pays
//! for a wakeup when somebody is actually asleep. The woken bit then stops
//! an unlocker and a spinning contender from double-spending a permit, and
//! LIFO requeue keeps a repeat sleeper near the front of the queue.

use crate::runtime::{self, Semaphore};
use std::sync::atomic::{AtomicI32, Ordering};

pub(crate) const LOCKED: i32 = 1 << 0;
pub(crate) const WOKEN: i32 = 1 << 1;
pub(crate) const STARVING: i32 = 1 << 2;
pub(crate) const WAITER_SHIFT: u32 = 3;
pub(crate) const WAITER: i32 = 1 << WAITER_SHIFT;

/// Mutex with a waiter count packed next to the lock bit. An arriving
/// thread may still barge in ahead of the queue; the count only makes
/// unlock precise about when a wakeup is owed.
pub struct WaiterMutex {
    state: AtomicI32,
    sema: Semaphore,
}

impl WaiterMutex {
    pub const fn new() -> Self {
        WaiterMutex {
            state: AtomicI32::new(0),
            sema: Semaphore::new(0),
        }
    }

    /// Acquires the mutex without blocking, returning whether it did.
    pub fn try_lock(&self) -> bool {
        let old = self.state.load(Ordering::Relaxed);
        if old & LOCKED != 0 {
            return false;
        }
        self.state
            .compare_exchange(old, old | LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn lock(&self) {
        if self
            .state
            .compare_exchange(0, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return;
        }
        self.lock_slow();
    }

    #[cold]
    fn lock_slow(&self) {
        let mut iter = 0;
        let mut old = self.state.load(Ordering::Relaxed);
        loop {
            if old & LOCKED != 0 && runtime::can_spin(iter) {
                runtime::spin();
                iter += 1;
                old = self.state.load(Ordering::Relaxed);
                continue;
            }

            let mut new = old | LOCKED;
            if old & LOCKED != 0 {
                new += WAITER;
            }
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    if old & LOCKED == 0 {
                        return; // took the lock
                    }
                    self.sema.acquire(false);
                    iter = 0;
                    old = self.state.load(Ordering::Relaxed);
                }
                Err(cur) => old = cur,
            }
        }
    }

    /// # Panics
    ///
    /// Panics when the mutex is not locked.
    pub fn unlock(&self) {
        let new = self.state.fetch_sub(LOCKED, Ordering::Release) - LOCKED;
        if new != 0 {
            self.unlock_slow(new);
        }
    }

    #[cold]
    fn unlock_slow(&self, mut new: i32) {
        if (new + LOCKED) & LOCKED == 0 {
            panic!("unlock of unlocked mutex");
        }
        let mut old = new;
        loop {
            // Nobody is asleep, or somebody barged in and the wakeup is
            // now their problem.
            if old >> WAITER_SHIFT == 0 || old & LOCKED != 0 {
                return;
            }
            new = old - WAITER;
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    self.sema.release(false);
                    return;
                }
                Err(cur) => old = cur,
            }
        }
    }
}

impl Default for WaiterMutex {
    fn default() -> Self {
        WaiterMutex::new()
    }
}

/// [`WaiterMutex`] plus a woken bit. A spinning contender announces itself
/// so that unlock skips the wakeup, and unlock marks its wakeup so that no
/// second unlock releases a permit nobody asked for. Without the bit the
/// two paths can push the semaphore past one permit.
pub struct WokenMutex {
    state: AtomicI32,
    sema: Semaphore,
}

impl WokenMutex {
    pub const fn new() -> Self {
        WokenMutex {
            state: AtomicI32::new(0),
            sema: Semaphore::new(0),
        }
    }

    pub fn try_lock(&self) -> bool {
        let old = self.state.load(Ordering::Relaxed);
        if old & LOCKED != 0 {
            return false;
        }
        self.state
            .compare_exchange(old, old | LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn lock(&self) {
        if self
            .state
            .compare_exchange(0, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return;
        }
        self.lock_slow();
    }

    #[cold]
    fn lock_slow(&self) {
        let mut awoke = false;
        let mut iter = 0;
        let mut old = self.state.load(Ordering::Relaxed);
        loop {
            if old & LOCKED != 0 && runtime::can_spin(iter) {
                // Announce the spin so the holder's unlock skips its wakeup.
                if !awoke
                    && old & WOKEN == 0
                    && old >> WAITER_SHIFT != 0
                    && self
                        .state
                        .compare_exchange(old, old | WOKEN, Ordering::Relaxed, Ordering::Relaxed)
                        .is_ok()
                {
                    awoke = true;
                }
                runtime::spin();
                iter += 1;
                old = self.state.load(Ordering::Relaxed);
                continue;
            }

            let mut new = old | LOCKED;
            if old & LOCKED != 0 {
                new += WAITER;
            }
            if awoke {
                // This thread owns the woken bit; drop it along with
                // whatever this iteration commits to.
                if new & WOKEN == 0 {
                    panic!("inconsistent mutex state");
                }
                new &= !WOKEN;
            }
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    if old & LOCKED == 0 {
                        return;
                    }
                    self.sema.acquire(false);
                    awoke = true;
                    iter = 0;
                    old = self.state.load(Ordering::Relaxed);
                }
                Err(cur) => old = cur,
            }
        }
    }

    /// # Panics
    ///
    /// Panics when the mutex is not locked.
    pub fn unlock(&self) {
        let new = self.state.fetch_sub(LOCKED, Ordering::Release) - LOCKED;
        if new != 0 {
            self.unlock_slow(new);
        }
    }

    #[cold]
    fn unlock_slow(&self, mut new: i32) {
        if (new + LOCKED) & LOCKED == 0 {
            panic!("unlock of unlocked mutex");
        }
        let mut old = new;
        loop {
            // No sleepers, a barger took over, or a spinner is already
            // awake and will take the lock.
            if old >> WAITER_SHIFT == 0 || old & (LOCKED | WOKEN) != 0 {
                return;
            }
            new = (old - WAITER) | WOKEN;
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    self.sema.release(false);
                    return;
                }
                Err(cur) => old = cur,
            }
        }
    }
}

impl Default for WokenMutex {
    fn default() -> Self {
        WokenMutex::new()
    }
}

/// [`WokenMutex`] plus LIFO requeue: a thread going back to sleep after
/// losing a wakeup race rejoins the semaphore queue at the front, trimming
/// the tail latency of the unluckiest waiters.
pub struct RequeueMutex {
    state: AtomicI32,
    sema: Semaphore,
}

impl RequeueMutex {
    pub const fn new() -> Self {
        RequeueMutex {
            state: AtomicI32::new(0),
            sema: Semaphore::new(0),
        }
    }

    pub fn try_lock(&self) -> bool {
        let old = self.state.load(Ordering::Relaxed);
        if old & LOCKED != 0 {
            return false;
        }
        self.state
            .compare_exchange(old, old | LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    pub fn lock(&self) {
        if self
            .state
            .compare_exchange(0, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            return;
        }
        self.lock_slow();
    }

    #[cold]
    fn lock_slow(&self) {
        let mut queued = false;
        let mut awoke = false;
        let mut iter = 0;
        let mut old = self.state.load(Ordering::Relaxed);
        loop {
            if old & LOCKED != 0 && runtime::can_spin(iter) {
                if !awoke
                    && old & WOKEN == 0
                    && old >> WAITER_SHIFT != 0
                    && self
                        .state
                        .compare_exchange(old, old | WOKEN, Ordering::Relaxed, Ordering::Relaxed)
                        .is_ok()
                {
                    awoke = true;
                }
                runtime::spin();
                iter += 1;
                old = self.state.load(Ordering::Relaxed);
                continue;
            }

            let mut new = old | LOCKED;
            if old & LOCKED != 0 {
                new += WAITER;
            }
            if awoke {
                if new & WOKEN == 0 {
                    panic!("inconsistent mutex state");
                }
                new &= !WOKEN;
            }
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    if old & LOCKED == 0 {
                        return;
                    }
                    // Repeat sleepers go to the front of the queue.
                    self.sema.acquire(queued);
                    queued = true;
                    awoke = true;
                    iter = 0;
                    old = self.state.load(Ordering::Relaxed);
                }
                Err(cur) => old = cur,
            }
        }
    }

    /// # Panics
    ///
    /// Panics when the mutex is not locked.
    pub fn unlock(&self) {
        let new = self.state.fetch_sub(LOCKED, Ordering::Release) - LOCKED;
        if new != 0 {
            self.unlock_slow(new);
        }
    }

    #[cold]
    fn unlock_slow(&self, mut new: i32) {
        if (new + LOCKED) & LOCKED == 0 {
            panic!("unlock of unlocked mutex");
        }
        let mut old = new;
        loop {
            if old >> WAITER_SHIFT == 0 || old & (LOCKED | WOKEN) != 0 {
                return;
            }
            new = (old - WAITER) | WOKEN;
            match self
                .state
                .compare_exchange(old, new, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    self.sema.release(false);
                    return;
                }
                Err(cur) => old = cur,
            }
        }
    }
}

impl Default for RequeueMutex {
    fn default() -> Self {
        RequeueMutex::new()
    }
}
