//! The full protocol: everything the counting variants do, plus a
//! starvation mode that trades throughput for latency once a waiter has
//! gone hungry too long. While starving, ownership travels from unlock
//! straight to the front of the queue and arriving threads cannot barge in.

use crate::runtime::{self, Semaphore};
use crate::waiters::{LOCKED, STARVING, WAITER, WAITER_SHIFT, WOKEN};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{Duration, Instant};

// How long a waiter may sleep before the lock flips to starvation mode.
const STARVATION_THRESHOLD: Duration = Duration::from_millis(1);

/// Mutex with two modes. In the normal mode waiters queue but an arriving
/// thread may win the lock ahead of them, which is good for throughput. A
/// waiter that has slept longer than a millisecond flips the mutex into
/// starvation mode, where every unlock hands the mutex to the waiter at the
/// front of the queue and neither `lock` nor `try_lock` can cut the line.
pub struct FairMutex {
    state: AtomicI32,
    sema: Semaphore,
}

impl FairMutex {
    pub const fn new() -> Self {
        FairMutex {
            state: AtomicI32::new(0),
            sema: Semaphore::new(0),
        }
    }

    /// Acquires the mutex without blocking, returning whether it did.
    /// Always fails in starvation mode; queued waiters go first.
    pub fn try_lock(&self) -> bool {
        let old = self.state.load(Ordering::Relaxed);
        if old & (LOCKED | STARVING) != 0 {
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
        let mut wait_start: Option<Instant> = None;
        let mut starving = false;
        let mut awoke = false;
        let mut iter = 0;
        let mut old = self.state.load(Ordering::Relaxed);
        loop {
            // Spinning makes no sense in starvation mode: the lock is
            // handed off and cannot be grabbed in passing.
            if old & (LOCKED | STARVING) == LOCKED && runtime::can_spin(iter) {
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

            let mut new = old;
            // Don't try to take a starving mutex; queue behind its owner.
            if old & STARVING == 0 {
                new |= LOCKED;
            }
            if old & (LOCKED | STARVING) != 0 {
                new += WAITER;
            }
            // A starving waiter raises the flag for everyone.
            if starving && old & LOCKED != 0 {
                new |= STARVING;
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
                    if old & (LOCKED | STARVING) == 0 {
                        return; // took the lock
                    }
                    let queued = wait_start.is_some();
                    let start = *wait_start.get_or_insert_with(Instant::now);
                    self.sema.acquire(queued);
                    starving = starving || start.elapsed() > STARVATION_THRESHOLD;
                    old = self.state.load(Ordering::Relaxed);
                    if old & STARVING != 0 {
                        // Ownership was handed off: the unlocker left the
                        // waiter count alone, so settle the books here.
                        // One waiter fewer, the lock bit back on, and
                        // starvation over once the queue drains or this
                        // waiter is no longer hungry.
                        if old & (LOCKED | WOKEN) != 0 || old >> WAITER_SHIFT == 0 {
                            panic!("inconsistent mutex state");
                        }
                        let mut delta = LOCKED - WAITER;
                        if !starving || old >> WAITER_SHIFT == 1 {
                            delta -= STARVING;
                        }
                        self.state.fetch_add(delta, Ordering::AcqRel);
                        return;
                    }
                    awoke = true;
                    iter = 0;
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
        if new & STARVING == 0 {
            let mut old = new;
            loop {
                if old >> WAITER_SHIFT == 0 || old & (LOCKED | WOKEN | STARVING) != 0 {
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
        } else {
            // Hand the permit, and with it the mutex, straight to the
            // front waiter. The waiter fixes up the state on its way out
            // of the semaphore.
            self.sema.release(true);
        }
    }
}

impl Default for FairMutex {
    fn default() -> Self {
        FairMutex::new()
    }
}

unsafe impl lock_api::RawMutex for FairMutex {
    const INIT: FairMutex = FairMutex::new();
    type GuardMarker = lock_api::GuardSend;

    #[inline]
    fn lock(&self) {
        FairMutex::lock(self);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        FairMutex::try_lock(self)
    }

    #[inline]
    unsafe fn unlock(&self) {
        FairMutex::unlock(self);
    }
}

/// Data guarded by a [`FairMutex`], with RAII unlock.
pub type Mutex<T> = lock_api::Mutex<FairMutex, T>;

/// Guard returned by [`Mutex::lock`].
pub type MutexGuard<'a, T> = lock_api::MutexGuard<'a, FairMutex, T>;
