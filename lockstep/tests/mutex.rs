use lockstep::{FairMutex, FlagMutex, RequeueMutex, SemaMutex, SpinMutex, WaiterMutex, WokenMutex};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const THREADS: usize = 8;
const OPS: u64 = if cfg!(miri) { 100 } else { 10_000 };

struct Counter<M> {
    mu: M,
    value: UnsafeCell<u64>,
}

unsafe impl<M: Sync> Sync for Counter<M> {}

// Exclusion and progress shared by every variant: the counter under the
// lock ends up exactly at threads * ops.
macro_rules! mutex_tests {
    ($name:ident, $ty:ty) => {
        mod $name {
            use super::*;

            #[test]
            fn exclusion() {
                let c = Counter {
                    mu: <$ty>::new(),
                    value: UnsafeCell::new(0),
                };
                thread::scope(|s| {
                    for _ in 0..THREADS {
                        let c = &c;
                        s.spawn(move || {
                            for _ in 0..OPS {
                                c.mu.lock();
                                unsafe { *c.value.get() += 1 };
                                c.mu.unlock();
                            }
                        });
                    }
                });
                assert_eq!(unsafe { *c.value.get() }, THREADS as u64 * OPS);
            }

            #[test]
            fn uncontended() {
                let mu = <$ty>::new();
                for _ in 0..3 {
                    mu.lock();
                    mu.unlock();
                }
            }
        }
    };
}

// Hammer for the variants with try_lock: single-thread consistency first,
// then ten threads mixing lock and try_lock.
macro_rules! try_lock_tests {
    ($name:ident, $ty:ty) => {
        mod $name {
            use super::*;

            #[test]
            fn try_lock_consistency() {
                let mu = <$ty>::new();
                mu.lock();
                assert!(!mu.try_lock(), "try_lock succeeded with mutex locked");
                mu.unlock();
                assert!(mu.try_lock(), "try_lock failed with mutex unlocked");
                mu.unlock();
            }

            #[test]
            fn hammer() {
                let mu = <$ty>::new();
                thread::scope(|s| {
                    for _ in 0..10 {
                        s.spawn(|| {
                            for i in 0..1000 {
                                if i % 3 == 0 {
                                    if mu.try_lock() {
                                        mu.unlock();
                                    }
                                } else {
                                    mu.lock();
                                    mu.unlock();
                                }
                            }
                        });
                    }
                });
            }
        }
    };
}

mutex_tests!(sema, SemaMutex);
mutex_tests!(flag, FlagMutex);
mutex_tests!(spin, SpinMutex);
mutex_tests!(waiters, WaiterMutex);
mutex_tests!(woken, WokenMutex);
mutex_tests!(requeue, RequeueMutex);
mutex_tests!(fair, FairMutex);

try_lock_tests!(flag_try, FlagMutex);
try_lock_tests!(spin_try, SpinMutex);
try_lock_tests!(waiters_try, WaiterMutex);
try_lock_tests!(woken_try, WokenMutex);
try_lock_tests!(requeue_try, RequeueMutex);
try_lock_tests!(fair_try, FairMutex);

// A waiter that has slept past the starvation threshold must keep getting
// the lock handed over even while another thread hogs it.
#[test]
fn fairness() {
    let mu = FairMutex::new();
    let stop = AtomicBool::new(false);
    let (done_tx, done_rx) = mpsc::channel();

    thread::scope(|s| {
        let mu = &mu;
        s.spawn(|| {
            while !stop.load(Ordering::Relaxed) {
                mu.lock();
                thread::sleep(Duration::from_micros(100));
                mu.unlock();
            }
        });
        s.spawn(move || {
            for _ in 0..10 {
                thread::sleep(Duration::from_micros(100));
                mu.lock();
                mu.unlock();
            }
            done_tx.send(()).unwrap();
        });

        let starved = done_rx.recv_timeout(Duration::from_secs(10)).is_err();
        stop.store(true, Ordering::Relaxed);
        assert!(!starved, "can't acquire mutex in 10 seconds");
    });
}

#[test]
#[should_panic(expected = "unlock of unlocked mutex")]
fn unlock_unlocked_waiters() {
    WaiterMutex::new().unlock();
}

#[test]
#[should_panic(expected = "unlock of unlocked mutex")]
fn unlock_unlocked_woken() {
    WokenMutex::new().unlock();
}

#[test]
#[should_panic(expected = "unlock of unlocked mutex")]
fn unlock_unlocked_requeue() {
    RequeueMutex::new().unlock();
}

#[test]
#[should_panic(expected = "unlock of unlocked mutex")]
fn unlock_unlocked_fair() {
    FairMutex::new().unlock();
}

// The lock_api seam: guarded data with RAII unlock over the fair mutex.
#[test]
fn guarded_counter() {
    let mu = lockstep::Mutex::new(0u64);
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..OPS {
                    *mu.lock() += 1;
                }
            });
        }
    });
    assert_eq!(*mu.lock(), THREADS as u64 * OPS);
}
