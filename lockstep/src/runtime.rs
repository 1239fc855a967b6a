//! Runtime support for the mutexes: the semaphore contenders sleep on and
//! the oracle that decides whether spinning is still worth it.

use std::collections::VecDeque;
use std::hint;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, Thread};

const WAITING: u8 = 0;
const WOKEN: u8 = 1;
const GRANTED: u8 = 2;

struct Waiter {
    thread: Thread,
    state: AtomicU8,
}

struct Queue {
    permits: u32,
    waiters: VecDeque<Arc<Waiter>>,
}

/// Counting semaphore over parked threads.
///
/// `acquire` consumes a permit, sleeping until one arrives; `release` adds a
/// permit and wakes at most one sleeper. A sleeper woken without `handoff`
/// still has to race arriving threads for the permit and goes back to sleep
/// when it loses; with `handoff` the permit travels directly to the front of
/// the queue and nobody can snatch it. `lifo` puts a repeat sleeper at the
/// front rather than the back.
pub struct Semaphore {
    queue: Mutex<Queue>,
}

impl Semaphore {
    pub const fn new(permits: u32) -> Self {
        Semaphore {
            queue: Mutex::new(Queue {
                permits,
                waiters: VecDeque::new(),
            }),
        }
    }

    pub fn acquire(&self, lifo: bool) {
        let mut q = self.queue.lock().unwrap();
        if q.permits > 0 {
            q.permits -= 1;
            return;
        }
        let w = Arc::new(Waiter {
            thread: thread::current(),
            state: AtomicU8::new(WAITING),
        });
        push(&mut q, Arc::clone(&w), lifo);
        drop(q);

        loop {
            thread::park();
            match w.state.load(Ordering::Acquire) {
                GRANTED => return,
                WOKEN => {
                    let mut q = self.queue.lock().unwrap();
                    if q.permits > 0 {
                        q.permits -= 1;
                        return;
                    }
                    // Beaten to the permit; queue up again.
                    w.state.store(WAITING, Ordering::Relaxed);
                    push(&mut q, Arc::clone(&w), lifo);
                }
                _ => {} // spurious wakeup
            }
        }
    }

    pub fn release(&self, handoff: bool) {
        let mut q = self.queue.lock().unwrap();
        match q.waiters.pop_front() {
            Some(w) => {
                if handoff {
                    w.state.store(GRANTED, Ordering::Release);
                } else {
                    q.permits += 1;
                    w.state.store(WOKEN, Ordering::Release);
                }
                drop(q);
                w.thread.unpark();
            }
            None => q.permits += 1,
        }
    }
}

fn push(q: &mut Queue, w: Arc<Waiter>, lifo: bool) {
    if lifo {
        q.waiters.push_front(w);
    } else {
        q.waiters.push_back(w);
    }
}

// Spin attempts allowed per acquisition before giving up and sleeping.
const ACTIVE_SPIN: u32 = 4;
const SPIN_CYCLES: u32 = 30;

/// Whether a contended acquire should burn another short spin: only a
/// handful of times, and only when another core can make progress and
/// release the lock meanwhile.
pub fn can_spin(iter: u32) -> bool {
    iter < ACTIVE_SPIN && multicore()
}

/// One short busy-wait.
pub fn spin() {
    for _ in 0..SPIN_CYCLES {
        hint::spin_loop();
    }
}

fn multicore() -> bool {
    static MULTICORE: OnceLock<bool> = OnceLock::new();
    *MULTICORE.get_or_init(|| thread::available_parallelism().is_ok_and(|n| n.get() > 1))
}
