//! Contention benchmark over the mutex progression, with std::sync::Mutex
//! as the baseline: every thread hammers lock/unlock around a trivial
//! critical section and the fastest trial wins.

use lockstep::{FairMutex, FlagMutex, RequeueMutex, SemaMutex, SpinMutex, WaiterMutex, WokenMutex};
use std::hint;
use std::sync::Mutex as StdMutex;
use std::thread;
use std::time::{Duration, Instant};

const THREADS: usize = 4;
const OPS: usize = if cfg!(miri) { 100 } else { 50_000 };
const TRIALS: usize = if cfg!(miri) { 1 } else { 4 };

trait Lock: Sync {
    fn cycle(&self);
}

macro_rules! impl_lock {
    ($($ty:ident)*) => {
        $(impl Lock for $ty {
            fn cycle(&self) {
                self.lock();
                hint::black_box(());
                self.unlock();
            }
        })*
    };
}

impl_lock!(SemaMutex FlagMutex SpinMutex WaiterMutex WokenMutex RequeueMutex FairMutex);

impl Lock for StdMutex<()> {
    fn cycle(&self) {
        let guard = self.lock().unwrap();
        hint::black_box(());
        drop(guard);
    }
}

fn hammer(m: &dyn Lock) -> Duration {
    let begin = Instant::now();
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..OPS {
                    m.cycle();
                }
            });
        }
    });
    begin.elapsed()
}

fn measure(name: &str, m: &dyn Lock) {
    let mut duration = Duration::MAX;
    for _trial in 0..TRIALS {
        duration = Ord::min(duration, hammer(m));
    }
    println!(
        "{name:16} {:8.2} ns/op ({THREADS} threads)",
        duration.as_secs_f64() * 1e9 / (THREADS * OPS) as f64,
    );
}

fn main() {
    measure("sema", &SemaMutex::new());
    measure("flag", &FlagMutex::new());
    measure("spin", &SpinMutex::new());
    measure("waiters", &WaiterMutex::new());
    measure("woken", &WokenMutex::new());
    measure("requeue", &RequeueMutex::new());
    measure("fair", &FairMutex::new());
    measure("std", &StdMutex::new(()));
}
