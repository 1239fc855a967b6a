//! Mutual-exclusion primitives built up in stages over one semaphore.
//!
//! Each type adds one mechanism to the previous one, ending at a mutex
//! with the shape production runtimes converge on:
//!
//! - [`SemaMutex`]: the semaphore's single permit is the lock.
//! - [`FlagMutex`]: an atomic flag decides ownership; the semaphore parks.
//! - [`SpinMutex`]: spin briefly before paying for a sleep.
//! - [`WaiterMutex`]: count sleepers so unlock only wakes when one exists.
//! - [`WokenMutex`]: a woken bit stops duplicate wakeups.
//! - [`RequeueMutex`]: repeat sleepers rejoin the queue at the front.
//! - [`FairMutex`]: starvation mode hands the lock to the longest waiter.
//!
//! All of them expose raw `lock`/`unlock` (plus `try_lock` from
//! [`FlagMutex`] on); [`FairMutex`] additionally implements
//! [`lock_api::RawMutex`], so [`Mutex`] gives guarded data with RAII
//! unlock. None of the types are `Clone`: a mutex that has been used must
//! not be duplicated, and the owned atomics enforce that in the type
//! system.

mod basic;
mod fair;
mod runtime;
mod waiters;

pub use crate::basic::{FlagMutex, SemaMutex, SpinMutex};
pub use crate::fair::{FairMutex, Mutex, MutexGuard};
pub use crate::runtime::Semaphore;
pub use crate::waiters::{RequeueMutex, WaiterMutex, WokenMutex};
