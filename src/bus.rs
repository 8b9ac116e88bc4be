//! Mutual exclusion for a bus shared by several devices.
//!
//! A display locks the bus for the whole of each drawing call, so operations from different
//! execution contexts interleave only between calls, never between the command and data phases
//! of one. Access is scoped to a closure, which releases the lock on every way out of it.

use core::cell::RefCell;

/// A lock around a bus. `lock` blocks until the bus is free, then runs `f` with exclusive access.
pub trait BusMutex {
    type Bus;

    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R;
}

/// For a bus used from a single execution context. Locking while already locked panics.
impl<T> BusMutex for RefCell<T> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        f(&mut self.borrow_mut())
    }
}

/// A bus shared between tasks without an OS. Critical sections are only entered to take the
/// bus out of its slot and to put it back; the drawing call itself runs with interrupts enabled,
/// so a transport may wait on a completion flag set from an interrupt handler.
///
/// A context that finds the bus taken spins until it is returned. Never lock from an interrupt
/// handler that can preempt the holder: the holder cannot run to return the bus.
pub struct SharedBus<T> {
    slot: critical_section::Mutex<RefCell<Option<T>>>,
}

impl<T> SharedBus<T> {
    pub const fn new(bus: T) -> Self {
        SharedBus {
            slot: critical_section::Mutex::new(RefCell::new(Some(bus))),
        }
    }

    /// Take the bus back. `None` only if a holder panicked without unwinding.
    pub fn into_inner(self) -> Option<T> {
        self.slot.into_inner().into_inner()
    }

    fn claim(&self) -> Claimed<'_, T> {
        loop {
            let taken = critical_section::with(|cs| self.slot.borrow_ref_mut(cs).take());
            if let Some(bus) = taken {
                return Claimed {
                    slot: &self.slot,
                    bus: Some(bus),
                };
            }
            core::hint::spin_loop();
        }
    }
}

/// A bus taken out of its slot. Returns it on drop, including while unwinding.
struct Claimed<'a, T> {
    slot: &'a critical_section::Mutex<RefCell<Option<T>>>,
    bus: Option<T>,
}

impl<T> Drop for Claimed<'_, T> {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.take() {
            critical_section::with(|cs| *self.slot.borrow_ref_mut(cs) = Some(bus));
        }
    }
}

impl<T> BusMutex for SharedBus<T> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut claimed = self.claim();
        match claimed.bus.as_mut() {
            Some(bus) => f(bus),
            None => unreachable!("claimed bus missing"),
        }
    }
}

/// For a bus shared between threads. A drawing call that panicked poisons the mutex; the bus is
/// still handed out afterwards, since the next call re-establishes the panel state it needs.
#[cfg(feature = "std")]
impl<T> BusMutex for std::sync::Mutex<T> {
    type Bus = T;

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        let mut guard = match std::sync::Mutex::lock(self) {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}
