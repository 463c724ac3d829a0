//! Exclusive access to a bus. Acquisition never waits: a held bus means [`crate::Error::Busy`].

use core::{cell::RefCell, ops::DerefMut};

pub trait Mutex {
    type Item;
    fn new(item: Self::Item) -> Self;
    fn try_lock(&self) -> Option<impl DerefMut<Target = Self::Item>>;
}

/// Single-context sharing: a borrow still alive from an outer call reads as busy.
impl<T> Mutex for RefCell<T> {
    type Item = T;

    #[inline(always)]
    fn new(item: T) -> Self {
        RefCell::new(item)
    }

    #[inline(always)]
    fn try_lock(&self) -> Option<impl DerefMut<Target = T>> {
        self.try_borrow_mut().ok()
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> Mutex for std::sync::Mutex<T> {
    type Item = T;

    #[inline(always)]
    fn new(item: T) -> Self {
        std::sync::Mutex::new(item)
    }

    #[inline]
    fn try_lock(&self) -> Option<impl DerefMut<Target = T>> {
        match std::sync::Mutex::try_lock(self) {
            Ok(guard) => Some(guard),
            Err(std::sync::TryLockError::WouldBlock) => None,
            // Exchanges leave nothing half-written in the bus, so a panicked holder is harmless.
            Err(std::sync::TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        }
    }
}
