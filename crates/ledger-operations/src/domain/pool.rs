//! # Processor Pools
//!
//! Typed free-lists for processors. `acquire` hands out a `Pooled` guard;
//! `close` resets the object and returns it to the pool exactly once.
//! Dropping an unclosed guard closes it, so early returns never leak.

use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Clears per-operation state before an object is reused.
pub trait Reset {
    fn reset(&mut self);
}

pub struct Pool<T: Reset + Default> {
    free: Mutex<Vec<T>>,
    capacity: usize,
}

impl<T: Reset + Default> Pool<T> {
    /// Pool keeping at most `capacity` idle objects.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn acquire(&self) -> Pooled<'_, T> {
        let value = self.free.lock().pop().unwrap_or_default();
        Pooled {
            pool: self,
            value,
            closed: false,
        }
    }

    /// Idle objects currently held.
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    fn release(&self, mut value: T) {
        value.reset();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(value);
        }
    }
}

/// An object borrowed from a `Pool`.
pub struct Pooled<'a, T: Reset + Default> {
    pool: &'a Pool<T>,
    value: T,
    closed: bool,
}

impl<T: Reset + Default> Pooled<'_, T> {
    /// Reset and return the object. Later calls are no-ops; the guard then
    /// derefs to a fresh default value.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let value = std::mem::take(&mut self.value);
        self.pool.release(value);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl<T: Reset + Default> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Reset + Default> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: Reset + Default> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.close();
    }
}
