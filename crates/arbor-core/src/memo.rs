//! Compute-once slots for derived views
//!
//! A [`Memo`] is an explicit optional slot: it is checked on every access,
//! filled by the first successful computation, and shared through an `Arc`
//! afterwards. A failed computation leaves the slot empty.

use std::sync::Arc;

#[derive(Debug)]
pub struct Memo<T> {
    slot: Option<Arc<T>>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { slot: None }
    }
}

impl<T> Memo<T> {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the value has been computed
    pub fn is_filled(&self) -> bool {
        self.slot.is_some()
    }

    /// The stored value, if computed
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.clone()
    }

    /// Return the stored value, computing it with `init` on first access
    pub fn get_or_try_init<E, F>(&mut self, init: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = &self.slot {
            return Ok(Arc::clone(value));
        }
        let value = Arc::new(init()?);
        self.slot = Some(Arc::clone(&value));
        Ok(value)
    }

    /// Infallible variant of [`Memo::get_or_try_init`]
    pub fn get_or_init<F>(&mut self, init: F) -> Arc<T>
    where
        F: FnOnce() -> T,
    {
        match self.get_or_try_init::<std::convert::Infallible, _>(|| Ok(init())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}
