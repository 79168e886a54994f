use std::cell::OnceCell;

/// A derived value that is recomputed lazily after its source changes.
///
/// The value is either stale (empty) or fresh. Reading a stale value runs the supplied
/// computation once and keeps the result until [`Cached::invalidate`] is called. Reads
/// only need `&self`, so views can share a grid while still filling its caches; the
/// interior cell makes the owner `!Sync`.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    value: OnceCell<T>,
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh value, computing it first if stale.
    pub fn get_or_update(&self, compute: impl FnOnce() -> T) -> &T {
        self.value.get_or_init(compute)
    }

    /// Mark the value stale.
    pub fn invalidate(&mut self) {
        self.value.take();
    }

    /// Store a value already known to be current.
    pub fn set(&mut self, value: T) {
        self.value = OnceCell::from(value);
    }

    pub fn is_fresh(&self) -> bool {
        self.value.get().is_some()
    }
}
