//! Reusable scratch buffers for building column lists.
//!
//! Acquire, populate, copy out, release: a [`PooledBuffer`] is cleared and
//! handed back to its pool when dropped, so it never outlives the call that
//! acquired it.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// Default number of idle buffers kept for reuse.
const DEFAULT_MAX_IDLE: usize = 16;

/// A thread-safe pool of `String` scratch buffers.
#[derive(Debug)]
pub struct BufferPool {
    idle: Mutex<Vec<String>>,
    max_idle: usize,
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

impl BufferPool {
    /// Creates a pool that keeps at most `max_idle` buffers between uses.
    pub fn new(max_idle: usize) -> Self {
        BufferPool {
            idle: Mutex::new(Vec::new()),
            max_idle,
        }
    }

    /// Takes an empty buffer, reusing an idle one when available.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buf = match self.idle.lock() {
            Ok(mut idle) => idle.pop(),
            // a panic while holding the lock leaves only plain Strings behind
            Err(poisoned) => poisoned.into_inner().pop(),
        };
        PooledBuffer {
            buf: buf.unwrap_or_default(),
            pool: self,
        }
    }

    /// Number of buffers currently idle.
    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn release(&self, mut buf: String) {
        buf.clear();
        if let Ok(mut idle) = self.idle.lock() {
            if idle.len() < self.max_idle {
                idle.push(buf);
            }
        }
    }
}

/// A buffer on loan from a [`BufferPool`].
pub struct PooledBuffer<'a> {
    buf: String,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = String;

    fn deref(&self) -> &String {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}
