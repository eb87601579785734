//! Zeroing free-list of encode buffers.
//!
//! Encoded v3 messages pass through plaintext scoped PDUs, so a buffer is
//! wiped before it goes back on the list.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use zeroize::Zeroize;

use crate::metrics::{CodecMetrics, NoopMetrics};

/// Default number of buffers kept on the free-list.
pub const DEFAULT_POOL_CAPACITY: usize = 20;

/// Initial capacity of a freshly allocated buffer.
const DEFAULT_BUFFER_SIZE: usize = 1500;

/// Bounded free-list of `Vec<u8>` buffers.
///
/// ```
/// use snmp_wire::pool::BufferPool;
///
/// let pool = BufferPool::new(4);
/// {
///     let mut buf = pool.checkout();
///     buf.extend_from_slice(b"secret");
/// }
/// assert_eq!(pool.available(), 1);
/// assert!(pool.checkout().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BufferPool {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    free: Mutex<Vec<Vec<u8>>>,
    capacity: usize,
    metrics: Arc<dyn CodecMetrics>,
}

impl BufferPool {
    /// Create a pool keeping at most `capacity` idle buffers.
    pub fn new(capacity: usize) -> Self {
        Self::with_metrics(capacity, Arc::new(NoopMetrics))
    }

    /// Create a pool reporting hits and misses to `metrics`.
    pub fn with_metrics(capacity: usize, metrics: Arc<dyn CodecMetrics>) -> Self {
        Self {
            inner: Arc::new(Inner {
                free: Mutex::new(Vec::with_capacity(capacity)),
                capacity,
                metrics,
            }),
        }
    }

    /// Take a buffer, allocating one if the list is empty.
    pub fn checkout(&self) -> PooledBuf {
        let reused = self.inner.free.lock().ok().and_then(|mut free| free.pop());
        let buf = match reused {
            Some(buf) => {
                self.inner.metrics.buffer_reused();
                buf
            }
            None => {
                self.inner.metrics.buffer_allocated();
                Vec::with_capacity(DEFAULT_BUFFER_SIZE)
            }
        };
        PooledBuf {
            buf,
            pool: Arc::clone(&self.inner),
        }
    }

    /// Take a buffer with room for at least `len` bytes.
    ///
    /// The buffer grows while still empty, so writes up to `len` never
    /// reallocate and leave an unwiped copy in a freed block.
    pub fn checkout_with_capacity(&self, len: usize) -> PooledBuf {
        let mut buf = self.checkout();
        buf.reserve(len);
        buf
    }

    /// Number of idle buffers on the list.
    pub fn available(&self) -> usize {
        self.inner.free.lock().map(|free| free.len()).unwrap_or(0)
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY)
    }
}

/// A checked-out buffer. Zeroed and returned to the pool on drop.
#[derive(Debug)]
pub struct PooledBuf {
    buf: Vec<u8>,
    pool: Arc<Inner>,
}

impl Deref for PooledBuf {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        let mut buf = std::mem::take(&mut self.buf);
        // wipes the full capacity, not just the length
        buf.zeroize();
        if buf.capacity() == 0 {
            return;
        }
        if let Ok(mut free) = self.pool.free.lock()
            && free.len() < self.pool.capacity
        {
            free.push(buf);
        }
    }
}
