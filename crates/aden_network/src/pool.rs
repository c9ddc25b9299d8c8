//! Pooled encryption buffers for the write path.

use std::sync::Arc;

use parking_lot::Mutex;

use aden_protocol::codec::{HEADER_SIZE, PAD};

/// A free list of write buffers sized for the configured payload cap.
/// Leases larger than the cap are served by a one-off allocation that is
/// not pooled on return. A buffer is only reusable once its lease drops,
/// which happens after the transport write completes.
pub struct BufferPool {
    free: Mutex<Vec<Vec<u8>>>,
    /// Largest payload a pooled buffer can frame.
    payload_cap: usize,
    /// Upper bound on retained buffers; extras are dropped on return.
    max_pooled: usize,
}

impl BufferPool {
    pub fn new(payload_cap: usize, max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            payload_cap,
            max_pooled,
        }
    }

    pub fn payload_cap(&self) -> usize {
        self.payload_cap
    }

    fn buf_len(&self) -> usize {
        HEADER_SIZE + self.payload_cap + PAD
    }

    /// Leases a buffer able to frame a payload of `payload_len` bytes,
    /// headroom included.
    pub fn lease(self: &Arc<Self>, payload_len: usize) -> Lease {
        if payload_len > self.payload_cap {
            return Lease {
                buf: vec![0; HEADER_SIZE + payload_len + PAD],
                pool: None,
            };
        }

        let buf = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| vec![0; self.buf_len()]);

        Lease {
            buf,
            pool: Some(self.clone()),
        }
    }

    fn put_back(&self, buf: Vec<u8>) {
        let mut free = self.free.lock();

        if free.len() < self.max_pooled {
            free.push(buf);
        }
    }

    #[cfg(test)]
    fn pooled(&self) -> usize {
        self.free.lock().len()
    }
}

/// An exclusive buffer checkout. Returns to the pool on drop.
pub struct Lease {
    buf: Vec<u8>,
    pool: Option<Arc<BufferPool>>,
}

impl std::ops::Deref for Lease {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl std::ops::DerefMut for Lease {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buf
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.put_back(std::mem::take(&mut self.buf));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leases_recycle_after_drop() {
        let pool = Arc::new(BufferPool::new(1024, 8));

        let a = pool.lease(100);
        let b = pool.lease(100);
        assert_eq!(pool.pooled(), 0);

        drop(a);
        drop(b);
        assert_eq!(pool.pooled(), 2);

        let _c = pool.lease(100);
        assert_eq!(pool.pooled(), 1);
    }

    #[test]
    fn an_outstanding_lease_is_never_shared() {
        let pool = Arc::new(BufferPool::new(64, 8));

        let mut a = pool.lease(10);
        a[2] = 0xAA;

        let b = pool.lease(10);
        // Distinct allocations while both leases live.
        assert_ne!(a.as_ptr(), b.as_ptr());
    }

    #[test]
    fn oversized_payloads_bypass_the_pool() {
        let pool = Arc::new(BufferPool::new(64, 8));

        let big = pool.lease(1000);
        assert!(big.len() >= 1000 + HEADER_SIZE);

        drop(big);
        assert_eq!(pool.pooled(), 0);
    }

    #[test]
    fn headroom_covers_framing() {
        let pool = Arc::new(BufferPool::new(64, 8));
        let lease = pool.lease(64);
        assert!(lease.len() >= HEADER_SIZE + 64 + PAD);
    }
}
