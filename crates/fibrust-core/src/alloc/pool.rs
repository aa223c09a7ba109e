//! Size-classed pooled allocator for word buffers (§4.2.1).
//!
//! Geometric size classes from 64 words up to 16M words. `acquire`
//! returns a buffer of exactly the requested length, cleared to zero;
//! dropping the returned guard clears and returns it to the pool. Sizes
//! that don't fit any class fall straight through to the system
//! allocator on release (the guard simply drops its `Vec`).

use std::sync::OnceLock;

use parking_lot::Mutex;

/// Geometric size classes, in machine words.
pub const SIZE_CLASSES: [usize; 10] = [
    64,
    256,
    1_024,
    4_096,
    16_384,
    65_536,
    262_144,
    1_048_576,
    4_194_304,
    16_777_216,
];

/// Free buffers retained per class before further releases are dropped
/// to the system allocator instead of growing the pool unboundedly.
const MAX_FREE_PER_CLASS: usize = 8;

pub struct WordPool {
    free: Vec<Mutex<Vec<Vec<u64>>>>,
}

impl WordPool {
    fn new() -> Self {
        WordPool {
            free: SIZE_CLASSES.iter().map(|_| Mutex::new(Vec::new())).collect(),
        }
    }

    fn class_for(size: usize) -> Option<usize> {
        SIZE_CLASSES.iter().position(|&c| c >= size)
    }

    pub fn acquire(&'static self, size: usize) -> PoolGuard {
        match Self::class_for(size) {
            Some(class) => {
                let mut buf = {
                    let mut list = self.free[class].lock();
                    list.pop()
                }
                .unwrap_or_else(|| vec![0u64; SIZE_CLASSES[class]]);
                for w in buf.iter_mut() {
                    *w = 0;
                }
                buf.resize(size, 0);
                PoolGuard {
                    pool: self,
                    class: Some(class),
                    buf: Some(buf),
                }
            }
            None => PoolGuard {
                pool: self,
                class: None,
                buf: Some(vec![0u64; size]),
            },
        }
    }

    fn release(&self, class: usize, mut buf: Vec<u64>) {
        buf.clear();
        buf.resize(SIZE_CLASSES[class], 0);
        let mut list = self.free[class].lock();
        if list.len() < MAX_FREE_PER_CLASS {
            list.push(buf);
        }
        // else: drop it, bounding total pooled memory regardless of call count.
    }

    /// Pre-fills the free list of every class up to (and including) the
    /// one covering `max_words` with `count` buffers. Used by
    /// [`crate::alloc::ensure_warmed`].
    pub fn prewarm(&'static self, max_words: usize, count: usize) {
        let limit = Self::class_for(max_words).unwrap_or(SIZE_CLASSES.len() - 1);
        for class in 0..=limit {
            let mut list = self.free[class].lock();
            while list.len() < count.min(MAX_FREE_PER_CLASS) {
                list.push(vec![0u64; SIZE_CLASSES[class]]);
            }
        }
    }

    pub fn total_pooled_words(&self) -> usize {
        self.free
            .iter()
            .enumerate()
            .map(|(class, list)| list.lock().len() * SIZE_CLASSES[class])
            .sum()
    }
}

static POOL: OnceLock<WordPool> = OnceLock::new();

pub fn global() -> &'static WordPool {
    POOL.get_or_init(WordPool::new)
}

/// Move-only guard owning a pooled (or, for oversized requests,
/// system-allocated) word buffer. Returns the buffer to the pool on
/// drop, per §9's "acquire -> guard, guard owns the buffer, returns it
/// on drop" ownership model.
pub struct PoolGuard {
    pool: &'static WordPool,
    class: Option<usize>,
    buf: Option<Vec<u64>>,
}

impl PoolGuard {
    pub fn as_slice(&self) -> &[u64] {
        self.buf.as_ref().unwrap()
    }

    pub fn as_mut_slice(&mut self) -> &mut [u64] {
        self.buf.as_mut().unwrap()
    }

    pub fn len(&self) -> usize {
        self.buf.as_ref().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detaches the buffer without returning it to the pool, e.g. to
    /// hand ownership to a [`crate::bigint::BigUint`].
    pub fn take(mut self) -> Vec<u64> {
        self.buf.take().unwrap()
    }
}

impl std::ops::Deref for PoolGuard {
    type Target = [u64];
    fn deref(&self) -> &[u64] {
        self.as_slice()
    }
}

impl std::ops::DerefMut for PoolGuard {
    fn deref_mut(&mut self) -> &mut [u64] {
        self.as_mut_slice()
    }
}

impl Drop for PoolGuard {
    fn drop(&mut self) {
        if let (Some(class), Some(buf)) = (self.class, self.buf.take()) {
            self.pool.release(class, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_returns_zeroed_exact_length() {
        let pool = global();
        let mut guard = pool.acquire(100);
        assert_eq!(guard.len(), 100);
        assert!(guard.as_slice().iter().all(|&w| w == 0));
        guard.as_mut_slice()[0] = 42;
        assert_eq!(guard.as_slice()[0], 42);
    }

    #[test]
    fn release_then_acquire_is_zeroed() {
        let pool = global();
        {
            let mut guard = pool.acquire(64);
            guard.as_mut_slice().fill(0xFF);
        }
        let guard = pool.acquire(64);
        assert!(guard.as_slice().iter().all(|&w| w == 0));
    }

    #[test]
    fn oversized_request_not_pooled() {
        let pool = global();
        let before = pool.total_pooled_words();
        {
            let _guard = pool.acquire(SIZE_CLASSES[SIZE_CLASSES.len() - 1] + 1);
        }
        let after = pool.total_pooled_words();
        assert_eq!(before, after);
    }

    #[test]
    fn pool_discipline_bounded_after_many_calls() {
        let pool = global();
        for _ in 0..(MAX_FREE_PER_CLASS * 3) {
            let _guard = pool.acquire(256);
        }
        let class = WordPool::class_for(256).unwrap();
        let len = pool.free[class].lock().len();
        assert!(len <= MAX_FREE_PER_CLASS);
    }
}
