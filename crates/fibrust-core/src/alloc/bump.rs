//! Bump arena for the temporaries of a single FFT invocation (§4.2.2).
//!
//! A bump arena is a single contiguous buffer with a cursor. `alloc`
//! hands out the next `n` words and advances the cursor; `reset` rewinds
//! it for reuse. Arenas never cross a thread boundary mid-FFT — parallel
//! recursion allocates its own child temporaries from [`super::pool`]
//! instead, which is why `BumpArena` carries no `Sync`-relevant state
//! beyond a plain `Vec`.

use parking_lot::Mutex;
use std::sync::OnceLock;

pub struct BumpArena {
    buf: Vec<u64>,
    used: usize,
    high_water: usize,
}

impl BumpArena {
    pub fn with_capacity(words: usize) -> Self {
        BumpArena {
            buf: vec![0u64; words],
            used: 0,
            high_water: 0,
        }
    }

    /// Returns a zeroed sub-slice of `n` words, advancing the cursor.
    /// Falls back to growing the backing buffer (a plain heap
    /// reallocation) if the arena is exhausted, so correctness never
    /// depends on having sized the arena exactly right up front.
    pub fn alloc(&mut self, n: usize) -> &mut [u64] {
        if self.used + n > self.buf.len() {
            self.buf.resize(self.used + n, 0);
        }
        let start = self.used;
        self.used += n;
        if self.used > self.high_water {
            self.high_water = self.used;
        }
        let slice = &mut self.buf[start..self.used];
        slice.fill(0);
        slice
    }

    /// Like [`Self::alloc`], but hands back two disjoint zeroed slices
    /// from one bump region so both can be borrowed mutably at once
    /// (a single `alloc` call's borrow would otherwise block a second
    /// call until the first slice's lifetime ends).
    pub fn alloc_two(&mut self, n1: usize, n2: usize) -> (&mut [u64], &mut [u64]) {
        let total = n1 + n2;
        if self.used + total > self.buf.len() {
            self.buf.resize(self.used + total, 0);
        }
        let start = self.used;
        self.used += total;
        if self.used > self.high_water {
            self.high_water = self.used;
        }
        let slice = &mut self.buf[start..self.used];
        slice.fill(0);
        slice.split_at_mut(n1)
    }

    pub fn reset(&mut self) {
        self.used = 0;
    }

    pub fn high_water_mark(&self) -> usize {
        self.high_water
    }

    pub fn capacity_words(&self) -> usize {
        self.buf.len()
    }
}

/// Arenas kept around for reuse across FFT calls, sorted loosely by
/// capacity. Bump arenas are themselves pooled (§4.2.2): rather than a
/// size-classed free list per §4.2.1, a small flat list is enough since
/// there are far fewer concurrent FFTs than word-buffer requests.
struct BumpPool {
    arenas: Mutex<Vec<BumpArena>>,
}

const MAX_POOLED_ARENAS: usize = 8;

static BUMP_POOL: OnceLock<BumpPool> = OnceLock::new();

fn pool() -> &'static BumpPool {
    BUMP_POOL.get_or_init(|| BumpPool {
        arenas: Mutex::new(Vec::new()),
    })
}

pub struct BumpGuard {
    arena: Option<BumpArena>,
}

impl BumpGuard {
    pub fn arena(&mut self) -> &mut BumpArena {
        self.arena.as_mut().unwrap()
    }
}

impl Drop for BumpGuard {
    fn drop(&mut self) {
        if let Some(mut arena) = self.arena.take() {
            arena.reset();
            let mut list = pool().arenas.lock();
            if list.len() < MAX_POOLED_ARENAS {
                list.push(arena);
            }
        }
    }
}

/// Acquires an arena with at least `min_words` of backing capacity,
/// reusing a pooled one if large enough.
pub fn acquire_bump(min_words: usize) -> BumpGuard {
    let mut list = pool().arenas.lock();
    if let Some(pos) = list.iter().position(|a| a.capacity_words() >= min_words) {
        let arena = list.swap_remove(pos);
        return BumpGuard { arena: Some(arena) };
    }
    drop(list);
    BumpGuard {
        arena: Some(BumpArena::with_capacity(min_words)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_advances_cursor_and_zeroes() {
        let mut arena = BumpArena::with_capacity(16);
        {
            let s = arena.alloc(4);
            s.copy_from_slice(&[1, 2, 3, 4]);
        }
        let s2 = arena.alloc(4);
        assert_eq!(s2, &[0, 0, 0, 0]);
        assert_eq!(arena.high_water_mark(), 8);
    }

    #[test]
    fn reset_rewinds_cursor() {
        let mut arena = BumpArena::with_capacity(8);
        arena.alloc(8);
        arena.reset();
        let s = arena.alloc(8);
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn overflow_falls_back_to_growth() {
        let mut arena = BumpArena::with_capacity(2);
        let s = arena.alloc(10);
        assert_eq!(s.len(), 10);
        assert!(arena.capacity_words() >= 10);
    }

    #[test]
    fn alloc_two_returns_disjoint_zeroed_slices() {
        let mut arena = BumpArena::with_capacity(16);
        let (a, b) = arena.alloc_two(4, 4);
        a.copy_from_slice(&[1, 2, 3, 4]);
        b.copy_from_slice(&[5, 6, 7, 8]);
        assert_eq!(a, &[1, 2, 3, 4]);
        assert_eq!(b, &[5, 6, 7, 8]);
        assert_eq!(arena.high_water_mark(), 8);
    }

    #[test]
    fn acquire_bump_reuses_arena_of_sufficient_capacity() {
        {
            let mut guard = acquire_bump(1024);
            guard.arena().alloc(10);
        }
        let mut guard2 = acquire_bump(512);
        assert!(guard2.arena().capacity_words() >= 512);
    }
}
