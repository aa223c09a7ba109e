//! Allocators (C3): size-classed pools, bump arenas, pre-warming.

mod bump;
mod pool;
mod warmup;

pub use bump::{acquire_bump, BumpArena, BumpGuard};
pub use pool::{global as global_pool, PoolGuard, WordPool, SIZE_CLASSES};
pub use warmup::ensure_warmed;
