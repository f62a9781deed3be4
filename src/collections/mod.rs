//! Ordered and concurrent containers backing the per-instrument books.

pub mod concurrent_map;
pub mod skiplist;

pub use concurrent_map::ConcurrentMap;
pub use skiplist::{Comparator, SkipList};
