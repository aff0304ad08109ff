pub mod arc;
pub mod memory;
pub mod traits;

pub use arc::ArcCache;
pub use memory::MemoryResultCache;
pub use traits::{CacheResult, CacheStatus, ResultCache};
