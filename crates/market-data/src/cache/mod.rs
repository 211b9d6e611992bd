//! Local cache and auto-download management.
//!
//! ```text
//! ensure_range(security, period, start, end)
//!        │
//!        ├── covered & fresh ──────────────> done
//!        ├── auto-download off ────────────> done (serve local data)
//!        └── SingleFlight[(security, period)]
//!                 └── spawned: download ─> read_local ─> CacheStore::put
//! ```

mod entry;
mod manager;
mod single_flight;
mod store;

pub use entry::{CacheEntry, CacheKey};
pub use manager::{CacheManager, CacheManagerConfig};
pub use single_flight::SingleFlight;
pub use store::{CacheStore, DiskCacheStore, MemoryCacheStore};
