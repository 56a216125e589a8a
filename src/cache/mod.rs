//! Cache Module
//!
//! Provides the in-process image cache with fetch coalescing, admission
//! control, age-based expiry and batch eviction.

pub mod clock;
mod entry;
mod eviction;
mod fetch;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, ImagePayload};
pub use eviction::{eviction_count, select_oldest, EVICTION_FRACTION};
pub use fetch::{parse_image_url, ImageFetcher};
pub use stats::ImageCacheStats;
pub use store::{ImageCache, ImageCacheConfig, ImageFuture};
