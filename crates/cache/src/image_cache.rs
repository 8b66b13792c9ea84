//! Bounded in-memory image cache with LRU eviction
//!
//! Stores decoded images keyed by string (usually the request URL). The cache
//! is bounded by the summed byte footprint of its entries rather than by
//! entry count, and gives memory back when the host signals pressure.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lru::LruCache;

use crate::config::CacheConfig;
use crate::image::{ByteFootprint, DecodedImage};
use crate::pressure::{MemoryPressure, PressureResponse};

/// Size function used to weigh an image when it is inserted
pub type SizeFn<V> = dyn Fn(&V) -> usize + Send + Sync;

/// Statistics about cache usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of images currently cached
    pub entry_count: usize,

    /// Sum of the byte size of all cached images
    pub memory_used: usize,

    /// Maximum bytes the cache holds after an insert
    pub capacity: usize,

    /// Number of `get` calls that found an image
    pub hits: u64,

    /// Number of `get` calls that found nothing
    pub misses: u64,

    /// Number of `put` calls
    pub puts: u64,

    /// Number of images dropped by eviction, trim or clear
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the cache hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate memory utilization (0.0 to 1.0)
    pub fn memory_utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.memory_used as f64 / self.capacity as f64
        }
    }
}

struct Entry<V> {
    image: Arc<V>,
    size: usize,
}

/// Everything guarded by the cache lock
struct CacheState<V> {
    /// Entries in recency order (most recently used at the front)
    entries: LruCache<String, Entry<V>>,

    /// Sum of `size` over `entries`
    current_size: usize,

    capacity: usize,

    hits: u64,
    misses: u64,
    puts: u64,
    evictions: u64,
}

impl<V> CacheState<V> {
    fn new(capacity: usize) -> Self {
        Self {
            entries: LruCache::unbounded(),
            current_size: 0,
            capacity,
            hits: 0,
            misses: 0,
            puts: 0,
            evictions: 0,
        }
    }

    /// Drop least recently used entries until `current_size <= target`
    ///
    /// Returns the number of entries evicted.
    fn evict_to(&mut self, target: usize) -> usize {
        let mut evicted = 0;
        while self.current_size > target {
            let Some((_, entry)) = self.entries.pop_lru() else {
                break;
            };
            self.current_size -= entry.size;
            evicted += 1;
        }
        self.evictions += evicted as u64;
        evicted
    }

    fn evict_all(&mut self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        self.current_size = 0;
        self.evictions += evicted as u64;
        evicted
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            entry_count: self.entries.len(),
            memory_used: self.current_size,
            capacity: self.capacity,
            hits: self.hits,
            misses: self.misses,
            puts: self.puts,
            evictions: self.evictions,
        }
    }
}

/// Image cache bounded by total byte size
///
/// Thread-safe store mapping keys to shared decoded images. Inserting past
/// capacity evicts the least recently used images; memory pressure callbacks
/// trim the cache to half its capacity or empty it. Cached images are handed
/// out as `Arc`s and must be treated as immutable.
///
/// # Example
///
/// ```
/// use imgreq_cache::{BoundedImageCache, DecodedImage, MemoryPressure, PixelFormat};
///
/// // 4MB cache for decoded bitmaps
/// let cache: BoundedImageCache = BoundedImageCache::new(4 * 1024 * 1024);
///
/// let image = DecodedImage::blank(256, 256, PixelFormat::Argb8888);
/// cache.put("https://example.com/a.png", image);
///
/// if let Some(image) = cache.get("https://example.com/a.png") {
///     println!("Cache hit! {}x{}", image.width, image.height);
/// }
///
/// // The host is about to kill the process
/// cache.on_memory_pressure(MemoryPressure::Critical);
/// assert!(cache.is_empty());
/// ```
pub struct BoundedImageCache<V = DecodedImage> {
    state: Mutex<CacheState<V>>,
    size_of: Box<SizeFn<V>>,
}

impl<V: ByteFootprint + 'static> BoundedImageCache<V> {
    /// Create a cache holding at most `capacity` bytes, weighing images by
    /// their [`ByteFootprint`]
    pub fn new(capacity: usize) -> Self {
        Self::with_size_fn(capacity, V::byte_footprint)
    }

    /// Create a cache sized from configuration
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.image_cache_bytes)
    }
}

impl<V> BoundedImageCache<V> {
    /// Create a cache that weighs images with a caller-provided function
    ///
    /// The function is called once per `put`, outside the cache lock.
    pub fn with_size_fn<F>(capacity: usize, size_of: F) -> Self
    where
        F: Fn(&V) -> usize + Send + Sync + 'static,
    {
        Self {
            state: Mutex::new(CacheState::new(capacity)),
            size_of: Box::new(size_of),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        // Every mutation leaves the state consistent before anything that can
        // panic, so a poisoned lock is still safe to use.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up an image, marking it most recently used on a hit
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        let mut state = self.lock();
        let image = state.entries.get(key).map(|entry| Arc::clone(&entry.image));
        if image.is_some() {
            state.hits += 1;
            tracing::trace!(key, "image cache hit");
        } else {
            state.misses += 1;
            tracing::trace!(key, "image cache miss");
        }
        image
    }

    /// Store an image as the most recently used entry
    ///
    /// Replaces any image already stored under `key`. If the cache is then
    /// over capacity, least recently used images are evicted until it fits.
    /// An image larger than the whole capacity is not stored and evicts
    /// everything.
    pub fn put(&self, key: impl Into<String>, image: V) {
        self.put_shared(key, Arc::new(image));
    }

    /// Store an image that is already shared with other holders
    pub fn put_shared(&self, key: impl Into<String>, image: Arc<V>) {
        let key = key.into();
        let size = (self.size_of)(&image);

        let mut state = self.lock();
        state.puts += 1;
        let capacity = state.capacity;

        if size > capacity {
            tracing::warn!(
                key = key.as_str(),
                size,
                capacity,
                "image larger than cache capacity"
            );
            let evicted = state.evict_all();
            tracing::debug!(evicted, "evicted all images for oversized insert");
            return;
        }

        if let Some(old) = state.entries.pop(&key) {
            state.current_size -= old.size;
        }
        // Same survivors as inserting first, since the new entry is evicted last
        let evicted = state.evict_to(capacity - size);
        state.entries.put(key, Entry { image, size });
        state.current_size += size;

        if evicted > 0 {
            tracing::debug!(
                evicted,
                memory_used = state.current_size,
                capacity,
                "evicted images to fit capacity"
            );
        }
    }

    /// Remove an image from the cache
    pub fn remove(&self, key: &str) -> Option<Arc<V>> {
        let mut state = self.lock();
        let entry = state.entries.pop(key)?;
        state.current_size -= entry.size;
        Some(entry.image)
    }

    /// Check if an image is cached without updating recency
    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains(key)
    }

    /// Evict least recently used images until at most half of capacity is used
    ///
    /// Capacity is left unchanged, so later inserts may fill the cache again.
    pub fn trim(&self) {
        let mut state = self.lock();
        let target = state.capacity / 2;
        let evicted = state.evict_to(target);
        tracing::debug!(
            evicted,
            memory_used = state.current_size,
            target,
            "trimmed image cache"
        );
    }

    /// Evict every image
    pub fn clear(&self) {
        let mut state = self.lock();
        let evicted = state.evict_all();
        tracing::debug!(evicted, "cleared image cache");
    }

    /// React to a memory pressure signal from the host
    pub fn on_memory_pressure(&self, level: MemoryPressure) {
        let response = level.response();
        tracing::debug!(?level, ?response, "memory pressure");
        match response {
            PressureResponse::Trim => self.trim(),
            PressureResponse::Clear => self.clear(),
            PressureResponse::Ignore => {}
        }
    }

    /// React to a raw trim level from the host
    ///
    /// Levels the host does not define are ignored.
    pub fn on_trim_memory(&self, level: i32) {
        match MemoryPressure::from_trim_level(level) {
            Some(pressure) => self.on_memory_pressure(pressure),
            None => tracing::debug!(level, "ignoring unknown trim level"),
        }
    }

    /// React to the host running out of memory entirely
    pub fn on_low_memory(&self) {
        self.clear();
    }

    /// Permanently change the capacity, evicting if the cache no longer fits
    pub fn resize(&self, capacity: usize) {
        let mut state = self.lock();
        state.capacity = capacity;
        let evicted = state.evict_to(capacity);
        tracing::debug!(capacity, evicted, "resized image cache");
    }

    /// Maximum bytes held after an insert
    pub fn capacity(&self) -> usize {
        self.lock().capacity
    }

    /// Bytes currently held
    pub fn current_size(&self) -> usize {
        self.lock().current_size
    }

    /// Number of cached images
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether no images are cached
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Get current cache statistics
    pub fn stats(&self) -> CacheStats {
        self.lock().stats()
    }

    /// Snapshot of cached keys, least recently used first
    pub fn keys_lru_order(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .rev()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

impl<V: ByteFootprint + 'static> Default for BoundedImageCache<V> {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}

impl<V> fmt::Debug for BoundedImageCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("BoundedImageCache")
            .field("entries", &state.entries.len())
            .field("current_size", &state.current_size)
            .field("capacity", &state.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Cache whose values are their own byte size
    fn sized_cache(capacity: usize) -> BoundedImageCache<usize> {
        BoundedImageCache::with_size_fn(capacity, |size: &usize| *size)
    }

    fn live_size(cache: &BoundedImageCache<usize>) -> usize {
        cache.lock().entries.iter().map(|(_, entry)| entry.size).sum()
    }

    #[test]
    fn test_basic_put_get() {
        let cache: BoundedImageCache = BoundedImageCache::new(1024 * 1024);

        let image = DecodedImage::blank(64, 64, PixelFormat::Argb8888);
        cache.put("a", image.clone());

        let cached = cache.get("a").expect("image should be cached");
        assert_eq!(*cached, image);
        assert_eq!(cache.current_size(), 64 * 64 * 4);
    }

    #[test]
    fn test_cache_miss() {
        let cache = sized_cache(1000);

        assert!(cache.get("missing").is_none());

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.entry_count, 0);
    }

    #[test]
    fn test_lru_scenario() {
        let cache = sized_cache(1000);

        cache.put("A", 400);
        cache.put("B", 400);
        cache.put("C", 400);

        assert!(!cache.contains("A"));
        assert_eq!(cache.keys_lru_order(), vec!["B", "C"]);
        assert_eq!(cache.current_size(), 800);

        assert!(cache.get("B").is_some());
        cache.put("D", 300);

        assert_eq!(cache.keys_lru_order(), vec!["B", "D"]);
        assert_eq!(cache.current_size(), 700);
    }

    #[test]
    fn test_trim_full_entry() {
        let cache = sized_cache(1000);
        cache.put("A", 1000);
        assert_eq!(cache.current_size(), 1000);

        cache.trim();

        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
        assert_eq!(cache.capacity(), 1000);

        // Capacity was not lowered permanently
        cache.put("B", 900);
        assert!(cache.contains("B"));
        assert_eq!(cache.current_size(), 900);
    }

    #[test]
    fn test_trim_keeps_most_recent() {
        let cache = sized_cache(1000);
        for key in ["a", "b", "c", "d", "e"] {
            cache.put(key, 200);
        }
        cache.get("a");

        cache.trim();

        assert!(cache.current_size() <= 500);
        assert_eq!(cache.keys_lru_order(), vec!["e", "a"]);
        assert_eq!(cache.capacity(), 1000);
    }

    #[test]
    fn test_trim_below_half_is_noop() {
        let cache = sized_cache(1000);
        cache.put("a", 300);
        cache.put("b", 200);

        cache.trim();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 500);
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_clear() {
        let cache = sized_cache(1000);
        cache.put("a", 100);
        cache.put("b", 100);
        cache.put("c", 100);

        cache.clear();

        assert_eq!(cache.current_size(), 0);
        assert!(cache.is_empty());
        for key in ["a", "b", "c"] {
            assert!(cache.get(key).is_none());
        }
        assert_eq!(cache.stats().evictions, 3);
    }

    #[test]
    fn test_reinsert_does_not_double_count() {
        let cache = sized_cache(1000);
        cache.put("a", 300);
        cache.put("b", 300);
        cache.put("a", 500);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.current_size(), 800);
        assert_eq!(*cache.get("a").unwrap(), 500);

        // Re-insertion refreshed "a", so "b" goes first
        cache.put("c", 300);
        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_oversized_image_leaves_cache_empty() {
        let cache = sized_cache(1000);
        cache.put("a", 200);
        cache.put("b", 300);

        cache.put("huge", 1001);

        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);
        assert!(cache.get("huge").is_none());

        // Still usable afterwards
        cache.put("c", 100);
        assert_eq!(cache.current_size(), 100);
    }

    #[test]
    fn test_saturated_footprint_does_not_overflow() {
        let cache: BoundedImageCache = BoundedImageCache::new(1000);
        cache.put("small", DecodedImage::blank(10, 10, PixelFormat::Alpha8));
        assert_eq!(cache.current_size(), 100);

        let huge = DecodedImage::new(u32::MAX, u32::MAX, PixelFormat::RgbaF16, Vec::new());
        cache.put("huge", huge);

        assert!(!cache.contains("huge"));
        assert!(cache.is_empty());
        assert_eq!(cache.current_size(), 0);

        cache.put("small", DecodedImage::blank(10, 10, PixelFormat::Alpha8));
        assert_eq!(cache.current_size(), 100);
    }

    #[test]
    fn test_max_sizes_keep_accounting_exact() {
        let cache = BoundedImageCache::with_size_fn(usize::MAX, |size: &usize| *size);
        cache.put("a", usize::MAX / 2);
        cache.put("b", usize::MAX / 2);
        cache.put("c", usize::MAX);

        assert_eq!(cache.keys_lru_order(), vec!["c"]);
        assert_eq!(cache.current_size(), usize::MAX);

        cache.put("d", usize::MAX);
        assert_eq!(cache.keys_lru_order(), vec!["d"]);
        assert_eq!(cache.current_size(), live_size(&cache));
    }

    #[test]
    fn test_oversized_replacement_drops_old_entry() {
        let cache = sized_cache(1000);
        cache.put("a", 400);
        cache.put("a", 5000);

        assert!(!cache.contains("a"));
        assert_eq!(cache.current_size(), 0);
        assert_eq!(cache.stats().puts, 2);
    }

    #[test]
    fn test_exactly_capacity_fits() {
        let cache = sized_cache(1000);
        cache.put("a", 1000);
        assert!(cache.contains("a"));
        assert_eq!(cache.current_size(), 1000);
    }

    #[test]
    fn test_zero_capacity() {
        let cache = sized_cache(0);
        cache.put("a", 1);
        assert!(cache.is_empty());

        cache.put("empty", 0);
        assert!(cache.contains("empty"));
        assert_eq!(cache.current_size(), 0);
    }

    #[test]
    fn test_contains_does_not_touch() {
        let cache = sized_cache(1000);
        cache.put("a", 500);
        cache.put("b", 500);

        assert!(cache.contains("a"));
        cache.put("c", 500);

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_remove() {
        let cache = sized_cache(1000);
        cache.put("a", 400);
        cache.put("b", 100);

        assert_eq!(cache.remove("a").as_deref(), Some(&400));
        assert_eq!(cache.current_size(), 100);
        assert!(cache.remove("a").is_none());
    }

    #[test]
    fn test_memory_pressure_dispatch() {
        let fill = |cache: &BoundedImageCache<usize>| {
            cache.clear();
            for key in ["a", "b", "c", "d"] {
                cache.put(key, 250);
            }
        };
        let cache = sized_cache(1000);

        fill(&cache);
        cache.on_memory_pressure(MemoryPressure::Moderate);
        assert_eq!(cache.keys_lru_order(), vec!["c", "d"]);

        fill(&cache);
        cache.on_memory_pressure(MemoryPressure::Background);
        assert_eq!(cache.current_size(), 500);

        fill(&cache);
        cache.on_memory_pressure(MemoryPressure::Critical);
        assert!(cache.is_empty());

        for level in [
            MemoryPressure::RunningModerate,
            MemoryPressure::RunningLow,
            MemoryPressure::RunningCritical,
            MemoryPressure::UiHidden,
        ] {
            fill(&cache);
            cache.on_memory_pressure(level);
            assert_eq!(cache.len(), 4, "{level:?} should not evict");
        }
        assert_eq!(cache.capacity(), 1000);
    }

    #[test]
    fn test_raw_trim_levels() {
        let cache = sized_cache(1000);
        cache.put("a", 600);

        cache.on_trim_memory(12345);
        cache.on_trim_memory(20);
        assert_eq!(cache.len(), 1);

        cache.on_trim_memory(60);
        assert!(cache.is_empty());

        cache.put("a", 100);
        cache.on_low_memory();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_resize() {
        let cache = sized_cache(1000);
        for key in ["a", "b", "c", "d"] {
            cache.put(key, 250);
        }

        cache.resize(600);
        assert_eq!(cache.capacity(), 600);
        assert_eq!(cache.keys_lru_order(), vec!["c", "d"]);

        cache.trim();
        assert_eq!(cache.current_size(), 250);
        assert_eq!(cache.capacity(), 600);
    }

    #[test]
    fn test_stats() {
        let cache = sized_cache(1000);
        cache.put("a", 600);
        cache.put("b", 600);

        let _ = cache.get("b");
        let _ = cache.get("a");
        let _ = cache.get("c");

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.puts, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.memory_used, 600);
        assert!((stats.hit_rate() - 0.333).abs() < 0.01);
        assert!((stats.memory_utilization() - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lru_eviction_order_for_uniform_sizes() {
        let cache = sized_cache(10 * 100);

        for i in 0..10 {
            cache.put(i.to_string(), 100);
        }
        for i in 5..10 {
            cache.get(&i.to_string());
        }
        for i in 10..15 {
            cache.put(i.to_string(), 100);
        }

        for i in 0..5 {
            assert!(!cache.contains(&i.to_string()), "{i} should have been evicted");
        }
        for i in 5..15 {
            assert!(cache.contains(&i.to_string()), "{i} should still be cached");
        }
    }

    #[test]
    fn test_randomized_size_accounting() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let capacity = 2_000;
        let cache = sized_cache(capacity);

        for _ in 0..5_000 {
            let key = rng.gen_range(0..40).to_string();
            match rng.gen_range(0..100) {
                0..=59 => {
                    let size = rng.gen_range(0..700);
                    cache.put(key, size);
                    assert!(cache.current_size() <= capacity);
                }
                60..=89 => {
                    let _ = cache.get(&key);
                }
                90..=94 => {
                    let _ = cache.remove(&key);
                }
                95..=97 => {
                    cache.trim();
                    assert!(cache.current_size() <= capacity / 2);
                    assert_eq!(cache.capacity(), capacity);
                }
                _ => {
                    cache.clear();
                    assert_eq!(cache.current_size(), 0);
                }
            }
            assert_eq!(cache.current_size(), live_size(&cache));
        }
    }

    #[test]
    fn test_default_uses_config() {
        let cache: BoundedImageCache = BoundedImageCache::default();
        assert_eq!(cache.capacity(), CacheConfig::default().image_cache_bytes);
    }

    #[test]
    fn test_get_returns_shared_image() {
        let cache: BoundedImageCache = BoundedImageCache::new(1024 * 1024);
        let image = Arc::new(DecodedImage::blank(8, 8, PixelFormat::Alpha8));
        cache.put_shared("a", Arc::clone(&image));

        let cached = cache.get("a").unwrap();
        assert!(Arc::ptr_eq(&cached, &image));

        // Evicted images stay alive while someone holds them
        cache.clear();
        assert_eq!(cached.width, 8);
    }
}
