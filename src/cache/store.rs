//! Expiring in-memory cache for raw API response bodies
//!
//! Provides a `Cache` that maps request URLs to opaque byte payloads and evicts
//! entries older than a fixed TTL from a background reaper task. Payloads are
//! stored and returned verbatim; the cache never interprets them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// A single cached payload together with its insertion time.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The raw bytes handed to `add`, returned unchanged by `get`
    payload: Vec<u8>,
    /// When the entry was inserted (refreshed on every re-add)
    created_at: Instant,
}

/// Shared key-to-entry map guarded by a readers-writer lock.
type EntryMap = Arc<RwLock<HashMap<String, CacheEntry>>>;

/// An expiring key-value cache with a background reaper.
///
/// A single TTL, fixed at construction, serves both as the staleness threshold
/// and as the reaper's wake-up period. Eviction is therefore eventual, not
/// instantaneous: an entry may remain visible to `get` for up to twice the TTL
/// before the reaper removes it.
///
/// `add` and `get` never fail and never block beyond lock acquisition. A miss
/// is an ordinary `None`, not an error.
#[derive(Debug)]
pub struct Cache {
    /// The guarded URL-to-payload map
    entries: EntryMap,
    /// Staleness threshold and reap cadence
    ttl: Duration,
    /// Signals the reaper task to exit
    shutdown_tx: mpsc::Sender<()>,
    /// Handle to the reaper task, taken by `stop`
    reaper: Mutex<Option<JoinHandle<()>>>,
}

impl Cache {
    /// Creates an empty cache and spawns its reaper task.
    ///
    /// The reaper wakes every `ttl` and removes entries older than `ttl`.
    ///
    /// # Arguments
    /// * `ttl` - Maximum entry age; also the reap interval
    pub fn new(ttl: Duration) -> Self {
        let entries: EntryMap = Arc::new(RwLock::new(HashMap::new()));
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let reaper = spawn_reaper(Arc::clone(&entries), ttl, shutdown_rx);

        Self {
            entries,
            ttl,
            shutdown_tx,
            reaper: Mutex::new(Some(reaper)),
        }
    }

    /// Returns the TTL this cache was constructed with.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Inserts or overwrites the entry for `key`.
    ///
    /// Re-adding an existing key replaces the payload and refreshes the
    /// creation timestamp. The entry is visible to `get` from any task as soon
    /// as this call returns.
    pub async fn add(&self, key: impl Into<String>, payload: Vec<u8>) {
        let key = key.into();
        trace!(key = %key, bytes = payload.len(), "cache add");
        let entry = CacheEntry {
            payload,
            created_at: Instant::now(),
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Looks up `key` and returns its payload, or `None` on a miss.
    ///
    /// Age is not checked here; staleness is enforced only by the reaper, so a
    /// lookup racing just ahead of a reap cycle may return an entry older than
    /// the TTL.
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let entries = self.entries.read().await;
        entries.get(key).map(|entry| entry.payload.clone())
    }

    /// Stops the reaper task and waits for it to exit.
    ///
    /// The map itself stays usable afterwards; only eviction ceases. Calling
    /// `stop` twice is a no-op.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Some(handle) = self.reaper.lock().await.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Cache {
    fn drop(&mut self) {
        // Reaper holds an Arc to the map; abort it so the map can be freed.
        if let Some(handle) = self.reaper.get_mut().take() {
            handle.abort();
        }
    }
}

/// Spawns the background task that periodically evicts stale entries.
fn spawn_reaper(
    entries: EntryMap,
    ttl: Duration,
    mut shutdown_rx: mpsc::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(ttl);
        // Skip the first tick (immediate)
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    reap(&entries, ttl).await;
                }
                _ = shutdown_rx.recv() => {
                    break;
                }
            }
        }
    })
}

/// Removes every entry whose age exceeds `ttl`.
///
/// Runs in two phases: stale keys are collected under a read lock, then
/// deleted under a write lock, so the exclusive lock is never held while
/// scanning the whole map. Each entry's age is re-checked before deletion, so
/// a key refreshed between the phases survives the cycle.
async fn reap(entries: &RwLock<HashMap<String, CacheEntry>>, ttl: Duration) {
    let now = Instant::now();

    let stale: Vec<String> = {
        let map = entries.read().await;
        map.iter()
            .filter(|(_, entry)| now.duration_since(entry.created_at) > ttl)
            .map(|(key, _)| key.clone())
            .collect()
    };

    if stale.is_empty() {
        return;
    }

    let mut map = entries.write().await;
    let mut removed = 0usize;
    for key in &stale {
        // Entry may have been refreshed since the scan; duration_since
        // saturates to zero for timestamps newer than `now`.
        if let Some(entry) = map.get(key) {
            if now.duration_since(entry.created_at) > ttl {
                map.remove(key);
                removed += 1;
            }
        }
    }
    debug!(scanned = stale.len(), removed, "cache reap cycle");
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_millis(100);

    #[tokio::test]
    async fn test_add_then_get_returns_payload() {
        let cache = Cache::new(TTL);
        cache.add("https://example/a", b"body".to_vec()).await;

        let got = cache.get("https://example/a").await;
        assert_eq!(got, Some(b"body".to_vec()));
    }

    #[tokio::test]
    async fn test_get_unknown_key_misses() {
        let cache = Cache::new(TTL);
        assert_eq!(cache.get("never-added").await, None);
    }

    #[tokio::test]
    async fn test_add_overwrites_existing_key() {
        let cache = Cache::new(TTL);
        cache.add("k", b"first".to_vec()).await;
        cache.add("k", b"second".to_vec()).await;

        assert_eq!(cache.get("k").await, Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_payload_returned_verbatim() {
        let cache = Cache::new(TTL);
        let payload = vec![0u8, 159, 146, 150, 255];
        cache.add("bin", payload.clone()).await;

        assert_eq!(cache.get("bin").await, Some(payload));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_evicted_after_ttl_and_reap_cycle() {
        let cache = Cache::new(TTL);
        cache.add("k", b"x".to_vec()).await;

        // Past the TTL and past at least one reaper wake-up.
        tokio::time::sleep(TTL * 3).await;

        assert_eq!(cache.get("k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_survives_within_ttl() {
        let cache = Cache::new(TTL);
        cache.add("k", b"x".to_vec()).await;

        tokio::time::sleep(TTL / 2).await;

        assert_eq!(cache.get("k").await, Some(b"x".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_readd_refreshes_timestamp() {
        let cache = Cache::new(TTL);
        cache.add("k", b"old".to_vec()).await;

        // Refresh just before expiry; the entry must survive the next cycle.
        tokio::time::sleep(TTL - Duration::from_millis(10)).await;
        cache.add("k", b"new".to_vec()).await;
        tokio::time::sleep(TTL / 2).await;

        assert_eq!(cache.get("k").await, Some(b"new".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_is_idempotent() {
        let cache = Cache::new(TTL);
        cache.add("stale", b"x".to_vec()).await;
        tokio::time::sleep(TTL + Duration::from_millis(10)).await;

        reap(&cache.entries, TTL).await;
        let after_first = cache.entries.read().await.len();

        reap(&cache.entries, TTL).await;
        let after_second = cache.entries.read().await.len();

        assert_eq!(after_first, 0);
        assert_eq!(after_second, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_spares_entry_refreshed_after_scan() {
        let cache = Cache::new(Duration::from_secs(60));
        cache.add("k", b"old".to_vec()).await;
        tokio::time::sleep(Duration::from_secs(61)).await;

        // Simulate a refresh landing between the scan and the delete: the
        // re-check under the write lock must spare the newer entry.
        let now = Instant::now();
        let stale = vec!["k".to_string()];
        cache.add("k", b"fresh".to_vec()).await;

        let mut map = cache.entries.write().await;
        for key in &stale {
            if let Some(entry) = map.get(key) {
                if now.duration_since(entry.created_at) > cache.ttl {
                    map.remove(key);
                }
            }
        }
        drop(map);

        assert_eq!(cache.get("k").await, Some(b"fresh".to_vec()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_eviction() {
        let cache = Cache::new(TTL);
        cache.stop().await;

        cache.add("k", b"x".to_vec()).await;
        tokio::time::sleep(TTL * 5).await;

        // Reaper is gone, so even a long-stale entry stays readable.
        assert_eq!(cache.get("k").await, Some(b"x".to_vec()));
    }

    #[tokio::test]
    async fn test_stop_twice_is_noop() {
        let cache = Cache::new(TTL);
        cache.stop().await;
        cache.stop().await;
    }
}
