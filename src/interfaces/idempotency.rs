use dashmap::DashMap;
use std::future::Future;
use std::time::{Duration, Instant};

use super::api::ApiResponse;

struct CacheEntry {
    response: ApiResponse,
    stored_at: Instant,
}

/// Concurrent token -> response cache backing the idempotency guard.
///
/// Entries are written once and never updated. Expiry is lazy: when a TTL is
/// configured, stale entries are dropped on lookup. Without a TTL the cache
/// keeps entries for the lifetime of the process.
#[derive(Default)]
pub struct IdempotencyCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Option<Duration>,
}

impl IdempotencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    pub fn get(&self, token: &str) -> Option<ApiResponse> {
        if let Some(ttl) = self.ttl {
            self.entries
                .remove_if(token, |_, entry| entry.stored_at.elapsed() >= ttl);
        }
        self.entries.get(token).map(|entry| entry.response.clone())
    }

    /// Inserts atomically; the first writer wins. Returns the stored
    /// response, so a caller that lost a concurrent race still hands out the
    /// same bytes as every other caller with this token.
    pub fn insert_if_absent(&self, token: String, response: ApiResponse) -> ApiResponse {
        let entry = self.entries.entry(token).or_insert_with(|| CacheEntry {
            response,
            stored_at: Instant::now(),
        });
        entry.response.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Request-level deduplication over the write endpoints.
///
/// A tokenized request whose token is cached is replayed verbatim without
/// reaching the downstream pipeline. Only 2xx responses are cached, so a
/// client that got an error may safely retry with the same token. An
/// untokenized request passes through untouched.
#[derive(Default)]
pub struct IdempotencyGuard {
    cache: IdempotencyCache,
}

impl IdempotencyGuard {
    pub fn new(cache: IdempotencyCache) -> Self {
        Self { cache }
    }

    pub async fn execute<F, Fut>(&self, token: Option<&str>, run: F) -> ApiResponse
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResponse>,
    {
        let Some(token) = token else {
            return run().await;
        };

        if let Some(cached) = self.cache.get(token) {
            tracing::info!(token = %token, "idempotency cache hit");
            return cached;
        }

        let response = run().await;
        if response.is_success() {
            return self.cache.insert_if_absent(token.to_string(), response);
        }
        response
    }
}
