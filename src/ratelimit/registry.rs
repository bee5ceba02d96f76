//! Per-client limiter registry.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use super::window::{ClientId, WindowLimiter};

/// Maps each client identifier to its own limiter.
///
/// Entries are created lazily on first sight and live for as long as the
/// registry does. Creation happens under the map shard's write lock, so two
/// callers racing on an unseen client never construct two limiters.
#[derive(Default)]
pub struct LimiterRegistry {
    limiters: DashMap<ClientId, Arc<dyn WindowLimiter>>,
}

impl LimiterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the limiter for `client_id`, building it with `factory` if absent.
    pub fn get_or_create<F>(&self, client_id: ClientId, factory: F) -> Arc<dyn WindowLimiter>
    where
        F: FnOnce() -> Arc<dyn WindowLimiter>,
    {
        if let Some(limiter) = self.limiters.get(&client_id) {
            return Arc::clone(limiter.value());
        }

        let entry = self.limiters.entry(client_id).or_insert_with(|| {
            debug!(client_id, "Creating limiter for new client");
            factory()
        });
        Arc::clone(entry.value())
    }

    /// Whether a limiter exists for `client_id`.
    pub fn contains(&self, client_id: ClientId) -> bool {
        self.limiters.contains_key(&client_id)
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    /// Whether no client has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}
