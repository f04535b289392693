//! [`SessionStore`] capability definitions.

use std::{
    collections::HashMap,
    fmt,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use common::DateTime;

/// Optional side-storage of issued session tokens.
///
/// Session validation never depends on it: tokens are self-contained and
/// checked against the user record. Implementations back auxiliary concerns
/// only, so the interface is infallible by design and implementations are
/// expected to swallow (and log) their transport errors.
#[async_trait]
pub trait SessionStore: fmt::Debug + Send + Sync {
    /// Returns the value stored under the provided `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores the provided `value` under the provided `key`, evicting it
    /// after the provided `expiry`.
    async fn set_with_expiry(&self, key: &str, value: String, expiry: Duration);

    /// Deletes the value stored under the provided `key`.
    async fn delete(&self, key: &str);
}

/// [`SessionStore`] storing nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOp;

#[async_trait]
impl SessionStore for NoOp {
    async fn get(&self, _: &str) -> Option<String> {
        None
    }

    async fn set_with_expiry(&self, _: &str, _: String, _: Duration) {}

    async fn delete(&self, _: &str) {}
}

/// [`SessionStore`] backed by an in-process map.
///
/// Expired entries are evicted lazily, on access.
#[derive(Debug, Default)]
pub struct InProcess(Mutex<HashMap<String, (String, DateTime)>>);

impl InProcess {
    /// Creates a new empty [`InProcess`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InProcess {
    async fn get(&self, key: &str) -> Option<String> {
        let mut map = self.0.lock().ok()?;
        if let Some((_, expires_at)) = map.get(key) {
            if *expires_at <= DateTime::now() {
                drop(map.remove(key));
                return None;
            }
        }
        map.get(key).map(|(value, _)| value.clone())
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: String,
        expiry: Duration,
    ) {
        if let Ok(mut map) = self.0.lock() {
            drop(map.insert(
                key.to_owned(),
                (value, DateTime::now() + expiry),
            ));
        }
    }

    async fn delete(&self, key: &str) {
        if let Ok(mut map) = self.0.lock() {
            drop(map.remove(key));
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{InProcess, SessionStore as _};

    #[tokio::test]
    async fn stores_and_evicts_by_expiry() {
        let store = InProcess::new();

        store
            .set_with_expiry("k", "v".into(), Duration::from_secs(60))
            .await;
        assert_eq!(store.get("k").await.as_deref(), Some("v"));

        store
            .set_with_expiry("k", "v".into(), Duration::ZERO)
            .await;
        assert_eq!(store.get("k").await, None);

        store
            .set_with_expiry("k", "v".into(), Duration::from_secs(60))
            .await;
        store.delete("k").await;
        assert_eq!(store.get("k").await, None);
    }
}
