use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use indexmap::IndexMap;

use super::{AsyncRawSettingsProvider, RawSettingsProvider};
use crate::error::FillfigError;
use crate::value::Value;

type LookupFn = Box<dyn Fn(&str) -> Option<Value> + Send + Sync>;
type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;
type AsyncLookupFn = Box<dyn Fn(String) -> BoxFuture<Option<Value>> + Send + Sync>;

/// Provider backed by a synchronous closure.
pub struct FnProvider {
    lookup: LookupFn,
}

impl FnProvider {
    pub fn new<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
        }
    }
}

impl RawSettingsProvider for FnProvider {
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        Ok((self.lookup)(key))
    }
}

/// Provider backed by an async closure. The closure receives an owned key.
pub struct AsyncFnProvider {
    lookup: AsyncLookupFn,
}

impl AsyncFnProvider {
    pub fn new<F, Fut>(lookup: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Value>> + Send + 'static,
    {
        Self {
            lookup: Box::new(move |key: String| -> BoxFuture<Option<Value>> {
                Box::pin(lookup(key))
            }),
        }
    }
}

#[async_trait]
impl AsyncRawSettingsProvider for AsyncFnProvider {
    async fn get_raw_setting_async(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        Ok((self.lookup)(key.to_string()).await)
    }
}

/// In-memory provider. Keys are matched exactly.
#[derive(Debug, Clone, Default)]
pub struct MapProvider {
    entries: IndexMap<String, Value>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
}

impl RawSettingsProvider for MapProvider {
    fn get_raw_setting(&self, key: &str) -> Result<Option<Value>, FillfigError> {
        if key.is_empty() {
            return Err(FillfigError::empty_key());
        }
        Ok(self.entries.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fn_provider_delegates() {
        let provider = FnProvider::new(|key| (key == "Port").then(|| Value::from("80")));
        assert_eq!(provider.get_raw_setting("Port").unwrap(), Some(Value::from("80")));
        assert_eq!(provider.get_raw_setting("Host").unwrap(), None);
    }

    #[test]
    fn fn_provider_rejects_empty_key() {
        let provider = FnProvider::new(|_| None);
        assert!(matches!(
            provider.get_raw_setting(""),
            Err(FillfigError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn async_fn_provider_awaits_lookup() {
        let provider = AsyncFnProvider::new(|key: String| async move {
            tokio::task::yield_now().await;
            (key == "Port").then(|| Value::from("80"))
        });
        assert_eq!(
            provider.get_raw_setting_async("Port").await.unwrap(),
            Some(Value::from("80"))
        );
        assert!(provider.get_raw_setting_async("").await.is_err());
    }

    #[test]
    fn map_provider_holds_structured_values() {
        let provider = MapProvider::new()
            .with("List", Value::list(["1", "2"]))
            .with("Name", "svc");
        assert_eq!(
            provider.get_raw_setting("List").unwrap(),
            Some(Value::list(["1", "2"]))
        );
        assert_eq!(provider.get_raw_setting("Name").unwrap(), Some(Value::from("svc")));
        assert_eq!(provider.get_raw_setting("name").unwrap(), None);
    }
}
