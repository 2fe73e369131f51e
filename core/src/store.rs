//! Generic cached CRUD over one backend resource.
//!
//! # Design
//! A `ResourceStore` is constructed explicitly and owns its cache plus the
//! `loading`/`error` pair, so independent instances never share state. The
//! server is the source of truth: every mutation reconciles the cache from
//! the server's response.
//!
//! Operations are not serialized. `loading` and `error` are last-write-wins
//! across overlapping calls, and so is a fetch's replacement of the cache: a
//! slow response to an earlier fetch overwrites a faster response to a later
//! one. No sequencing token discards stale responses.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{error_message, ApiError};
use crate::resource::{parse_list, Cache, CacheKey, FlatCache, Resource};
use crate::transport::Transport;

struct StoreState<C> {
    cache: C,
    loading: bool,
    error: Option<String>,
}

pub struct ResourceStore<R: Resource, T> {
    client: Arc<ApiClient<T>>,
    state: Mutex<StoreState<R::Cache>>,
}

impl<R: Resource, T> ResourceStore<R, T> {
    pub fn new(client: Arc<ApiClient<T>>) -> Self {
        Self {
            client,
            state: Mutex::new(StoreState {
                cache: R::Cache::default(),
                loading: false,
                error: None,
            }),
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    /// Read the cache without cloning it.
    pub fn with_cache<O>(&self, f: impl FnOnce(&R::Cache) -> O) -> O {
        f(&self.state().cache)
    }

    pub(crate) fn with_cache_mut<O>(&self, f: impl FnOnce(&mut R::Cache) -> O) -> O {
        f(&mut self.state().cache)
    }

    fn state(&self) -> MutexGuard<'_, StoreState<R::Cache>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run one operation with the loading/error protocol.
    ///
    /// `loading` is reset when the returned future completes or is dropped.
    pub(crate) async fn track<O, F>(&self, action: &'static str, operation: F) -> Result<O, ApiError>
    where
        F: Future<Output = Result<O, ApiError>>,
    {
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }
        let _loading = LoadingGuard { state: &self.state };

        let result = operation.await;
        if let Err(err) = &result {
            self.record_failure(action, err);
        }
        result
    }

    pub(crate) fn record_failure(&self, action: &'static str, err: &ApiError) {
        let message = error_message(err, &format!("failed to {action} {}", R::KIND));
        tracing::error!(target: "store", kind = R::KIND, action, status = ?err.status(), %message, "operation failed");
        self.state().error = Some(message);
    }
}

impl<R: Resource, T: Transport> ResourceStore<R, T> {
    /// GET `endpoint` and replace the cache slot `key` with the result.
    pub async fn fetch_into(&self, endpoint: &str, key: CacheKey<R>) -> Result<Vec<R::Model>, ApiError> {
        self.track("fetch", async {
            let value: Value = self.client.get(endpoint).await?;
            let models: Vec<R::Model> = parse_list::<R::Record>(value)?
                .items
                .into_iter()
                .map(R::Model::from)
                .collect();
            self.with_cache_mut(|cache| cache.replace(key, models.clone()));
            Ok(models)
        })
        .await
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<R::Model, ApiError> {
        self.track("create", async {
            let record: R::Record = self.client.post(&R::create_path(draft), Some(draft)).await?;
            let model = R::Model::from(record);
            self.with_cache_mut(|cache| cache.insert(R::cache_key(&model), model.clone()));
            Ok(model)
        })
        .await
    }

    pub async fn update(&self, id: i64, patch: &R::Patch) -> Result<R::Model, ApiError> {
        self.track("update", async {
            let record: R::Record = self.client.put(&R::item_path(id), Some(patch)).await?;
            Ok(self.reconcile(id, record))
        })
        .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.track("delete", async {
            self.client.delete(&R::item_path(id)).await?;
            self.with_cache_mut(|cache| cache.remove(id));
            Ok(())
        })
        .await
    }

    /// Replace the cached entry for `id`, if any, with the server's record.
    pub(crate) fn reconcile(&self, id: i64, record: R::Record) -> R::Model {
        let model = R::Model::from(record);
        self.with_cache_mut(|cache| cache.update(id, model.clone()));
        model
    }
}

impl<R, T, M> ResourceStore<R, T>
where
    R: Resource<Model = M, Cache = FlatCache<M>>,
    M: Clone,
{
    /// Snapshot of the cached list.
    pub fn items(&self) -> Vec<M> {
        self.with_cache(|cache| cache.items().to_vec())
    }
}

struct LoadingGuard<'a, C> {
    state: &'a Mutex<StoreState<C>>,
}

impl<C> Drop for LoadingGuard<'_, C> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .loading = false;
    }
}
