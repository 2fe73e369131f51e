//! What a backend resource looks like to the generic store.
//!
//! # Design
//! Each resource names four shapes: the wire `Record` the server returns, the
//! in-memory `Model` built from it, and the `Draft`/`Patch` payloads sent on
//! create/update. Field renaming and null normalization live in the serde
//! attributes and `From` impls of those types, so the store itself never
//! touches individual fields.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

/// Backend-assigned integer id, the only join key between layers.
pub trait Identified {
    fn id(&self) -> i64;
}

pub trait Resource: Send + Sync + 'static {
    /// Singular name used in log lines and default error messages.
    const KIND: &'static str;
    /// Collection path, e.g. `/api/v1/projects`.
    const COLLECTION: &'static str;

    type Record: DeserializeOwned;
    type Model: From<Self::Record> + Identified + Clone + Send;
    type Draft: Serialize + Sync;
    type Patch: Serialize + Sync;
    type Cache: Cache<Self::Model>;

    fn create_path(_draft: &Self::Draft) -> String {
        Self::COLLECTION.to_string()
    }

    fn item_path(id: i64) -> String {
        format!("{}/{id}", Self::COLLECTION)
    }

    /// Which cache slot a freshly created model belongs to.
    fn cache_key(model: &Self::Model) -> CacheKey<Self>;
}

pub type CacheKey<R> = <<R as Resource>::Cache as Cache<<R as Resource>::Model>>::Key;

/// Local reflection of server state for one resource.
///
/// Fetches replace a whole slot, creates append, updates replace by id,
/// deletes remove by id. Unknown ids are ignored.
pub trait Cache<M>: Default + Send {
    type Key: Copy + Send + Sync;

    fn replace(&mut self, key: Self::Key, items: Vec<M>);
    fn insert(&mut self, key: Self::Key, item: M);
    /// Returns `false` when no entry had `id`.
    fn update(&mut self, id: i64, item: M) -> bool;
    /// Returns `false` when no entry had `id`.
    fn remove(&mut self, id: i64) -> bool;
}

/// A single ordered list, refetched wholesale.
#[derive(Debug, Clone)]
pub struct FlatCache<M> {
    items: Vec<M>,
}

impl<M> Default for FlatCache<M> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<M> FlatCache<M> {
    pub fn items(&self) -> &[M] {
        &self.items
    }
}

impl<M: Identified + Send> Cache<M> for FlatCache<M> {
    type Key = ();

    fn replace(&mut self, _key: (), items: Vec<M>) {
        self.items = items;
    }

    fn insert(&mut self, _key: (), item: M) {
        self.items.push(item);
    }

    fn update(&mut self, id: i64, item: M) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|existing| existing.id() != id);
        self.items.len() != before
    }
}

/// Ordered lists keyed by parent id, for children always fetched per parent.
#[derive(Debug, Clone)]
pub struct GroupedCache<M> {
    groups: HashMap<i64, Vec<M>>,
}

impl<M> Default for GroupedCache<M> {
    fn default() -> Self {
        Self {
            groups: HashMap::new(),
        }
    }
}

impl<M> GroupedCache<M> {
    pub fn group(&self, parent_id: i64) -> &[M] {
        self.groups.get(&parent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_group(&self, parent_id: i64) -> bool {
        self.groups.contains_key(&parent_id)
    }
}

impl<M: Identified + Send> Cache<M> for GroupedCache<M> {
    type Key = i64;

    fn replace(&mut self, parent_id: i64, items: Vec<M>) {
        self.groups.insert(parent_id, items);
    }

    fn insert(&mut self, parent_id: i64, item: M) {
        self.groups.entry(parent_id).or_default().push(item);
    }

    fn update(&mut self, id: i64, item: M) -> bool {
        let slot = self
            .groups
            .values_mut()
            .flat_map(|group| group.iter_mut())
            .find(|existing| existing.id() == id);
        match slot {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, id: i64) -> bool {
        for group in self.groups.values_mut() {
            let before = group.len();
            group.retain(|existing| existing.id() != id);
            if group.len() != before {
                return true;
            }
        }
        false
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

/// Accept either a bare JSON array or a `{items, total, skip, limit}` envelope.
///
/// A bare array is treated as one complete page.
pub fn parse_list<W: DeserializeOwned>(value: Value) -> Result<Page<W>, ApiError> {
    if value.is_array() {
        let items: Vec<W> = serde_json::from_value(value)?;
        let len = items.len() as u64;
        return Ok(Page {
            items,
            total: len,
            skip: 0,
            limit: len,
        });
    }
    if value.as_object().is_some_and(is_envelope) {
        return Ok(serde_json::from_value(value)?);
    }
    Err(ApiError::InvalidResponse(format!(
        "expected an array or an {{items, total, skip, limit}} envelope, got {}",
        shape_of(&value)
    )))
}

fn is_envelope(map: &serde_json::Map<String, Value>) -> bool {
    map.get("items").is_some_and(Value::is_array)
        && ["total", "skip", "limit"]
            .iter()
            .all(|key| map.get(*key).is_some_and(Value::is_u64))
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without envelope fields",
    }
}
