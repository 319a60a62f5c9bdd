//! Shared in-memory cache of business records.
//!
//! One instance per process, created in main and handed to every handler
//! through `AppState`. The four collections are private; callers go through
//! the operations below, so every mutation happens under a single lock
//! acquisition and is wholly visible (or not at all) to any broadcast
//! dispatched afterwards.

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

/// The four record collections held by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Stock,
    Sales,
    Transactions,
    Audit,
}

impl CollectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Sales => "sales",
            Self::Transactions => "transactions",
            Self::Audit => "audit",
        }
    }

    /// Sales, transactions and audit entries carry a server-assigned
    /// creation timestamp; stock items do not.
    fn timestamped(&self) -> bool {
        !matches!(self, Self::Stock)
    }
}

/// Read view of all four collections at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSnapshot {
    pub stock: Vec<Value>,
    pub sales: Vec<Value>,
    pub transactions: Vec<Value>,
    pub audit: Vec<Value>,
}

/// Per-collection record counts, reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheSizes {
    pub stock: usize,
    pub sales: usize,
    pub transactions: usize,
    pub audit: usize,
}

#[derive(Default)]
struct CacheInner {
    stock: Vec<Value>,
    sales: Vec<Value>,
    transactions: Vec<Value>,
    audit: Vec<Value>,
}

impl CacheInner {
    fn collection(&self, kind: CollectionKind) -> &Vec<Value> {
        match kind {
            CollectionKind::Stock => &self.stock,
            CollectionKind::Sales => &self.sales,
            CollectionKind::Transactions => &self.transactions,
            CollectionKind::Audit => &self.audit,
        }
    }

    fn collection_mut(&mut self, kind: CollectionKind) -> &mut Vec<Value> {
        match kind {
            CollectionKind::Stock => &mut self.stock,
            CollectionKind::Sales => &mut self.sales,
            CollectionKind::Transactions => &mut self.transactions,
            CollectionKind::Audit => &mut self.audit,
        }
    }
}

/// The single writable copy of current state. Shared as `Arc<SharedCache>`.
#[derive(Default)]
pub struct SharedCache {
    inner: RwLock<CacheInner>,
}

impl SharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a clone of the current ordered sequence for a collection.
    pub fn get(&self, kind: CollectionKind) -> Vec<Value> {
        self.inner.read().collection(kind).clone()
    }

    /// Appends a record, stamping a server timestamp for timestamped kinds
    /// when the payload does not already carry one. Returns the stored record.
    pub fn append(&self, kind: CollectionKind, mut record: Value) -> Value {
        if kind.timestamped() {
            if let Some(obj) = record.as_object_mut() {
                obj.entry("timestamp")
                    .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
            }
        }
        let mut inner = self.inner.write();
        inner.collection_mut(kind).push(record.clone());
        record
    }

    /// Decrements the `quantity` of the stock record whose `id` matches.
    /// Silent no-op when no record matches or the quantity is not numeric.
    pub fn adjust_stock(&self, item_id: &Value, delta: f64) {
        let mut inner = self.inner.write();
        for item in inner.stock.iter_mut() {
            if item.get("id") == Some(item_id) {
                if let Some(quantity) = item.get("quantity").and_then(Value::as_f64) {
                    item["quantity"] = to_number(quantity - delta);
                }
                return;
            }
        }
    }

    /// Atomically replaces an entire collection.
    pub fn replace_all(&self, kind: CollectionKind, records: Vec<Value>) {
        *self.inner.write().collection_mut(kind) = records;
    }

    /// Returns all four collections at one instant.
    pub fn snapshot(&self) -> CacheSnapshot {
        let inner = self.inner.read();
        CacheSnapshot {
            stock: inner.stock.clone(),
            sales: inner.sales.clone(),
            transactions: inner.transactions.clone(),
            audit: inner.audit.clone(),
        }
    }

    /// Field-wise overwrite from a sync payload: any of the four collection
    /// keys present in `data` replaces that collection; the rest are kept.
    pub fn merge(&self, data: &Value) {
        let mut inner = self.inner.write();
        for kind in [
            CollectionKind::Stock,
            CollectionKind::Sales,
            CollectionKind::Transactions,
            CollectionKind::Audit,
        ] {
            if let Some(records) = data.get(kind.as_str()).and_then(Value::as_array) {
                *inner.collection_mut(kind) = records.clone();
            }
        }
    }

    /// Empties all four collections. The caller must follow with a
    /// cache-cleared broadcast so connected clients drop their local views.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.stock.clear();
        inner.sales.clear();
        inner.transactions.clear();
        inner.audit.clear();
    }

    pub fn sizes(&self) -> CacheSizes {
        let inner = self.inner.read();
        CacheSizes {
            stock: inner.stock.len(),
            sales: inner.sales.len(),
            transactions: inner.transactions.len(),
            audit: inner.audit.len(),
        }
    }
}

/// Preserves integer representation when the result has no fractional part.
fn to_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < (i64::MAX as f64) {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}
