//! # Storage Traits
//!
//! One repository interface, parameterized by entity type, standing in for
//! the hosted document store. Implementations own all network, auth and
//! retry behavior; the domain only ever sees already-deserialized entities.

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{AliyaGroup, AliyaType, AliyaTypeCategory, PrayerCard, PrayerEventType};

/// An entity that lives in its own document collection.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// Name of the collection the documents live in.
    const COLLECTION: &'static str;

    fn doc_id(&self) -> &str;
}

impl Document for PrayerCard {
    const COLLECTION: &'static str = "prayerCards";

    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl Document for AliyaGroup {
    const COLLECTION: &'static str = "aliyaGroups";

    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl Document for AliyaType {
    const COLLECTION: &'static str = "aliyaTypes";

    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl Document for AliyaTypeCategory {
    const COLLECTION: &'static str = "aliyaTypeCategories";

    fn doc_id(&self) -> &str {
        &self.id
    }
}

impl Document for PrayerEventType {
    const COLLECTION: &'static str = "prayerEventTypes";

    fn doc_id(&self) -> &str {
        &self.id
    }
}

/// Read/write access to one collection of documents.
pub trait Repository<T: Document>: Send + Sync {
    /// Retrieve a document by id.
    fn get(&self, id: &str) -> Result<Option<T>>;

    /// The full collection, in unspecified order.
    fn list(&self) -> Result<Vec<T>>;

    /// Insert or replace a document under its own id.
    fn save(&self, entity: &T) -> Result<()>;

    /// Delete a document. Returns whether it existed.
    fn delete(&self, id: &str) -> Result<bool>;
}
