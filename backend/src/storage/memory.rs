//! In-memory document store.
//!
//! Documents are held as JSON values and round-trip through serde on every
//! read and write, the same shape they take in the hosted store. Used by
//! tests and as the reference for real backends.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde_json::Value;

use super::traits::{Document, Repository};

pub struct MemoryRepository<T> {
    documents: Mutex<HashMap<String, Value>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Document> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
            _entity: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Document> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> Repository<T> for MemoryRepository<T> {
    fn get(&self, id: &str) -> Result<Option<T>> {
        let documents = self.documents.lock().unwrap();
        documents
            .get(id)
            .map(|value| {
                serde_json::from_value(value.clone()).with_context(|| {
                    format!("malformed document {} in {}", id, T::COLLECTION)
                })
            })
            .transpose()
    }

    fn list(&self) -> Result<Vec<T>> {
        let documents = self.documents.lock().unwrap();
        documents
            .values()
            .map(|value| {
                serde_json::from_value(value.clone())
                    .with_context(|| format!("malformed document in {}", T::COLLECTION))
            })
            .collect()
    }

    fn save(&self, entity: &T) -> Result<()> {
        let value = serde_json::to_value(entity)
            .with_context(|| format!("serializing document for {}", T::COLLECTION))?;
        let mut documents = self.documents.lock().unwrap();
        documents.insert(entity.doc_id().to_string(), value);
        Ok(())
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut documents = self.documents.lock().unwrap();
        Ok(documents.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{AliyaGroup, HebrewDate};

    #[test]
    fn test_save_and_get_round_trips_documents() {
        let repository: MemoryRepository<AliyaGroup> = MemoryRepository::new();
        let group = AliyaGroup::new("שבת בראשית", HebrewDate::new(5785, 7, 24))
            .set_assignment("rishon", "prayer-1");

        repository.save(&group).unwrap();
        let loaded = repository.get(&group.id).unwrap().unwrap();
        assert_eq!(loaded, group);
        assert_eq!(repository.get("missing").unwrap(), None);
    }

    #[test]
    fn test_save_replaces_by_id() {
        let repository: MemoryRepository<AliyaGroup> = MemoryRepository::new();
        let group = AliyaGroup::new("שבת נח", HebrewDate::new(5785, 8, 2));
        repository.save(&group).unwrap();
        repository
            .save(&group.set_assignment("maftir", "prayer-2"))
            .unwrap();

        assert_eq!(repository.len(), 1);
        let loaded = repository.get(&group.id).unwrap().unwrap();
        assert_eq!(loaded.assigned_prayer_id("maftir"), Some("prayer-2"));
    }

    #[test]
    fn test_delete_reports_existence() {
        let repository: MemoryRepository<AliyaGroup> = MemoryRepository::new();
        let group = AliyaGroup::new("שבת נח", HebrewDate::new(5785, 8, 2));
        repository.save(&group).unwrap();

        assert!(repository.delete(&group.id).unwrap());
        assert!(!repository.delete(&group.id).unwrap());
        assert!(repository.is_empty());
    }

    #[test]
    fn test_list_returns_the_full_collection() {
        let repository: MemoryRepository<AliyaGroup> = MemoryRepository::new();
        repository
            .save(&AliyaGroup::new("א", HebrewDate::new(5785, 7, 24)))
            .unwrap();
        repository
            .save(&AliyaGroup::new("ב", HebrewDate::new(5785, 8, 2)))
            .unwrap();

        let mut labels: Vec<String> = repository
            .list()
            .unwrap()
            .into_iter()
            .map(|group| group.label)
            .collect();
        labels.sort();
        assert_eq!(labels, vec!["א", "ב"]);
    }
}
