use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repository::{Entity, GroupCount, Repository, StoreError, StoreResult};

/// Process-local collection used by tests and the `memory` store backend.
///
/// Documents are kept in insertion order. Filters and grouping read fields
/// through their serialized JSON form, so field names match what the Mongo
/// repository sees.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    docs: RwLock<Vec<T>>,
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }
}

impl<T: Entity> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializes the whole document to read one field, so every filter or count
/// costs a full serialization per document. Acceptable at in-memory sizes.
fn field_key<T: Entity>(doc: &T, field: &str) -> StoreResult<Option<String>> {
    let value = serde_json::to_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(match value.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    })
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn save(&self, mut entity: T) -> StoreResult<T> {
        let mut docs = self.docs.write().await;
        match entity.id().map(str::to_owned) {
            Some(id) => match docs.iter_mut().find(|d| d.id() == Some(id.as_str())) {
                Some(slot) => *slot = entity.clone(),
                None => docs.push(entity.clone()),
            },
            None => {
                entity.set_id(Uuid::new_v4().simple().to_string());
                docs.push(entity.clone());
            }
        }
        Ok(entity)
    }

    async fn find_all(&self) -> StoreResult<Vec<T>> {
        Ok(self.docs.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let docs = self.docs.read().await;
        Ok(docs.iter().find(|d| d.id() == Some(id)).cloned())
    }

    async fn find_where(&self, criteria: &[(&str, &str)]) -> StoreResult<Vec<T>> {
        let docs = self.docs.read().await;
        let mut matched = Vec::new();
        'docs: for doc in docs.iter() {
            for (field, expected) in criteria {
                if field_key(doc, field)?.as_deref() != Some(*expected) {
                    continue 'docs;
                }
            }
            matched.push(doc.clone());
        }
        Ok(matched)
    }

    async fn count_by(&self, field: &str, sorted: bool) -> StoreResult<Vec<GroupCount>> {
        let docs = self.docs.read().await;
        let mut groups: Vec<GroupCount> = Vec::new();
        for doc in docs.iter() {
            let key = field_key(doc, field)?;
            match groups.iter_mut().find(|g| g.key == key) {
                Some(group) => group.count += 1,
                None => groups.push(GroupCount { key, count: 1 }),
            }
        }

        // None < Some, matching the store's null-first ascending order
        if sorted {
            groups.sort_by(|a, b| a.key.cmp(&b.key));
        }
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: Option<String>,
        tag: Option<String>,
        body: String,
    }

    impl Entity for Note {
        const COLLECTION: &'static str = "notes";

        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    fn note(tag: Option<&str>, body: &str) -> Note {
        Note {
            id: None,
            tag: tag.map(String::from),
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_assigns_id_then_replaces() {
        let repo = InMemoryRepository::new();
        let saved = repo.save(note(Some("a"), "first")).await.unwrap();
        let id = saved.id.clone().expect("id assigned");
        assert!(!id.is_empty());

        let mut edited = saved.clone();
        edited.body = "edited".to_string();
        repo.save(edited).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let loaded = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.body, "edited");
    }

    #[tokio::test]
    async fn test_save_with_unknown_id_inserts() {
        let repo = InMemoryRepository::new();
        let mut n = note(None, "x");
        n.id = Some("fixed".to_string());
        repo.save(n).await.unwrap();
        assert!(repo.find_by_id("fixed").await.unwrap().is_some());
        assert!(repo.find_by_id("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_where_and_insertion_order() {
        let repo = InMemoryRepository::new();
        repo.save(note(Some("a"), "1")).await.unwrap();
        repo.save(note(Some("b"), "2")).await.unwrap();
        repo.save(note(Some("a"), "3")).await.unwrap();

        let all: Vec<String> = repo.find_all().await.unwrap().into_iter().map(|n| n.body).collect();
        assert_eq!(all, vec!["1", "2", "3"]);

        let tagged: Vec<String> = repo
            .find_where(&[("tag", "a")])
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.body)
            .collect();
        assert_eq!(tagged, vec!["1", "3"]);
        assert_eq!(repo.find_where(&[]).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_count_by_sorts_null_first() {
        let repo = InMemoryRepository::new();
        for tag in [Some("b"), None, Some("a"), Some("b")] {
            repo.save(note(tag, "n")).await.unwrap();
        }

        let groups = repo.count_by("tag", true).await.unwrap();
        assert_eq!(
            groups,
            vec![
                GroupCount { key: None, count: 1 },
                GroupCount { key: Some("a".to_string()), count: 1 },
                GroupCount { key: Some("b".to_string()), count: 2 },
            ]
        );

        let total: u64 = repo.count_by("tag", false).await.unwrap().iter().map(|g| g.count).sum();
        assert_eq!(total, 4);
    }
}
