use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A record that lives in a named collection of the document store.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Fields holding a calendar date (`YYYY-MM-DD`). Stores that keep native
    /// date values use this to hand them back in that form.
    const DATE_FIELDS: &'static [&'static str] = &[];

    /// Store-assigned identifier; `None` until the first save.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Document store error: {0}")]
    Backend(String),
    #[error("Document serialization error: {0}")]
    Serialization(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// One row of a group-by-field count. Documents where the field is absent or
/// null are counted under `key: None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount {
    pub key: Option<String>,
    pub count: u64,
}

/// Typed collection accessor over the document store.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Inserts when the entity has no id yet (assigning one), otherwise
    /// replaces the stored document with the same id.
    async fn save(&self, entity: T) -> StoreResult<T>;

    async fn find_all(&self) -> StoreResult<Vec<T>>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>>;

    /// Equality match on every `(field, value)` pair. An empty slice matches everything.
    async fn find_where(&self, criteria: &[(&str, &str)]) -> StoreResult<Vec<T>>;

    /// Groups documents by `field` and counts each group. When `sorted`, groups
    /// come back in ascending key order with the null group first.
    async fn count_by(&self, field: &str, sorted: bool) -> StoreResult<Vec<GroupCount>>;
}
