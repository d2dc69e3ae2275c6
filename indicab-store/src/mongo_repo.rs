use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Collection, Database};
use std::marker::PhantomData;
use tracing::debug;

use indicab_core::{Entity, GroupCount, Repository, StoreError, StoreResult};

/// `Repository<T>` over the MongoDB collection named by `T::COLLECTION`.
///
/// Entities carry their identifier as `id`; in the collection it is `_id`.
/// Ids that parse as ObjectId hex are stored and matched as native
/// ObjectIds, anything else as a plain string. Native BSON dates written by
/// other clients are read back as strings the entity types understand.
pub struct MongoRepository<T> {
    collection: Collection<Document>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> MongoRepository<T> {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Document>(T::COLLECTION),
            _entity: PhantomData,
        }
    }
}

fn backend(err: mongodb::error::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

/// The `_id` value for an entity id.
fn id_value(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.to_string()),
    }
}

/// RFC 3339 text for a BSON date, cut to `YYYY-MM-DD` for calendar-date fields.
fn date_text(value: bson::DateTime, calendar_date: bool) -> StoreResult<String> {
    let text = value
        .try_to_rfc3339_string()
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    if calendar_date {
        Ok(text.split('T').next().unwrap_or_default().to_string())
    } else {
        Ok(text)
    }
}

fn is_date_field<T: Entity>(field: &str) -> bool {
    T::DATE_FIELDS.iter().any(|f| *f == field)
}

fn to_stored<T: Entity>(entity: &T) -> StoreResult<Document> {
    let mut doc = bson::to_document(entity).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if let Some(id) = doc.remove("id") {
        let id = match id {
            Bson::String(id) => id_value(&id),
            other => other,
        };
        doc.insert("_id", id);
    }
    Ok(doc)
}

fn from_stored<T: Entity>(mut doc: Document) -> StoreResult<T> {
    if let Some(id) = doc.remove("_id") {
        let id = match id {
            Bson::String(s) => s,
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        doc.insert("id", id);
    }
    for (field, value) in doc.iter_mut() {
        if let Bson::DateTime(dt) = value {
            let text = date_text(*dt, is_date_field::<T>(field))?;
            *value = Bson::String(text);
        }
    }
    bson::from_document(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Reads one `{ key, count }` row produced by the grouping pipeline.
fn group_row(doc: &Document, calendar_date: bool) -> StoreResult<GroupCount> {
    let key = match doc.get("key") {
        None | Some(Bson::Null) => None,
        Some(Bson::String(s)) => Some(s.clone()),
        Some(Bson::DateTime(dt)) => Some(date_text(*dt, calendar_date)?),
        Some(other) => Some(other.to_string()),
    };
    let count = match doc.get("count") {
        Some(Bson::Int32(n)) => *n as u64,
        Some(Bson::Int64(n)) => *n as u64,
        Some(Bson::Double(n)) => *n as u64,
        other => {
            return Err(StoreError::Serialization(format!(
                "unexpected group count {:?}",
                other
            )))
        }
    };
    Ok(GroupCount { key, count })
}

/// A string and a BSON date for the same day group separately in the store;
/// once both are text they are folded into one group. BSON orders strings
/// before dates, so sorted output is re-sorted here.
fn merge_groups(rows: Vec<GroupCount>, sorted: bool) -> Vec<GroupCount> {
    let mut groups: Vec<GroupCount> = Vec::with_capacity(rows.len());
    for row in rows {
        match groups.iter_mut().find(|g| g.key == row.key) {
            Some(group) => group.count += row.count,
            None => groups.push(row),
        }
    }
    if sorted {
        groups.sort_by(|a, b| a.key.cmp(&b.key));
    }
    groups
}

/// `$group` by the field, `$project` to `{ key, count }`, then `$sort` when asked.
fn count_pipeline(field: &str, sorted: bool) -> Vec<Document> {
    let mut pipeline = vec![
        doc! { "$group": { "_id": format!("${}", field), "count": { "$sum": 1 } } },
        doc! { "$project": { "_id": 0, "key": "$_id", "count": 1 } },
    ];
    if sorted {
        pipeline.push(doc! { "$sort": { "key": 1 } });
    }
    pipeline
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    async fn save(&self, mut entity: T) -> StoreResult<T> {
        match entity.id().map(str::to_owned) {
            Some(id) => {
                let doc = to_stored(&entity)?;
                self.collection
                    .replace_one(doc! { "_id": id_value(&id) }, doc)
                    .upsert(true)
                    .await
                    .map_err(backend)?;
            }
            None => {
                entity.set_id(ObjectId::new().to_hex());
                let doc = to_stored(&entity)?;
                self.collection.insert_one(doc).await.map_err(backend)?;
            }
        }
        Ok(entity)
    }

    async fn find_all(&self) -> StoreResult<Vec<T>> {
        self.find_where(&[]).await
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<T>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id_value(id) })
            .await
            .map_err(backend)?;
        found.map(from_stored).transpose()
    }

    async fn find_where(&self, criteria: &[(&str, &str)]) -> StoreResult<Vec<T>> {
        let mut filter = Document::new();
        for (field, value) in criteria {
            filter.insert(*field, *value);
        }

        let cursor = self.collection.find(filter).await.map_err(backend)?;
        let docs: Vec<Document> = cursor.try_collect().await.map_err(backend)?;
        debug!("Fetched {} documents from {}", docs.len(), T::COLLECTION);
        docs.into_iter().map(from_stored).collect()
    }

    async fn count_by(&self, field: &str, sorted: bool) -> StoreResult<Vec<GroupCount>> {
        let cursor = self
            .collection
            .aggregate(count_pipeline(field, sorted))
            .await
            .map_err(backend)?;
        let rows: Vec<Document> = cursor.try_collect().await.map_err(backend)?;
        let calendar_date = is_date_field::<T>(field);
        let rows = rows
            .iter()
            .map(|row| group_row(row, calendar_date))
            .collect::<StoreResult<Vec<_>>>()?;
        Ok(merge_groups(rows, sorted))
    }
}
