use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::time::Duration;
use tracing::info;

use indicab_core::Entity;

use crate::app_config::DatabaseConfig;
use crate::mongo_repo::MongoRepository;

#[derive(Clone)]
pub struct DbClient {
    pub db: Database,
}

impl DbClient {
    /// Connects and pings the server so a bad URL fails at startup rather than
    /// on the first request.
    pub async fn new(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut options = ClientOptions::parse(&config.url).await?;
        options.app_name = Some("indicab-api".to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.server_selection_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));
        options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_seconds));

        let client = Client::with_options(options)?;
        let db = client.database(&config.name);
        db.run_command(doc! { "ping": 1 }).await?;
        info!("Connected to MongoDB database {}", config.name);

        Ok(Self { db })
    }

    pub fn repository<T: Entity>(&self) -> MongoRepository<T> {
        MongoRepository::new(&self.db)
    }
}
