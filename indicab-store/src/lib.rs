pub mod app_config;
pub mod database;
pub mod mongo_repo;

pub use database::DbClient;
pub use mongo_repo::MongoRepository;
