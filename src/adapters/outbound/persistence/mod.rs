/// SQLite persistence gateway
mod completion_unit;
mod queries;
mod rows;
mod schema;
mod sqlite_store;

pub use sqlite_store::SqliteStore;
