// Journal entries: data model, storage backends, the shared live feed,
// client-style search, and the HTTP handlers over them.

pub mod feed;
pub mod handlers;
pub mod models;
pub mod pg_store;
pub mod repository;
pub mod search;
pub mod store;
