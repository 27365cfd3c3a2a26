pub mod entities;
pub mod memory_store;
pub mod sql_store;
pub mod store;
