//! SQLite-backed implementations of the core storage ports.

mod entry_repository;
mod manager;
mod plan_repository;

pub use entry_repository::SqliteCalendarEntryStore;
pub use manager::DbManager;
pub use plan_repository::SqlitePlanRepository;
