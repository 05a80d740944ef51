//! Persistence adapters. Implement the repository ports.
//!
//! `MemoryRepo` for tests and throwaway sessions, `SqliteRepo` for the on-disk journal.

pub mod memory_repo;
pub mod sqlite_repo;

pub use memory_repo::MemoryRepo;
pub use sqlite_repo::SqliteRepo;
