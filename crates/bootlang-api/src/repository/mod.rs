//! 계정 저장소 구현.
//!
//! PostgreSQL([`PgAccountDirectory`])과 인메모리([`MemoryAccountDirectory`]) 두 가지입니다.

pub mod memory;
pub mod users;

pub use memory::MemoryAccountDirectory;
pub use users::{connect_pool, PgAccountDirectory, CREATE_USERS_TABLE};
