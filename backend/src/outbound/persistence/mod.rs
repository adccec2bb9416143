//! Persistence adapters implementing the user repository port.

mod diesel_user_repository;
mod memory;
mod models;
mod pool;
pub mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use memory::MemoryUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
