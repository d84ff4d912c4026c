// Store adapters implementing the queue and assignment ports.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::{RedisKeys, RedisStore};
