pub mod log;
pub mod migrate;
pub mod pending;
pub mod pool;
